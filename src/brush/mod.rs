//! Freehand selection: stroke log, derived raster and the pointer state machine.

pub(crate) mod engine;
pub(crate) mod stroke;
