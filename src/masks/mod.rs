//! Composite-mask decoding and overlay management.

pub(crate) mod color_map;
pub(crate) mod compositor;
pub(crate) mod hover;
