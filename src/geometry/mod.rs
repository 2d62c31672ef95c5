//! Pure responsive-fit and coordinate-space helpers.

pub(crate) mod fit;
