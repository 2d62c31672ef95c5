//! Scene graph: base image, mask container and selection layer slots.

pub(crate) mod layer;
pub(crate) mod manager;
