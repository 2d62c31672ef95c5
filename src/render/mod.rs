pub(crate) mod cpu;
pub(crate) mod sampler;
pub(crate) mod surface_pool;
pub(crate) mod texture;
