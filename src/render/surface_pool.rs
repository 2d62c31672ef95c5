use std::cell::RefCell;
use std::collections::HashMap;

use crate::foundation::core::Size;
use crate::foundation::error::SegmenterResult;
use crate::render::texture::surface_dims;

/// Pool configuration for scratch render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per (w,h) bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

/// Counters describing pool usage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Surfaces currently lent out and not yet returned.
    pub outstanding: usize,
    /// Surfaces parked in the pool.
    pub retained_surfaces: usize,
    /// Bytes parked in the pool.
    pub retained_bytes: usize,
    /// Fresh allocations performed.
    pub alloc_surfaces: u64,
    /// Returned surfaces dropped because a cap was hit.
    pub dropped_on_release: u64,
}

/// Bounded pool of scratch pixmaps keyed by size.
///
/// Every borrow is a [`ScopedSurface`] that goes back to the pool when dropped, so temporary
/// render targets are released on success, early return and error alike.
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    inner: RefCell<PoolInner>,
}

#[derive(Default)]
struct PoolInner {
    stats: SurfacePoolStats,
    buckets: HashMap<Size, Vec<vello_cpu::Pixmap>>,
}

impl SurfacePool {
    /// Create an empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            inner: RefCell::new(PoolInner::default()),
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> SurfacePoolStats {
        self.inner.borrow().stats.clone()
    }

    /// Borrow a surface of `size`, cleared to transparent.
    pub fn borrow(&self, size: Size) -> SegmenterResult<ScopedSurface<'_>> {
        let (w, h) = surface_dims(size.width, size.height)?;
        let mut inner = self.inner.borrow_mut();
        let reused = inner.buckets.get_mut(&size).and_then(Vec::pop);
        let pixmap = match reused {
            Some(mut p) => {
                inner.stats.retained_surfaces = inner.stats.retained_surfaces.saturating_sub(1);
                inner.stats.retained_bytes =
                    inner.stats.retained_bytes.saturating_sub(size.rgba_len());
                p.data_as_u8_slice_mut().fill(0);
                p
            }
            None => {
                inner.stats.alloc_surfaces = inner.stats.alloc_surfaces.saturating_add(1);
                vello_cpu::Pixmap::new(w, h)
            }
        };
        inner.stats.outstanding += 1;
        Ok(ScopedSurface {
            pool: self,
            size,
            pixmap: Some(pixmap),
        })
    }

    fn release(&self, size: Size, pixmap: vello_cpu::Pixmap) {
        let mut inner = self.inner.borrow_mut();
        inner.stats.outstanding = inner.stats.outstanding.saturating_sub(1);

        let bytes = size.rgba_len();
        let bucket_len = inner.buckets.get(&size).map_or(0, Vec::len);
        if self.opts.max_surfaces_per_bucket == 0
            || bucket_len >= self.opts.max_surfaces_per_bucket
            || inner.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            inner.stats.dropped_on_release = inner.stats.dropped_on_release.saturating_add(1);
            return;
        }

        inner.buckets.entry(size).or_default().push(pixmap);
        inner.stats.retained_surfaces += 1;
        inner.stats.retained_bytes = inner.stats.retained_bytes.saturating_add(bytes);
    }
}

impl Default for SurfacePool {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

/// A pooled pixmap returned to its pool on drop.
pub struct ScopedSurface<'a> {
    pool: &'a SurfacePool,
    size: Size,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl ScopedSurface<'_> {
    /// Surface dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn pixmap(&self) -> &vello_cpu::Pixmap {
        self.pixmap
            .as_ref()
            .unwrap_or_else(|| unreachable!("surface taken before drop"))
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        self.pixmap
            .as_mut()
            .unwrap_or_else(|| unreachable!("surface taken before drop"))
    }

    /// Premultiplied RGBA8 bytes.
    pub fn bytes(&self) -> &[u8] {
        self.pixmap().data_as_u8_slice()
    }

    /// Mutable premultiplied RGBA8 bytes.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.pixmap_mut().data_as_u8_slice_mut()
    }
}

impl Drop for ScopedSurface<'_> {
    fn drop(&mut self) {
        if let Some(p) = self.pixmap.take() {
            self.pool.release(self.size, p);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
