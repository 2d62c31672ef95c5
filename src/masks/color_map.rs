use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgb;
use crate::foundation::error::{SegmenterError, SegmenterResult};

/// Identifier of a segment as assigned by the inference service.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment identity and score stored per composite color.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentInfo {
    /// Segment this color belongs to.
    pub segment_id: SegmentId,
    /// Service confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Composite-mask color key. Displays exactly as `"(r, g, b)"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorKey(pub Rgb);

impl From<Rgb> for ColorKey {
    fn from(c: Rgb) -> Self {
        Self(c)
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.r, self.0.g, self.0.b)
    }
}

impl FromStr for ColorKey {
    type Err = SegmenterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SegmenterError::validation(format!("invalid color key '{s}'"));
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(bad)?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
        let mut next = || channels.next().ok_or_else(bad)?.map_err(|_| bad());
        let (r, g, b) = (next()?, next()?, next()?);
        if channels.next().is_some() {
            return Err(bad());
        }
        Ok(Self(Rgb::new(r, g, b)))
    }
}

/// Lookup from composite-mask color to segment.
///
/// Built together with the composite mask it describes and discarded with it. The producer
/// guarantees that no two segments share a color.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorMap {
    entries: HashMap<ColorKey, SegmentInfo>,
}

impl ColorMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the service's `color_map` object, keyed by `"(r, g, b)"` strings.
    pub fn from_wire(wire: &BTreeMap<String, SegmentInfo>) -> SegmenterResult<Self> {
        let mut entries = HashMap::with_capacity(wire.len());
        for (k, info) in wire {
            let key = k.parse::<ColorKey>()?;
            if let Some(prev) = entries.insert(key, *info) {
                tracing::warn!(
                    "color key '{k}' duplicates {key}: segment {} replaced by {}",
                    prev.segment_id,
                    info.segment_id
                );
            }
        }
        Ok(Self { entries })
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, key: ColorKey, info: SegmentInfo) {
        self.entries.insert(key, info);
    }

    /// Resolve a sampled color; background and anti-aliased edge colors miss.
    pub fn lookup(&self, color: Rgb) -> Option<SegmentInfo> {
        self.entries.get(&ColorKey(color)).copied()
    }

    /// Color used for `segment_id`, if any.
    pub fn color_of(&self, segment_id: SegmentId) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(_, info)| info.segment_id == segment_id)
            .map(|(k, _)| k.0)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to the wire shape with canonical keys.
    pub fn to_wire(&self) -> BTreeMap<String, SegmentInfo> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/masks/color_map.rs"]
mod tests;
