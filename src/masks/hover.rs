use crate::masks::compositor::SegmentHit;

/// Ticket for one in-flight hover lookup, keyed by its originating pointer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverTicket {
    seq: u64,
    /// Display-space x of the pointer event.
    pub x: f64,
    /// Display-space y of the pointer event.
    pub y: f64,
}

/// Orders hover results for callers that resolve lookups out of band.
///
/// Only the result for the newest ticket is accepted; anything older is stale and dropped.
#[derive(Debug, Default)]
pub struct HoverTracker {
    next_seq: u64,
    latest: Option<u64>,
    current: Option<SegmentHit>,
}

impl HoverTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pointer position about to be resolved.
    pub fn issue(&mut self, x: f64, y: f64) -> HoverTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest = Some(seq);
        HoverTicket { seq, x, y }
    }

    /// Deliver the lookup result for `ticket`.
    ///
    /// Returns `true` if the result was current and is now the hovered segment.
    pub fn resolve(&mut self, ticket: HoverTicket, hit: Option<SegmentHit>) -> bool {
        if self.latest != Some(ticket.seq) {
            tracing::debug!(
                seq = ticket.seq,
                x = ticket.x,
                y = ticket.y,
                "dropping stale hover result"
            );
            return false;
        }
        self.current = hit;
        true
    }

    /// Segment currently under the pointer, as of the newest resolved ticket.
    pub fn current(&self) -> Option<&SegmentHit> {
        self.current.as_ref()
    }

    /// Forget in-flight tickets and the current hit.
    pub fn reset(&mut self) {
        self.latest = None;
        self.current = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/masks/hover.rs"]
mod tests;
