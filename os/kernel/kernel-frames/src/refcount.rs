use crate::addr::PhysicalAddress;
use crate::error::{PoolConfigError, Violation, fatal};
use crate::range::FrameRange;

/// Per-frame owner counts, one `u32` slot per managed frame.
///
/// The table performs the bounds and counting checks; deciding what a count
/// *means* (free or owned) is up to the pool, which also provides the locking.
///
/// # Invariants
/// - `counts.len() >= range.frame_count()`; slots past the range are unused.
/// - A frame's slot is `counts[range.index_of(frame)]`.
pub(crate) struct RefCountTable<'a> {
    range: FrameRange,
    counts: &'a mut [u32],
}

impl<'a> RefCountTable<'a> {
    /// Bind `counts` to `range` and zero every slot the range uses.
    pub(crate) fn new(range: FrameRange, counts: &'a mut [u32]) -> Result<Self, PoolConfigError> {
        let needed = range.frame_count();
        if counts.len() < needed {
            return Err(PoolConfigError::TableTooSmall {
                needed,
                provided: counts.len(),
            });
        }
        counts[..needed].fill(0);
        Ok(Self { range, counts })
    }

    #[inline]
    fn slot(&mut self, frame: PhysicalAddress) -> &mut u32 {
        match self.range.index_of(frame) {
            Some(i) => &mut self.counts[i],
            None => fatal(Violation::OutOfRange(frame)),
        }
    }

    #[inline]
    pub(crate) fn get(&self, frame: PhysicalAddress) -> u32 {
        match self.range.index_of(frame) {
            Some(i) => self.counts[i],
            None => fatal(Violation::OutOfRange(frame)),
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, frame: PhysicalAddress, count: u32) {
        *self.slot(frame) = count;
    }

    /// Add an owner to a frame that already has one.
    pub(crate) fn increment(&mut self, frame: PhysicalAddress) -> u32 {
        let slot = self.slot(frame);
        if *slot == 0 {
            fatal(Violation::Resurrection(frame));
        }
        let Some(next) = slot.checked_add(1) else {
            fatal(Violation::CountOverflow(frame))
        };
        *slot = next;
        next
    }

    /// Drop one owner and return how many remain.
    pub(crate) fn decrement(&mut self, frame: PhysicalAddress) -> u32 {
        let slot = self.slot(frame);
        if *slot == 0 {
            fatal(Violation::DoubleFree(frame));
        }
        *slot -= 1;
        *slot
    }

    /// Sum of all counts in the range.
    pub(crate) fn total(&self) -> u64 {
        self.counts[..self.range.frame_count()]
            .iter()
            .map(|&c| u64::from(c))
            .sum()
    }
}
