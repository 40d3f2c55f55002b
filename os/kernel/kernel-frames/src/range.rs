use crate::addr::{FRAME_SIZE, PhysicalAddress, align_down, align_up};
use crate::error::PoolConfigError;
use core::fmt;

/// The physical range a frame pool manages: `[start, end)`, both frame aligned.
///
/// Built from the two externally supplied boundaries, the first address past
/// the kernel image and the top of physical memory. `start` is the first
/// frame boundary at or above the kernel end; a partial frame below the top
/// is left out.
///
/// ### Examples
/// ```rust
/// # use kernel_frames::*;
/// let range = FrameRange::new(
///     PhysicalAddress::new(0x8002_1234),
///     PhysicalAddress::new(0x8003_0000),
/// ).unwrap();
/// assert_eq!(range.start().as_u64(), 0x8002_2000);
/// assert_eq!(range.frame_count(), 14);
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameRange {
    start: PhysicalAddress,
    end: PhysicalAddress,
}

impl FrameRange {
    /// # Errors
    /// [`PoolConfigError::EmptyRange`] when not a single whole frame fits
    /// between `kernel_end` and `physical_top`.
    pub const fn new(
        kernel_end: PhysicalAddress,
        physical_top: PhysicalAddress,
    ) -> Result<Self, PoolConfigError> {
        let end = align_down(physical_top.as_u64(), FRAME_SIZE);
        let Some(start) = align_up(kernel_end.as_u64(), FRAME_SIZE) else {
            return Err(PoolConfigError::EmptyRange {
                start: kernel_end,
                end: physical_top,
            });
        };
        if start >= end {
            return Err(PoolConfigError::EmptyRange {
                start: kernel_end,
                end: physical_top,
            });
        }
        Ok(Self {
            start: PhysicalAddress::new(start),
            end: PhysicalAddress::new(end),
        })
    }

    /// First managed frame.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> PhysicalAddress {
        self.start
    }

    /// One past the last managed byte.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.end
    }

    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn frame_count(&self) -> usize {
        ((self.end.as_u64() - self.start.as_u64()) / FRAME_SIZE) as usize
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, pa: PhysicalAddress) -> bool {
        pa.as_u64() >= self.start.as_u64() && pa.as_u64() < self.end.as_u64()
    }

    /// Dense index of the frame containing `pa`, relative to [`start`](Self::start).
    ///
    /// Returns `None` outside the range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index_of(&self, pa: PhysicalAddress) -> Option<usize> {
        if self.contains(pa) {
            Some((pa.frame_number() - self.start.frame_number()) as usize)
        } else {
            None
        }
    }

    /// Every managed frame, lowest address first.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = PhysicalAddress> + use<> {
        let first = self.start.frame_number();
        (first..self.end.frame_number()).map(PhysicalAddress::from_frame_number)
    }
}

impl fmt::Debug for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRange({:?}..{:?})", self.start, self.end)
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
