use core::fmt;
use core::ops::{Add, AddAssign};

/// Size of a physical frame in bytes.
pub const FRAME_SIZE: u64 = 4096;

/// `log2(FRAME_SIZE)`, i.e. the number of in-frame offset bits.
pub const FRAME_SHIFT: u32 = 12;

const _: () = assert!(1 << FRAME_SHIFT == FRAME_SIZE);

/// Physical memory address.
///
/// Distinct from any virtual address type so a frame handed out by the pool
/// cannot be dereferenced without going through a
/// [`PhysMapper`](crate::PhysMapper).
///
/// ### Examples
/// ```rust
/// # use kernel_frames::*;
/// let pa = PhysicalAddress::new(0x8000_1234);
/// assert_eq!(pa.frame_base().as_u64(), 0x8000_1000);
/// assert_eq!(pa.frame_number(), 0x8_0001);
/// assert!(!pa.is_frame_aligned());
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// `address / FRAME_SIZE`.
    #[inline]
    #[must_use]
    pub const fn frame_number(self) -> u64 {
        self.0 >> FRAME_SHIFT
    }

    /// Base of the frame containing this address.
    #[inline]
    #[must_use]
    pub const fn frame_base(self) -> Self {
        Self(align_down(self.0, FRAME_SIZE))
    }

    #[inline]
    #[must_use]
    pub const fn is_frame_aligned(self) -> bool {
        self.0 & (FRAME_SIZE - 1) == 0
    }

    /// Inverse of [`frame_number`](Self::frame_number).
    #[inline]
    #[must_use]
    pub const fn from_frame_number(n: u64) -> Self {
        Self(n << FRAME_SHIFT)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u64 {
    #[inline]
    fn from(pa: PhysicalAddress) -> Self {
        pa.0
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

/// Align `x` down to the nearest multiple of `a`.
///
/// ### Preconditions
/// - `a` must be **non-zero** and a **power of two**.
#[inline(always)]
#[must_use]
pub const fn align_down(x: u64, a: u64) -> u64 {
    x & !(a - 1)
}

/// Align `x` up to the nearest multiple of `a`, or `None` if that overflows.
///
/// ### Preconditions
/// - `a` must be **non-zero** and a **power of two**.
///
/// ### Examples
/// ```rust
/// # use kernel_frames::align_up;
/// assert_eq!(align_up(0, 4096), Some(0));
/// assert_eq!(align_up(1, 4096), Some(4096));
/// assert_eq!(align_up(4096, 4096), Some(4096));
/// assert_eq!(align_up(u64::MAX, 4096), None);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_up(x: u64, a: u64) -> Option<u64> {
    match x.checked_add(a - 1) {
        Some(v) => Some(v & !(a - 1)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_number_round_trips_through_base() {
        let pa = PhysicalAddress::new(0x8765_4321);
        let n = pa.frame_number();
        assert_eq!(PhysicalAddress::from_frame_number(n), pa.frame_base());
        assert_eq!(pa.frame_base().as_u64(), 0x8765_4000);
    }

    #[test]
    fn alignment_checks() {
        assert!(PhysicalAddress::new(0).is_frame_aligned());
        assert!(PhysicalAddress::new(0x2000).is_frame_aligned());
        assert!(!PhysicalAddress::new(0x2008).is_frame_aligned());
        assert_eq!(align_down(0x2fff, FRAME_SIZE), 0x2000);
        assert_eq!(align_up(0x2001, FRAME_SIZE), Some(0x3000));
    }

    #[test]
    fn formatting() {
        let pa = PhysicalAddress::new(0x1000);
        assert_eq!(format!("{pa}"), "0x0000000000001000");
        assert_eq!(format!("{pa:?}"), "PA(0x0000000000001000)");
    }
}
