//! # Physical memory access
//!
//! The pool writes into the frames it manages: the free-list link lives in
//! the first bytes of each free frame and fresh or freed frames are filled
//! with a junk pattern. Code can only dereference virtual addresses, so every
//! such access goes through a [`PhysMapper`].
//!
//! | Environment | Mapping | [`OffsetPhysMapper`] |
//! |-------------|---------|----------------------|
//! | Early boot / identity-mapped kernel | `va = pa` | [`OffsetPhysMapper::IDENTITY`] |
//! | Higher-half direct map | `va = HHDM_BASE + pa` | `OffsetPhysMapper::new(HHDM_BASE)` |
//! | Host tests | `va = buffer + (pa - phys_base)` | `OffsetPhysMapper::new(buffer.wrapping_sub(phys_base))` |

use crate::addr::PhysicalAddress;

/// Converts physical addresses to usable pointers in the current virtual
/// address space.
///
/// # Safety
/// - `pa` must be mapped writable in the current page tables for `&mut T`.
/// - Lifetime `'a` is purely borrow-checked; the mapping must remain valid
///   for `'a`.
/// - Type `T` must match the bytes at `pa` and must not alias another live
///   reference.
pub trait PhysMapper {
    /// Convert a *physical* address to a usable mutable reference.
    ///
    /// # Safety
    /// See the trait-level contract.
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T;
}

impl<M: PhysMapper> PhysMapper for &M {
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        unsafe { (**self).phys_to_mut(pa) }
    }
}

/// [`PhysMapper`] that adds a constant to every physical address.
///
/// Arithmetic wraps, so a "negative" offset works for test buffers placed
/// below the physical window they emulate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OffsetPhysMapper {
    offset: u64,
}

impl OffsetPhysMapper {
    /// Physical memory is identity mapped.
    pub const IDENTITY: Self = Self::new(0);

    #[must_use]
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl PhysMapper for OffsetPhysMapper {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        let va = pa.as_u64().wrapping_add(self.offset) as usize as *mut T;
        // SAFETY: the caller guarantees `pa` is mapped at `pa + offset`.
        unsafe { &mut *va }
    }
}
