//! Error types of the frame pool.
//!
//! Two classes exist. Exhaustion ([`OutOfFrames`]) and configuration
//! problems ([`PoolConfigError`], [`InstallError`]) are ordinary `Result`s the
//! caller decides about. Broken invariants ([`Violation`]) mean a caller or the
//! pool itself corrupted shared state; they are routed through [`fatal`] and
//! never returned.

use crate::addr::PhysicalAddress;

/// The free list is empty.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("out of physical frames")]
pub struct OutOfFrames;

/// Error returned when constructing a [`FrameRange`](crate::FrameRange) or a
/// [`FramePool`](crate::FramePool).
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolConfigError {
    #[error("no whole frame fits between {start} and {end}")]
    EmptyRange {
        start: PhysicalAddress,
        end: PhysicalAddress,
    },
    #[error("reference count table holds {provided} slots, {needed} frames need one each")]
    TableTooSmall { needed: usize, provided: usize },
}

/// Error returned by [`global::install`](crate::global::install).
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallError {
    #[error("the kernel frame pool is already installed")]
    AlreadyInstalled,
}

/// A broken allocator invariant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("frame address {0} is not frame aligned")]
    Misaligned(PhysicalAddress),
    #[error("frame address {0} is outside the managed range")]
    OutOfRange(PhysicalAddress),
    #[error("double free of frame {0}: it has no owner")]
    DoubleFree(PhysicalAddress),
    #[error("add_owner on unowned frame {0}: it must be allocated first")]
    Resurrection(PhysicalAddress),
    #[error("reference count of frame {0} overflows")]
    CountOverflow(PhysicalAddress),
    #[error("frame {frame} on the free list still has {count} owner(s)")]
    OwnedFrameOnFreeList { frame: PhysicalAddress, count: u32 },
    #[error("free list links to {0}, which is outside the managed range")]
    CorruptFreeList(PhysicalAddress),
    #[error("frame pool initialized twice")]
    AlreadyInitialized,
    #[error("kernel frame pool used before installation")]
    Uninitialized,
}

/// Report a broken invariant and stop the current execution context.
///
/// In the kernel the panic handler halts the CPU; on the host the panic
/// unwinds and releases any held pool lock on the way out.
///
/// # Panics
/// Always, with the violation's message.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(violation: Violation) -> ! {
    log::error!("frame pool: {violation}");
    panic!("frame pool: {violation}");
}
