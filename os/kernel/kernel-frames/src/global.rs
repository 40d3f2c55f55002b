//! # The kernel's frame pool
//!
//! Production kernels run exactly one pool. It is built during boot, once the
//! kernel image end and the top of RAM are known, and installed here. Code
//! that cannot easily be handed a `&FramePool` (page-fault handling, pipe
//! setup, stack allocation) reaches it through [`frames`] or the `k*` helpers.
//!
//! Everything else should take the pool by reference; tests construct as many
//! private pools as they need and never touch this module.

use crate::addr::PhysicalAddress;
use crate::error::{InstallError, OutOfFrames, Violation, fatal};
use crate::phys::OffsetPhysMapper;
use crate::pool::FramePool;
use kernel_sync::{RawSpin, SyncOnceCell};

/// Concrete pool type used by the kernel.
pub type KernelFramePool = FramePool<'static, OffsetPhysMapper, RawSpin>;

static FRAMES: SyncOnceCell<KernelFramePool> = SyncOnceCell::new();

/// Install `pool` as the kernel's frame pool and populate it.
///
/// Call once during boot, before other cores start allocating: until
/// [`FramePool::initialize`] has run, concurrent callers see an empty pool.
///
/// # Errors
/// [`InstallError::AlreadyInstalled`] if a pool was installed before; `pool`
/// is dropped in that case.
pub fn install(pool: KernelFramePool) -> Result<&'static KernelFramePool, InstallError> {
    let pool = FRAMES
        .set(|| pool)
        .map_err(|_| InstallError::AlreadyInstalled)?;
    pool.initialize();
    Ok(pool)
}

/// The installed kernel frame pool.
///
/// # Panics
/// Fatal ([`Violation::Uninitialized`]) before [`install`].
#[track_caller]
pub fn frames() -> &'static KernelFramePool {
    FRAMES
        .get()
        .unwrap_or_else(|| fatal(Violation::Uninitialized))
}

/// Allocate one frame from the kernel pool.
///
/// # Errors
/// [`OutOfFrames`] when physical memory is exhausted.
#[track_caller]
pub fn kalloc() -> Result<PhysicalAddress, OutOfFrames> {
    frames().allocate()
}

/// Release one owner of a kernel-pool frame. See [`FramePool::release`].
#[track_caller]
pub fn kfree(frame: PhysicalAddress) {
    frames().release(frame);
}

/// Add an owner to a kernel-pool frame. See [`FramePool::add_owner`].
#[track_caller]
pub fn kref(frame: PhysicalAddress) {
    frames().add_owner(frame);
}
