//! # Physical Frame Pool
//!
//! Reference-counted allocator for the 4 KiB physical frames between the end
//! of the kernel image and the top of physical memory. Frames back page
//! tables, address spaces, pipe buffers and kernel stacks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    FramePool                        │
//! │   initialize · allocate · release · add_owner       │
//! │          (one kernel-sync Mutex<_, R>)              │
//! └──────────────┬──────────────────────┬───────────────┘
//!                │                      │
//! ┌──────────────▼─────────┐ ┌──────────▼───────────────┐
//! │   Reference counts     │ │   Free list              │
//! │   u32 per frame        │ │   intrusive LIFO stack,  │
//! │   (caller's table)     │ │   links inside frames    │
//! └────────────────────────┘ └──────────┬───────────────┘
//!                                       │
//!                            ┌──────────▼───────────────┐
//!                            │   PhysMapper             │
//!                            │   PA → usable pointer    │
//!                            └──────────────────────────┘
//! ```
//!
//! A frame is **free** (count 0, linked) or **owned** (count ≥ 1, unlinked).
//! [`FramePool::add_owner`] lets several address spaces share one frame
//! (copy-on-write after fork); the frame returns to the free list only when
//! the last owner calls [`FramePool::release`].
//!
//! ## Errors
//!
//! Running out of frames is an ordinary [`OutOfFrames`] result. Anything that
//! breaks the count/free-list correspondence (double free, adding an owner to
//! a free frame, foreign addresses) is a bug and halts through
//! [`error::fatal`]; see [`Violation`].
//!
//! ## Debug fill patterns
//!
//! Allocated frames are filled with [`ALLOC_FILL`], freed frames with
//! [`FREE_FILL`], so stale reads of either kind stand out in a memory dump.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod addr;
pub mod error;
mod free_list;
pub mod global;
mod phys;
mod pool;
mod range;
mod refcount;

pub use addr::{FRAME_SHIFT, FRAME_SIZE, PhysicalAddress, align_down, align_up};
pub use error::{InstallError, OutOfFrames, PoolConfigError, Violation};
pub use phys::{OffsetPhysMapper, PhysMapper};
pub use pool::{ALLOC_FILL, FREE_FILL, FramePool, FramePoolStats};
pub use range::FrameRange;

/// Source of **physical** 4 KiB frames, as consumed by page-table builders.
///
/// Returned frames are frame aligned. Returns `None` on out-of-memory.
pub trait FrameAlloc {
    /// Allocate one 4 KiB physical frame.
    fn alloc_4k(&mut self) -> Option<PhysicalAddress>;
}
