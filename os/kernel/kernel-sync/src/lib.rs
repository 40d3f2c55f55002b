//! # Kernel synchronization primitives
//!
//! Busy-wait locks for short, bounded critical sections. Callers spin instead
//! of yielding, so nothing in here may be held across I/O or a reschedule.
//!
//! [`Mutex`] is generic over its raw lock so that data structures such as the
//! physical frame pool can be parameterized over the locking strategy:
//!
//! | Raw lock | Fairness | Alias |
//! |----------|----------|-------|
//! | [`RawSpin`] | none (test-and-test-and-set) | [`SpinMutex<T>`] |
//! | [`RawTicket`] | FIFO | [`TicketMutex<T>`] |

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod mutex;
mod raw_spin;
mod raw_ticket;
mod sync_once_cell;

pub use mutex::{Mutex, MutexGuard};
pub use raw_spin::RawSpin;
pub use raw_ticket::RawTicket;
pub use sync_once_cell::SyncOnceCell;

pub type SpinMutex<T> = Mutex<T, RawSpin>;
pub type TicketMutex<T> = Mutex<T, RawTicket>;

impl<T> SpinMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::from_raw(RawSpin::new(), value)
    }
}

impl<T> TicketMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::from_raw(RawTicket::new(), value)
    }
}

/// Acquire side of a raw lock.
pub trait RawLock {
    /// Spin until the lock is held by the caller.
    fn raw_lock(&self);

    /// Take the lock if it is free; never spins.
    fn raw_try_lock(&self) -> bool;

    /// Whether some context currently holds the lock. Racy by nature; only
    /// useful for assertions and diagnostics.
    fn raw_is_locked(&self) -> bool;
}

/// Release side of a raw lock.
pub trait RawUnlock {
    /// # Safety
    /// The caller must hold the lock.
    unsafe fn raw_unlock(&self);
}
