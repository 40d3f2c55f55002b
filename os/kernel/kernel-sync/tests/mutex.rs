use kernel_sync::{Mutex, RawSpin, RawTicket, SpinMutex, SyncOnceCell, TicketMutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::{panic, thread};

#[test]
fn guard_releases_on_drop() {
    let m = SpinMutex::new(0_u32);

    {
        let mut g = m.lock();
        *g = 41;
        assert!(m.is_locked());
    }
    assert!(!m.is_locked());

    let mut g = m.lock();
    *g += 1;
    assert_eq!(*g, 42);
}

#[test]
fn try_lock_fails_while_held() {
    let m = TicketMutex::new(1u8);

    let g1 = m.try_lock();
    assert!(g1.is_some());
    assert!(m.try_lock().is_none());

    drop(g1);
    assert!(m.try_lock().is_some());
}

#[test]
fn with_lock_returns_closure_value() {
    let m = SpinMutex::new(vec![1, 2]);
    let len = m.with_lock(|v| {
        v.push(3);
        v.len()
    });
    assert_eq!(len, 3);
    assert!(!m.is_locked());
    assert_eq!(m.into_inner(), vec![1, 2, 3]);
}

#[test]
fn get_mut_bypasses_the_lock() {
    let mut m = Mutex::from_raw(RawTicket::new(), 7u64);
    *m.get_mut() += 1;
    assert_eq!(*m.lock(), 8);
}

#[test]
fn lock_is_released_on_panic() {
    let m = SpinMutex::new(0u32);

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        m.with_lock(|v| {
            *v = 123;
            panic!("boom");
        });
    }));
    assert!(res.is_err(), "expected panic");
    assert_eq!(m.with_lock(|v| *v), 123);
}

fn hammer<R>(lock: Arc<Mutex<usize, R>>)
where
    R: kernel_sync::RawLock + kernel_sync::RawUnlock + Send + Sync + 'static,
{
    let threads = 8;
    let iters = 5_000;

    let in_cs = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let in_cs = Arc::clone(&in_cs);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for _ in 0..iters {
                    lock.with_lock(|v| {
                        let prev = in_cs.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(prev, 0, "mutual exclusion violated");
                        *v += 1;
                        in_cs.fetch_sub(1, Ordering::SeqCst);
                    });
                    thread::yield_now();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(lock.with_lock(|v| *v), threads * iters);
}

#[test]
fn spin_mutex_is_exclusive_under_contention() {
    hammer(Arc::new(Mutex::from_raw(RawSpin::new(), 0usize)));
}

#[test]
fn ticket_mutex_is_exclusive_under_contention() {
    hammer(Arc::new(Mutex::from_raw(RawTicket::new(), 0usize)));
}

#[test]
fn once_cell_runs_initializer_once() {
    let cell = SyncOnceCell::new();
    assert!(cell.get().is_none());

    assert_eq!(cell.set(|| 5u32), Ok(&5));
    assert_eq!(cell.set(|| 6), Err(&5));
    assert_eq!(*cell.get_or_init(|| 9), 5);
}

#[test]
fn once_cell_has_a_single_winner_across_threads() {
    let cell = Arc::new(SyncOnceCell::new());
    let winners = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4usize)
        .map(|i| {
            let cell = Arc::clone(&cell);
            let winners = Arc::clone(&winners);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                if cell.set(|| i).is_ok() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert!(cell.get().is_some());
}
