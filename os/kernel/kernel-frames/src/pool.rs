//! # The frame pool
//!
//! [`FramePool`] ties the reference-count table and the free list together
//! under one lock and enforces the per-frame state machine:
//!
//! ```text
//!             allocate              add_owner
//!  FREE(0) ─────────────▶ OWNED(1) ───────────▶ OWNED(k)
//!     ▲                      │                     │
//!     └──────── release ─────┘◀────── release ─────┘
//!          (last owner)           (k - 1 remain)
//! ```
//!
//! A frame is on the free list exactly when its count is 0. Breaking that
//! correspondence (double free, re-owning a free frame, a stray address) is
//! fatal, see [`Violation`].

use crate::FrameAlloc;
use crate::addr::{FRAME_SIZE, PhysicalAddress};
use crate::error::{OutOfFrames, PoolConfigError, Violation, fatal};
use crate::free_list::FreeList;
use crate::phys::PhysMapper;
use crate::range::FrameRange;
use crate::refcount::RefCountTable;
use kernel_sync::{Mutex, RawLock, RawSpin, RawUnlock};
use log::{debug, info, trace};

/// Byte pattern written over a frame when it is handed out.
pub const ALLOC_FILL: u8 = 0x05;

/// Byte pattern written over a frame when its last owner releases it.
pub const FREE_FILL: u8 = 0x01;

const _: () = assert!(ALLOC_FILL != FREE_FILL);

#[allow(clippy::cast_possible_truncation)]
const FRAME_BYTES: usize = FRAME_SIZE as usize;

/// Everything the pool lock protects.
struct PoolState<'a> {
    counts: RefCountTable<'a>,
    free: FreeList,
    initialized: bool,
}

/// Snapshot of the pool taken under its lock.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FramePoolStats {
    /// Frames in the managed range.
    pub total: usize,
    /// Frames on the free list.
    pub free: usize,
    /// Sum of all reference counts.
    pub references: u64,
}

/// Reference-counted pool of 4 KiB physical frames.
///
/// - `'a`: lifetime of the caller-provided reference-count table.
/// - `M`: how frame contents are reached, see [`PhysMapper`].
/// - `R`: the raw lock guarding the pool; a busy-wait lock, since every
///   critical section is a handful of integer and pointer operations.
///
/// # Example
/// ```rust
/// use kernel_frames::{FramePool, FrameRange, OffsetPhysMapper, PhysicalAddress, ALLOC_FILL};
///
/// #[repr(align(4096))]
/// struct Frame([u8; 4096]);
///
/// // Eight frames of "physical memory" starting at 2 MiB.
/// let mut ram: Vec<Frame> = (0..8).map(|_| Frame([0; 4096])).collect();
/// let base = 0x20_0000;
/// let mapper = OffsetPhysMapper::new((ram.as_mut_ptr() as u64).wrapping_sub(base));
///
/// let range = FrameRange::new(PhysicalAddress::new(base), PhysicalAddress::new(base + 8 * 4096))?;
/// let mut counts = [0u32; 8];
/// let pool: FramePool<'_, _> = FramePool::new(range, &mut counts, mapper)?;
/// pool.initialize();
///
/// let frame = pool.allocate()?;
/// pool.add_owner(frame); // shared copy-on-write
/// pool.release(frame);
/// assert_eq!(pool.ref_count(frame), 1);
/// pool.release(frame);
/// assert_eq!(pool.free_frames(), 8);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FramePool<'a, M, R = RawSpin> {
    range: FrameRange,
    mapper: M,
    state: Mutex<PoolState<'a>, R>,
}

impl<'a, M, R> FramePool<'a, M, R>
where
    M: PhysMapper,
    R: RawLock + RawUnlock,
{
    /// Bind a pool to `range`, using `counts` as its reference-count table.
    ///
    /// The table is zeroed and the free list starts empty; call
    /// [`initialize`](Self::initialize) to populate it. No frame memory is
    /// touched here.
    ///
    /// # Errors
    /// [`PoolConfigError::TableTooSmall`] if `counts` has fewer slots than
    /// `range` has frames.
    pub fn new(range: FrameRange, counts: &'a mut [u32], mapper: M) -> Result<Self, PoolConfigError>
    where
        R: Default,
    {
        let counts = RefCountTable::new(range, counts)?;
        Ok(Self {
            range,
            mapper,
            state: Mutex::from_raw(
                R::default(),
                PoolState {
                    counts,
                    free: FreeList::new(),
                    initialized: false,
                },
            ),
        })
    }

    /// Hand every frame in the range to the free list.
    ///
    /// Each frame is given one owner and then released like any other frame,
    /// so population follows exactly the path ordinary callers take.
    ///
    /// # Panics
    /// Fatal ([`Violation::AlreadyInitialized`]) when called a second time.
    pub fn initialize(&self) {
        self.state.with_lock(|state| {
            if state.initialized {
                fatal(Violation::AlreadyInitialized);
            }
            state.initialized = true;
        });

        for frame in self.range.frames() {
            self.state.lock().counts.set(frame, 1);
            self.release(frame);
        }

        info!(
            "frame pool: {} frames of {} bytes in {}",
            self.range.frame_count(),
            FRAME_SIZE,
            self.range
        );
    }

    /// Take a frame off the free list; the caller becomes its only owner.
    ///
    /// The frame is filled with [`ALLOC_FILL`] before it is returned.
    ///
    /// # Errors
    /// [`OutOfFrames`] when the free list is empty.
    ///
    /// # Panics
    /// Fatal when the free list is corrupt: the head lies outside the range
    /// or the popped frame still has owners.
    pub fn allocate(&self) -> Result<PhysicalAddress, OutOfFrames> {
        let frame = {
            let mut state = self.state.lock();
            let Some(frame) = state.free.peek() else {
                drop(state);
                debug!("frame pool: out of frames");
                return Err(OutOfFrames);
            };
            if !frame.is_frame_aligned() || !self.range.contains(frame) {
                fatal(Violation::CorruptFreeList(frame));
            }

            // SAFETY: the head is a linked, mapped frame (checked above).
            let popped = unsafe { state.free.pop(&self.mapper) };
            debug_assert_eq!(popped, Some(frame));

            let count = state.counts.get(frame);
            if count != 0 {
                fatal(Violation::OwnedFrameOnFreeList { frame, count });
            }
            state.counts.set(frame, 1);
            frame
        };

        // SAFETY: the frame just left the list and is owned by this call alone.
        unsafe { self.fill(frame, ALLOC_FILL) };
        Ok(frame)
    }

    /// Drop one owner of `frame`; the last owner returns it to the free list.
    ///
    /// While other owners remain the frame is left untouched. Otherwise it is
    /// filled with [`FREE_FILL`] outside the lock and linked in under a second,
    /// separate critical section. Between the two the frame has count 0 and
    /// is reachable only by the calling context.
    ///
    /// # Panics
    /// Fatal when `frame` is not frame aligned, lies outside the range, or
    /// has no owner (double free).
    pub fn release(&self, frame: PhysicalAddress) {
        if !frame.is_frame_aligned() {
            fatal(Violation::Misaligned(frame));
        }
        if !self.range.contains(frame) {
            fatal(Violation::OutOfRange(frame));
        }

        let remaining = self.state.lock().counts.decrement(frame);
        if remaining > 0 {
            trace!("frame pool: {frame} still has {remaining} owner(s)");
            return;
        }

        // SAFETY: count reached 0, so no other owner may touch the frame.
        unsafe { self.fill(frame, FREE_FILL) };

        let mut state = self.state.lock();
        // SAFETY: ownership of the frame moves to the list.
        unsafe { state.free.push(&self.mapper, frame) };
    }

    /// Register an additional owner of an allocated frame.
    ///
    /// `frame` may point anywhere inside the frame. The caller must itself
    /// hold a reference for the duration of this call: racing `add_owner`
    /// against the release of the last *other* owner is a caller bug the pool
    /// does not detect.
    ///
    /// # Panics
    /// Fatal when `frame` lies outside the range, the frame is free
    /// (resurrection), or its count would overflow.
    pub fn add_owner(&self, frame: PhysicalAddress) {
        if !self.range.contains(frame) {
            fatal(Violation::OutOfRange(frame));
        }
        self.state.lock().counts.increment(frame.frame_base());
    }

    /// Current number of owners of the frame containing `frame`.
    ///
    /// # Panics
    /// Fatal when `frame` lies outside the range.
    #[must_use]
    pub fn ref_count(&self, frame: PhysicalAddress) -> u32 {
        if !self.range.contains(frame) {
            fatal(Violation::OutOfRange(frame));
        }
        self.state.lock().counts.get(frame.frame_base())
    }

    /// Number of frames currently on the free list.
    #[must_use]
    pub fn free_frames(&self) -> usize {
        self.state.lock().free.len()
    }

    /// Number of frames in the managed range.
    #[must_use]
    pub const fn total_frames(&self) -> usize {
        self.range.frame_count()
    }

    /// The managed physical range.
    #[must_use]
    pub const fn range(&self) -> FrameRange {
        self.range
    }

    /// Consistent view of the free-list length and the count total.
    #[must_use]
    pub fn stats(&self) -> FramePoolStats {
        let state = self.state.lock();
        FramePoolStats {
            total: self.range.frame_count(),
            free: state.free.len(),
            references: state.counts.total(),
        }
    }

    /// Overwrite the whole frame with `pattern`.
    ///
    /// # Safety
    /// The caller must own `frame` exclusively.
    unsafe fn fill(&self, frame: PhysicalAddress, pattern: u8) {
        // SAFETY: the frame lies in the mapped range and nobody else uses it.
        let bytes = unsafe { self.mapper.phys_to_mut::<[u8; FRAME_BYTES]>(frame) };
        bytes.fill(pattern);
    }
}

impl<M, R> FrameAlloc for &FramePool<'_, M, R>
where
    M: PhysMapper,
    R: RawLock + RawUnlock,
{
    fn alloc_4k(&mut self) -> Option<PhysicalAddress> {
        self.allocate().ok()
    }
}
