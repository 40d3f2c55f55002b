use crate::addr::PhysicalAddress;
use crate::phys::PhysMapper;

/// End-of-list marker. Never frame aligned, so it cannot name a real frame.
const NIL: u64 = u64::MAX;

/// Link stored in the first bytes of every **free** frame.
///
/// ```text
/// +-----------------+---------------------------------+
/// | FreeNode (next) |  rest of frame (FREE_FILL junk) |
/// +-----------------+---------------------------------+
/// ^ frame base      ^ frame base + 8
/// ```
///
/// Once a frame leaves the list its whole content belongs to the new owner.
#[repr(C)]
struct FreeNode {
    /// Physical address of the next free frame, or [`NIL`].
    next: u64,
}

/// Intrusive LIFO stack of free frames.
///
/// The list itself only knows the head; the links live inside the frames and
/// are read and written through a [`PhysMapper`].
///
/// # Invariants
/// - Every linked frame is owned by the list: nothing else reads or writes
///   its first `size_of::<FreeNode>()` bytes.
/// - `len` equals the number of linked frames.
pub(crate) struct FreeList {
    head: u64,
    len: usize,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { head: NIL, len: 0 }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.head == NIL
    }

    /// Address of the head frame without unlinking it.
    #[inline]
    pub(crate) const fn peek(&self) -> Option<PhysicalAddress> {
        if self.head == NIL {
            None
        } else {
            Some(PhysicalAddress::new(self.head))
        }
    }

    /// Link `frame` in as the new head.
    ///
    /// # Safety
    /// - `frame` must be a frame-aligned address mapped by `mapper`.
    /// - The caller must own `frame` exclusively and hand that ownership to
    ///   the list; the frame must not already be linked.
    pub(crate) unsafe fn push<M: PhysMapper>(&mut self, mapper: &M, frame: PhysicalAddress) {
        debug_assert!(frame.is_frame_aligned());
        // SAFETY: the caller hands us exclusive ownership of a mapped frame.
        let node = unsafe { mapper.phys_to_mut::<FreeNode>(frame) };
        node.next = self.head;
        self.head = frame.as_u64();
        self.len += 1;
    }

    /// Unlink and return the head frame.
    ///
    /// # Safety
    /// Every linked frame must still be mapped by `mapper` and untouched since
    /// it was pushed.
    pub(crate) unsafe fn pop<M: PhysMapper>(&mut self, mapper: &M) -> Option<PhysicalAddress> {
        if self.is_empty() {
            return None;
        }
        let frame = PhysicalAddress::new(self.head);
        // SAFETY: linked frames are owned by the list and mapped.
        let node = unsafe { mapper.phys_to_mut::<FreeNode>(frame) };
        self.head = node.next;
        self.len -= 1;
        Some(frame)
    }
}
