#![allow(dead_code)]

use kernel_frames::{FRAME_SIZE, FrameRange, OffsetPhysMapper, PhysicalAddress};

/// A 4 KiB-aligned raw frame; the unit of the emulated physical memory.
#[repr(align(4096))]
pub struct Aligned4K(pub [u8; 4096]);

/// Host memory standing in for a window of physical RAM.
///
/// The window starts at `phys_base` and spans `frames` whole frames. The
/// mapper hands out pointers into the owned buffer, so the buffer must outlive
/// every pool built on it.
pub struct TestRam {
    frames: Vec<Aligned4K>,
    phys_base: u64,
    ptr: *mut Aligned4K,
}

// Safety: frames are only written through pool-owned references, and the
// pool hands each frame to at most one context at a time.
unsafe impl Sync for TestRam {}
unsafe impl Send for TestRam {}

impl TestRam {
    pub fn new(phys_base: u64, frames: usize) -> Self {
        assert_eq!(phys_base % FRAME_SIZE, 0);
        let mut v: Vec<Aligned4K> = (0..frames).map(|_| Aligned4K([0xAA; 4096])).collect();
        let ptr = v.as_mut_ptr();
        Self {
            frames: v,
            phys_base,
            ptr,
        }
    }

    pub fn mapper(&self) -> OffsetPhysMapper {
        OffsetPhysMapper::new((self.ptr as u64).wrapping_sub(self.phys_base))
    }

    pub fn top(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.phys_base + self.frames.len() as u64 * FRAME_SIZE)
    }

    pub fn base(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.phys_base)
    }

    /// The whole window as a range.
    pub fn range(&self) -> FrameRange {
        FrameRange::new(self.base(), self.top()).unwrap()
    }

    /// Copy of the bytes of the frame at `pa`.
    pub fn frame_bytes(&self, pa: PhysicalAddress) -> Vec<u8> {
        let idx = ((pa.as_u64() - self.phys_base) / FRAME_SIZE) as usize;
        // SAFETY: reading through the same provenance the mapper writes with.
        unsafe { (*self.ptr.add(idx)).0.to_vec() }
    }
}

impl TestRam {
    /// Overwrite the free-list link stored in the first 8 bytes of `frame`.
    pub fn write_link(&self, frame: PhysicalAddress, next: u64) {
        let idx = ((frame.as_u64() - self.phys_base) / FRAME_SIZE) as usize;
        // SAFETY: same provenance the mapper uses; the test owns the frame layout.
        unsafe { (&mut (*self.ptr.add(idx)).0)[..8].copy_from_slice(&next.to_ne_bytes()) }
    }
}

/// A reference-count table with one slot per frame of `ram`.
pub fn count_table(ram: &TestRam) -> Vec<u32> {
    vec![0; ram.range().frame_count()]
}
