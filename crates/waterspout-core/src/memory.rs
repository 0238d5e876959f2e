//! RAII guard over aligned heap allocations.
//!
//! This is the allocator behind [`AlignedBuffer`](crate::AlignedBuffer). The
//! dispatcher itself never allocates; operands are always caller-owned.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

/// Allocates `size` zeroed bytes aligned to `align`.
///
/// Returns `None` when `size` is zero, `align` is not a power of two, the
/// rounded size overflows, or the allocator is out of memory. The memory is
/// freed when the guard drops.
#[must_use]
pub fn allocate(size: usize, align: usize) -> Option<AllocGuard> {
    let layout = Layout::from_size_align(size, align).ok()?;
    AllocGuard::zeroed(layout)
}

/// Owner of one zero-initialised raw allocation, freed on drop.
#[derive(Debug)]
pub struct AllocGuard {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AllocGuard {
    /// Allocates zeroed memory with the given layout.
    ///
    /// Returns `None` for a zero-sized layout or when allocation fails.
    #[must_use]
    pub fn zeroed(layout: Layout) -> Option<Self> {
        if layout.size() == 0 {
            return None;
        }

        // SAFETY: `alloc_zeroed` requires a valid non-zero layout.
        // - Condition 1: `layout.size() > 0` is checked above.
        // - Condition 2: `Layout` comes from std constructors and is well-formed.
        // Reason: Over-aligned storage is not expressible through `Vec`.
        let ptr = unsafe { alloc_zeroed(layout) };

        NonNull::new(ptr).map(|ptr| Self { ptr, layout })
    }

    /// Start of the allocation.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Layout the memory was allocated with.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Typed view of the start of the allocation.
    #[inline]
    #[must_use]
    pub fn cast<T>(&self) -> NonNull<T> {
        self.ptr.cast()
    }
}

impl Drop for AllocGuard {
    fn drop(&mut self) {
        // SAFETY: `dealloc` requires the original pointer/layout pair.
        // - Condition 1: `self.ptr` was produced by `alloc_zeroed(self.layout)`.
        // - Condition 2: `drop` runs once and the guard is the only owner.
        // Reason: Manual deallocation is needed for raw-memory RAII.
        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

// SAFETY: `AllocGuard` is `Send` because it owns an allocation handle only.
// - Condition 1: No aliasing references are stored, only pointer + layout metadata.
// - Condition 2: Mutation requires `&mut self`, preventing cross-thread races on the type.
// Reason: Heap allocations are not thread-affine; ownership transfer across threads is sound.
unsafe impl Send for AllocGuard {}
