//! Heap buffers with a guaranteed start alignment.
//!
//! Vector bodies only run on the aligned part of a buffer, so tests and the
//! `verify` command need storage whose address they control: allocate a
//! 32-byte-aligned buffer, then slice at a byte offset to reach every
//! misalignment a kernel can see.

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use crate::element::Element;
use crate::memory::AllocGuard;

/// Alignment of [`AlignedBuffer::new`], the widest vector the tiers use.
pub const DEFAULT_ALIGNMENT: usize = 32;

/// Zero-initialised, fixed-alignment storage for `len` elements.
pub struct AlignedBuffer<T: Element> {
    ptr: NonNull<T>,
    len: usize,
    alignment: usize,
    /// `None` for an empty buffer.
    storage: Option<AllocGuard>,
}

impl<T: Element> AlignedBuffer<T> {
    /// `len` zeroes starting on a 32-byte boundary.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self::with_alignment(len, DEFAULT_ALIGNMENT)
    }

    /// `len` zeroes starting on an `alignment`-byte boundary.
    ///
    /// Alignments below the natural alignment of `T` are raised to it.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or the byte size
    /// overflows `isize`. Aborts through [`std::alloc::handle_alloc_error`]
    /// when the allocator fails.
    #[must_use]
    pub fn with_alignment(len: usize, alignment: usize) -> Self {
        assert!(
            alignment.is_power_of_two(),
            "alignment must be a power of two, got {alignment}"
        );
        let alignment = alignment.max(mem::align_of::<T>());
        let storage = Self::allocate(len, alignment);
        let ptr = storage
            .as_ref()
            .map_or_else(NonNull::dangling, AllocGuard::cast::<T>);
        Self {
            ptr,
            len,
            alignment,
            storage,
        }
    }

    /// Copies `values` into a new buffer with the default alignment.
    #[must_use]
    pub fn from_slice(values: &[T]) -> Self {
        let mut buffer = Self::new(values.len());
        buffer.copy_from_slice(values);
        buffer
    }

    fn allocate(len: usize, alignment: usize) -> Option<AllocGuard> {
        if len == 0 {
            return None;
        }
        let layout = match std::alloc::Layout::array::<T>(len)
            .and_then(|layout| layout.align_to(alignment))
        {
            Ok(layout) => layout,
            Err(_) => panic!("capacity overflow: {len} elements of {}", T::NAME),
        };
        match AllocGuard::zeroed(layout) {
            Some(guard) => Some(guard),
            None => std::alloc::handle_alloc_error(layout),
        }
    }

    /// Changes the length, keeping the common prefix and zero-filling the rest.
    ///
    /// The alignment is preserved.
    pub fn resize(&mut self, len: usize) {
        if len == self.len {
            return;
        }
        let mut resized = Self::with_alignment(len, self.alignment);
        let kept = len.min(self.len);
        resized[..kept].copy_from_slice(&self[..kept]);
        *self = resized;
    }

    /// Guaranteed alignment of the first element, in bytes.
    #[must_use]
    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

impl<T: Element> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` covers `len` initialised elements.
        // - Condition 1: A non-empty buffer owns `len * size_of::<T>()` zeroed bytes,
        //   and the all-zero pattern is a valid value of every `Element`.
        // - Condition 2: An empty buffer uses a dangling, well-aligned pointer with len 0.
        // Reason: Exposes the over-aligned allocation as an ordinary slice.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Element> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: Same invariants as `deref`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Element> Clone for AlignedBuffer<T> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_alignment(self.len, self.alignment);
        copy.copy_from_slice(self);
        copy
    }
}

impl<T: Element> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("alignment", &self.alignment)
            .field("data", &self.deref())
            .finish()
    }
}

// SAFETY: `AlignedBuffer<T>` behaves like `Box<[T]>`.
// - Condition 1: The allocation is owned exclusively; `ptr` never aliases another buffer.
// - Condition 2: `T: Element` is `Send + Sync`, and shared access only hands out `&[T]`.
// Reason: Gives the buffer the same thread-safety as the equivalent `Vec<T>`.
unsafe impl<T: Element> Send for AlignedBuffer<T> {}
// SAFETY: See `Send` above; `&AlignedBuffer<T>` exposes only `&[T]`.
unsafe impl<T: Element> Sync for AlignedBuffer<T> {}
