//! Alignment-aware head / body / tail execution shared by every vector tier.
//!
//! A kernel call is split into:
//! 1. an unaligned head, processed element by element until the destination
//!    reaches a vector boundary,
//! 2. an aligned body, reinterpreted as whole vector registers,
//! 3. a tail of fewer than one vector, processed element by element.
//!
//! Every operand must share the destination's misalignment, otherwise the
//! kernel reports [`Outcome::Fallback`] without touching anything. The
//! reinterpretation itself lives in [`vectors`] / [`vectors_mut`] only.

use std::mem::{align_of, size_of, size_of_val};

use super::denormal::DenormalGuard;
use super::kernels::Outcome;
use crate::element::Element;

/// Vector width in bytes and the shortest buffer worth vectorizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stride {
    pub bytes: usize,
    pub min_len: usize,
}

impl Stride {
    pub(crate) const fn new(bytes: usize, min_len: usize) -> Self {
        Self { bytes, min_len }
    }
}

/// Whether the vector body runs under a [`DenormalGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Denormals {
    Keep,
    Flush,
}

/// Byte offset of `ptr` past the previous `bytes` boundary.
#[inline(always)]
pub(crate) fn misalignment<T>(ptr: *const T, bytes: usize) -> usize {
    ptr as usize % bytes
}

/// Element counts of the three phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Split {
    pub head: usize,
    pub body: usize,
    pub tail: usize,
}

impl Split {
    /// Partitions `len` elements starting at `ptr` around `bytes` boundaries.
    ///
    /// Returns `None` when the misalignment is not a whole number of elements.
    pub(crate) fn plan<T>(ptr: *const T, len: usize, bytes: usize) -> Option<Self> {
        let size = size_of::<T>();
        let misalign = misalignment(ptr, bytes);
        if misalign % size != 0 {
            return None;
        }
        let head = if misalign == 0 {
            0
        } else {
            ((bytes - misalign) / size).min(len)
        };
        let lanes = bytes / size;
        let rest = len - head;
        let tail = rest % lanes;
        Some(Self {
            head,
            body: rest - tail,
            tail,
        })
    }
}

/// Views an aligned run of elements as vector registers.
///
/// # Safety
///
/// - `elems` must start on an `align_of::<V>()` boundary
/// - `size_of_val(elems)` must be a multiple of `size_of::<V>()`
/// - every bit pattern must be a valid `V` (true for SIMD register types)
#[inline(always)]
pub(crate) unsafe fn vectors<T, V>(elems: &[T]) -> &[V] {
    debug_assert_eq!(elems.as_ptr() as usize % align_of::<V>(), 0);
    debug_assert_eq!(size_of_val(elems) % size_of::<V>(), 0);
    std::slice::from_raw_parts(elems.as_ptr().cast::<V>(), size_of_val(elems) / size_of::<V>())
}

/// Mutable counterpart of [`vectors`].
///
/// # Safety
///
/// Same requirements as [`vectors`].
#[inline(always)]
pub(crate) unsafe fn vectors_mut<T, V>(elems: &mut [T]) -> &mut [V] {
    debug_assert_eq!(elems.as_ptr() as usize % align_of::<V>(), 0);
    debug_assert_eq!(size_of_val(elems) % size_of::<V>(), 0);
    let count = size_of_val(elems) / size_of::<V>();
    std::slice::from_raw_parts_mut(elems.as_mut_ptr().cast::<V>(), count)
}

#[inline(always)]
fn plan<T, V>(stride: Stride, dst: *const T, len: usize) -> Option<Split> {
    debug_assert_eq!(size_of::<V>(), stride.bytes);
    if len < stride.min_len {
        return None;
    }
    Split::plan(dst, len, stride.bytes)
}

// =============================================================================
// Drivers
// =============================================================================

/// Writes `value` everywhere; `splat` is `value` broadcast to a register.
#[inline(always)]
pub(crate) fn fill<T: Element, V: Copy>(stride: Stride, buf: &mut [T], value: T, splat: V) -> Outcome {
    let Some(split) = plan::<T, V>(stride, buf.as_ptr(), buf.len()) else {
        return Outcome::Fallback;
    };
    let (head, rest) = buf.split_at_mut(split.head);
    let (body, tail) = rest.split_at_mut(split.body);

    head.fill(value);
    // SAFETY: `Split::plan` starts `body` on a `stride.bytes` boundary and
    // sizes it to whole vectors; `stride.bytes == size_of::<V>()`.
    for lane in unsafe { vectors_mut::<T, V>(body) } {
        *lane = splat;
    }
    tail.fill(value);
    Outcome::Done
}

/// Rewrites every element in place.
#[inline(always)]
pub(crate) fn map<T: Element, V: Copy>(
    stride: Stride,
    buf: &mut [T],
    denormals: Denormals,
    scalar: impl Fn(T) -> T,
    vector: impl Fn(V) -> V,
) -> Outcome {
    let Some(split) = plan::<T, V>(stride, buf.as_ptr(), buf.len()) else {
        return Outcome::Fallback;
    };
    let (head, rest) = buf.split_at_mut(split.head);
    let (body, tail) = rest.split_at_mut(split.body);

    for x in head.iter_mut() {
        *x = scalar(*x);
    }
    {
        let _guard = (denormals == Denormals::Flush).then(DenormalGuard::acquire);
        // SAFETY: see `fill`.
        for lane in unsafe { vectors_mut::<T, V>(body) } {
            *lane = vector(*lane);
        }
    }
    for x in tail.iter_mut() {
        *x = scalar(*x);
    }
    Outcome::Done
}

/// Copies `src` into `dst`; both must share one misalignment.
#[inline(always)]
pub(crate) fn copy<T: Element, V: Copy>(stride: Stride, src: &[T], dst: &mut [T]) -> Outcome {
    if misalignment(src.as_ptr(), stride.bytes) != misalignment(dst.as_ptr(), stride.bytes) {
        return Outcome::Fallback;
    }
    let Some(split) = plan::<T, V>(stride, dst.as_ptr(), dst.len()) else {
        return Outcome::Fallback;
    };
    let (src_head, src_rest) = src.split_at(split.head);
    let (src_body, src_tail) = src_rest.split_at(split.body);
    let (dst_head, dst_rest) = dst.split_at_mut(split.head);
    let (dst_body, dst_tail) = dst_rest.split_at_mut(split.body);

    dst_head.copy_from_slice(src_head);
    // SAFETY: `src` shares `dst`'s misalignment, so both bodies are aligned.
    let (from, to) = unsafe { (vectors::<T, V>(src_body), vectors_mut::<T, V>(dst_body)) };
    for (d, s) in to.iter_mut().zip(from) {
        *d = *s;
    }
    dst_tail.copy_from_slice(src_tail);
    Outcome::Done
}

/// `dst[i] = op(a[i], b[i])`; all three must share one misalignment.
#[inline(always)]
pub(crate) fn zip<T: Element, V: Copy>(
    stride: Stride,
    a: &[T],
    b: &[T],
    dst: &mut [T],
    denormals: Denormals,
    scalar: impl Fn(T, T) -> T,
    vector: impl Fn(V, V) -> V,
) -> Outcome {
    let misalign = misalignment(dst.as_ptr(), stride.bytes);
    if misalignment(a.as_ptr(), stride.bytes) != misalign
        || misalignment(b.as_ptr(), stride.bytes) != misalign
    {
        return Outcome::Fallback;
    }
    let Some(split) = plan::<T, V>(stride, dst.as_ptr(), dst.len()) else {
        return Outcome::Fallback;
    };
    let (a_head, a_rest) = a.split_at(split.head);
    let (a_body, a_tail) = a_rest.split_at(split.body);
    let (b_head, b_rest) = b.split_at(split.head);
    let (b_body, b_tail) = b_rest.split_at(split.body);
    let (d_head, d_rest) = dst.split_at_mut(split.head);
    let (d_body, d_tail) = d_rest.split_at_mut(split.body);

    for ((d, &x), &y) in d_head.iter_mut().zip(a_head).zip(b_head) {
        *d = scalar(x, y);
    }
    {
        let _guard = (denormals == Denormals::Flush).then(DenormalGuard::acquire);
        // SAFETY: all operands share `dst`'s misalignment, so every body is aligned.
        let (va, vb, vd) = unsafe {
            (
                vectors::<T, V>(a_body),
                vectors::<T, V>(b_body),
                vectors_mut::<T, V>(d_body),
            )
        };
        for ((d, &x), &y) in vd.iter_mut().zip(va).zip(vb) {
            *d = vector(x, y);
        }
    }
    for ((d, &x), &y) in d_tail.iter_mut().zip(a_tail).zip(b_tail) {
        *d = scalar(x, y);
    }
    Outcome::Done
}
