//! SSE3 and SSSE3 tiers.
//!
//! SSE3 adds one kernel: a copy that tolerates a source misaligned
//! differently from the destination. The source is streamed with `lddqu`
//! while stores stay aligned on the destination. SSSE3 adds nothing over SSE3.

#![allow(unused_unsafe)]

use std::arch::x86_64::*;
use std::mem::size_of;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Split, Stride};
use crate::element::Element;

pub(super) const STRIDE: Stride = Stride::new(16, 32);

pub(super) const TABLE: KernelTable = KernelTable {
    i8: copy_row(),
    u8: copy_row(),
    i16: copy_row(),
    u16: copy_row(),
    i32: copy_row(),
    u32: copy_row(),
    i64: copy_row(),
    u64: copy_row(),
    f32: copy_row(),
    f64: copy_row(),
};

pub(super) const SSSE3_TABLE: KernelTable = KernelTable::NONE;

const fn copy_row<T: Element>() -> Kernels<T> {
    Kernels {
        copy: Some(copy::<T>),
        ..Kernels::NONE
    }
}

target_kernels! { "sse3";
    fn copy<T>(src: &[T], dst: &mut [T]) {
        if dst.len() < STRIDE.min_len {
            return Outcome::Fallback;
        }
        let Some(split) = Split::plan(dst.as_ptr(), dst.len(), STRIDE.bytes) else {
            return Outcome::Fallback;
        };
        let lanes = STRIDE.bytes / size_of::<T>();
        let (src_head, src_rest) = src.split_at(split.head);
        let (src_body, src_tail) = src_rest.split_at(split.body);
        let (dst_head, dst_rest) = dst.split_at_mut(split.head);
        let (dst_body, dst_tail) = dst_rest.split_at_mut(split.body);

        dst_head.copy_from_slice(src_head);
        // SAFETY: `Split::plan` starts `dst_body` on a 16-byte boundary and
        // sizes it to whole vectors; `src` is only read through `lddqu`.
        let to = unroll::vectors_mut::<T, __m128i>(dst_body);
        for (i, lane) in to.iter_mut().enumerate() {
            // `lddqu` has no alignment requirement; `i * lanes + lanes <= src_body.len()`.
            *lane = _mm_lddqu_si128(src_body.as_ptr().add(i * lanes).cast());
        }
        dst_tail.copy_from_slice(src_tail);
        Outcome::Done
    }
}
