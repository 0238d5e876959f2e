//! SSE4.1 and SSE4.2 tiers.
//!
//! SSE4.1 brings a 32-bit low multiply (`pmulld`); SSE4.2 adds nothing for
//! buffer arithmetic and inherits SSE4.1.

#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::Element;

pub(super) const STRIDE: Stride = Stride::new(16, 32);

pub(super) const TABLE: KernelTable = KernelTable {
    i32: Kernels {
        mul: Some(mul_i32),
        ..Kernels::NONE
    },
    u32: Kernels {
        mul: Some(mul_u32),
        ..Kernels::NONE
    },
    ..KernelTable::NONE
};

pub(super) const SSE42_TABLE: KernelTable = KernelTable::NONE;

target_kernels! { "sse4.1";
    fn mul_i32(a: &[i32], b: &[i32], dst: &mut [i32]) {
        unroll::zip(
            STRIDE,
            a,
            b,
            dst,
            Denormals::Keep,
            <i32 as Element>::mul,
            |x: __m128i, y| unsafe { _mm_mullo_epi32(x, y) },
        )
    }

    fn mul_u32(a: &[u32], b: &[u32], dst: &mut [u32]) {
        unroll::zip(
            STRIDE,
            a,
            b,
            dst,
            Denormals::Keep,
            <u32 as Element>::mul,
            |x: __m128i, y| unsafe { _mm_mullo_epi32(x, y) },
        )
    }
}
