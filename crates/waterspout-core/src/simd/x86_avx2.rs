//! AVX2 tier: 256-bit integer arithmetic.
//!
//! Moves and float kernels are inherited from AVX.

#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::Element;

pub(super) const STRIDE: Stride = Stride::new(32, 32);

pub(super) const TABLE: KernelTable = KernelTable {
    i8: add_sub(add_i8, sub_i8),
    u8: add_sub(add_u8, sub_u8),
    i16: Kernels {
        mul: Some(mul_i16),
        ..add_sub(add_i16, sub_i16)
    },
    u16: Kernels {
        mul: Some(mul_u16),
        ..add_sub(add_u16, sub_u16)
    },
    i32: Kernels {
        mul: Some(mul_i32),
        ..add_sub(add_i32, sub_i32)
    },
    u32: Kernels {
        mul: Some(mul_u32),
        ..add_sub(add_u32, sub_u32)
    },
    i64: add_sub(add_i64, sub_i64),
    u64: add_sub(add_u64, sub_u64),
    f32: Kernels::NONE,
    f64: Kernels::NONE,
};

const fn add_sub<T>(
    add: fn(&[T], &[T], &mut [T]) -> Outcome,
    sub: fn(&[T], &[T], &mut [T]) -> Outcome,
) -> Kernels<T> {
    Kernels {
        add: Some(add),
        sub: Some(sub),
        ..Kernels::NONE
    }
}

macro_rules! avx2_binary {
    ($($name:ident: $t:ty => $op:ident, $intrinsic:ident;)*) => {
        target_kernels! { "avx2";
            $(
                fn $name(a: &[$t], b: &[$t], dst: &mut [$t]) {
                    unroll::zip(
                        STRIDE,
                        a,
                        b,
                        dst,
                        Denormals::Keep,
                        <$t as Element>::$op,
                        |x: __m256i, y| unsafe { $intrinsic(x, y) },
                    )
                }
            )*
        }
    };
}

avx2_binary! {
    add_i8: i8 => add, _mm256_add_epi8;
    add_u8: u8 => add, _mm256_add_epi8;
    add_i16: i16 => add, _mm256_add_epi16;
    add_u16: u16 => add, _mm256_add_epi16;
    add_i32: i32 => add, _mm256_add_epi32;
    add_u32: u32 => add, _mm256_add_epi32;
    add_i64: i64 => add, _mm256_add_epi64;
    add_u64: u64 => add, _mm256_add_epi64;
    sub_i8: i8 => sub, _mm256_sub_epi8;
    sub_u8: u8 => sub, _mm256_sub_epi8;
    sub_i16: i16 => sub, _mm256_sub_epi16;
    sub_u16: u16 => sub, _mm256_sub_epi16;
    sub_i32: i32 => sub, _mm256_sub_epi32;
    sub_u32: u32 => sub, _mm256_sub_epi32;
    sub_i64: i64 => sub, _mm256_sub_epi64;
    sub_u64: u64 => sub, _mm256_sub_epi64;
    mul_i16: i16 => mul, _mm256_mullo_epi16;
    mul_u16: u16 => mul, _mm256_mullo_epi16;
    mul_i32: i32 => mul, _mm256_mullo_epi32;
    mul_u32: u32 => mul, _mm256_mullo_epi32;
}
