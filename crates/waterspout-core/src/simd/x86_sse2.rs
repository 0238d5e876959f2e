//! SSE2 tier: 128-bit integer and double-precision kernels.
//!
//! Covers:
//! - clear / set / copy for every integer type and `f64` (bitwise moves)
//! - wrapping add / subtract for every integer type
//! - 16-bit multiply (`pmullw`)
//! - the full `f64` operation set
//! - `i32` scale through `f64` lanes
//!
//! `f32` stays with the SSE tier. SSE2 is part of the x86_64 baseline.

#![allow(unused_unsafe)]
// `splat_bits` is reinterpreted, not converted, into the i64 lane.
#![allow(clippy::cast_possible_wrap)]

use std::arch::x86_64::*;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::{Element, ANTI_DENORMAL_F64};

pub(super) const STRIDE: Stride = Stride::new(16, 32);

macro_rules! int_row {
    ($t:ty, $add:ident, $sub:ident) => {
        Kernels {
            add: Some($add),
            sub: Some($sub),
            ..Kernels::moves(clear::<$t>, set::<$t>, copy::<$t>)
        }
    };
}

pub(super) const TABLE: KernelTable = KernelTable {
    i8: int_row!(i8, add_i8, sub_i8),
    u8: int_row!(u8, add_u8, sub_u8),
    i16: Kernels {
        mul: Some(mul_i16),
        ..int_row!(i16, add_i16, sub_i16)
    },
    u16: Kernels {
        mul: Some(mul_u16),
        ..int_row!(u16, add_u16, sub_u16)
    },
    i32: Kernels {
        scale: Some(scale_i32),
        ..int_row!(i32, add_i32, sub_i32)
    },
    u32: int_row!(u32, add_u32, sub_u32),
    i64: int_row!(i64, add_i64, sub_i64),
    u64: int_row!(u64, add_u64, sub_u64),
    f32: Kernels::NONE,
    f64: Kernels {
        clear: Some(clear::<f64>),
        set: Some(set::<f64>),
        scale: Some(scale_f64),
        copy: Some(copy::<f64>),
        add: Some(add_f64),
        sub: Some(sub_f64),
        mul: Some(mul_f64),
        div: Some(div_f64),
    },
};

// =============================================================================
// Moves (type-agnostic)
// =============================================================================

fn clear<T: Element>(buf: &mut [T]) -> Outcome {
    unroll::fill(STRIDE, buf, T::ZERO, unsafe { _mm_setzero_si128() })
}

fn set<T: Element>(buf: &mut [T], value: T) -> Outcome {
    let splat = unsafe { _mm_set1_epi64x(value.splat_bits() as i64) };
    unroll::fill(STRIDE, buf, value, splat)
}

fn copy<T: Element>(src: &[T], dst: &mut [T]) -> Outcome {
    unroll::copy::<T, __m128i>(STRIDE, src, dst)
}

// =============================================================================
// Integer arithmetic
// =============================================================================

macro_rules! int_binary {
    ($($name:ident: $t:ty => $op:ident, $intrinsic:ident;)*) => {$(
        fn $name(a: &[$t], b: &[$t], dst: &mut [$t]) -> Outcome {
            unroll::zip(
                STRIDE,
                a,
                b,
                dst,
                Denormals::Keep,
                <$t as Element>::$op,
                |x: __m128i, y| unsafe { $intrinsic(x, y) },
            )
        }
    )*};
}

int_binary! {
    add_i8: i8 => add, _mm_add_epi8;
    add_u8: u8 => add, _mm_add_epi8;
    add_i16: i16 => add, _mm_add_epi16;
    add_u16: u16 => add, _mm_add_epi16;
    add_i32: i32 => add, _mm_add_epi32;
    add_u32: u32 => add, _mm_add_epi32;
    add_i64: i64 => add, _mm_add_epi64;
    add_u64: u64 => add, _mm_add_epi64;
    sub_i8: i8 => sub, _mm_sub_epi8;
    sub_u8: u8 => sub, _mm_sub_epi8;
    sub_i16: i16 => sub, _mm_sub_epi16;
    sub_u16: u16 => sub, _mm_sub_epi16;
    sub_i32: i32 => sub, _mm_sub_epi32;
    sub_u32: u32 => sub, _mm_sub_epi32;
    sub_i64: i64 => sub, _mm_sub_epi64;
    sub_u64: u64 => sub, _mm_sub_epi64;
    mul_i16: i16 => mul, _mm_mullo_epi16;
    mul_u16: u16 => mul, _mm_mullo_epi16;
}

/// Scales two `i32` lanes (the low 64 bits of `v`) in `f64`, rounds half to
/// even and clamps, whatever the MXCSR rounding mode.
///
/// The clamp runs with the product as first operand: MAXPD returns its
/// second operand for NaN, matching `f64::max` in the scalar path. The
/// clamped value is truncated, then its dropped fraction picks the step.
/// Only the two low lanes of the result are meaningful.
#[inline(always)]
unsafe fn scale_pair(v: __m128i, gain: __m128d, lo: __m128d, hi: __m128d) -> __m128i {
    let product = _mm_mul_pd(_mm_cvtepi32_pd(v), gain);
    let clamped = _mm_min_pd(_mm_max_pd(product, lo), hi);
    let whole = _mm_cvttpd_epi32(clamped);
    // Exact: truncation only cleared fraction bits of `clamped`.
    let fraction = _mm_sub_pd(clamped, _mm_cvtepi32_pd(whole));
    let magnitude = _mm_andnot_pd(_mm_set1_pd(-0.0), fraction);
    let half = _mm_set1_pd(0.5);

    let odd = _mm_cmpeq_epi32(_mm_and_si128(whole, _mm_set1_epi32(1)), _mm_set1_epi32(1));
    let tie = _mm_and_si128(narrow(_mm_cmpeq_pd(magnitude, half)), odd);
    let away = _mm_or_si128(narrow(_mm_cmpgt_pd(magnitude, half)), tie);
    // -1 below zero, +1 otherwise.
    let step = _mm_or_si128(narrow(_mm_cmplt_pd(fraction, _mm_setzero_pd())), _mm_set1_epi32(1));
    _mm_add_epi32(whole, _mm_and_si128(away, step))
}

/// Packs the two 64-bit lane masks of `mask` into the two low 32-bit lanes.
#[inline(always)]
unsafe fn narrow(mask: __m128d) -> __m128i {
    _mm_shuffle_epi32::<0b00_00_10_00>(_mm_castpd_si128(mask))
}

fn scale_i32(buf: &mut [i32], gain: f64) -> Outcome {
    let (factor, lo, hi) = unsafe {
        (
            _mm_set1_pd(gain),
            _mm_set1_pd(f64::from(i32::MIN)),
            _mm_set1_pd(f64::from(i32::MAX)),
        )
    };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <i32 as Element>::scale(x, gain),
        |v: __m128i| unsafe {
            let low = scale_pair(v, factor, lo, hi);
            let high = scale_pair(_mm_unpackhi_epi64(v, v), factor, lo, hi);
            _mm_unpacklo_epi64(low, high)
        },
    )
}

// =============================================================================
// f64
// =============================================================================

#[inline(always)]
unsafe fn undenormalize(v: __m128d, bias: __m128d) -> __m128d {
    _mm_sub_pd(_mm_add_pd(v, bias), bias)
}

fn scale_f64(buf: &mut [f64], gain: f64) -> Outcome {
    let (factor, bias) = unsafe { (_mm_set1_pd(gain), _mm_set1_pd(ANTI_DENORMAL_F64)) };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <f64 as Element>::scale(x, gain),
        |v: __m128d| unsafe { undenormalize(_mm_mul_pd(v, factor), bias) },
    )
}

fn add_f64(a: &[f64], b: &[f64], dst: &mut [f64]) -> Outcome {
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Keep,
        <f64 as Element>::add,
        |x: __m128d, y| unsafe { _mm_add_pd(x, y) },
    )
}

fn sub_f64(a: &[f64], b: &[f64], dst: &mut [f64]) -> Outcome {
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Keep,
        <f64 as Element>::sub,
        |x: __m128d, y| unsafe { _mm_sub_pd(x, y) },
    )
}

fn mul_f64(a: &[f64], b: &[f64], dst: &mut [f64]) -> Outcome {
    let bias = unsafe { _mm_set1_pd(ANTI_DENORMAL_F64) };
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Flush,
        <f64 as Element>::mul,
        |x: __m128d, y| unsafe { undenormalize(_mm_mul_pd(x, y), bias) },
    )
}

fn div_f64(a: &[f64], b: &[f64], dst: &mut [f64]) -> Outcome {
    let bias = unsafe { _mm_set1_pd(ANTI_DENORMAL_F64) };
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Flush,
        <f64 as Element>::div,
        |x: __m128d, y| unsafe { undenormalize(_mm_div_pd(x, y), bias) },
    )
}
