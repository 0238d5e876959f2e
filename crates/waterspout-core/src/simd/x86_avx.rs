//! AVX tier: 256-bit kernels.
//!
//! - clear / set / copy for every element type (bitwise 256-bit moves)
//! - the full operation set for `f32` and `f64`
//! - `i32` scale, eight lanes per register widened to two `f64` halves
//!
//! Integer arithmetic needs AVX2 and is inherited from the SSE tiers here.

#![allow(unused_unsafe)]
// `splat_bits` is reinterpreted, not converted, into the i64 lane.
// the f64 gain is narrowed for f32 buffers by definition.
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]

use std::arch::x86_64::*;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::{Element, ANTI_DENORMAL_F32, ANTI_DENORMAL_F64};

pub(super) const STRIDE: Stride = Stride::new(32, 32);

const fn moves<T: Element>() -> Kernels<T> {
    Kernels::moves(clear::<T>, set::<T>, copy::<T>)
}

pub(super) const TABLE: KernelTable = KernelTable {
    i8: moves(),
    u8: moves(),
    i16: moves(),
    u16: moves(),
    i32: Kernels {
        scale: Some(scale_i32),
        ..moves()
    },
    u32: moves(),
    i64: moves(),
    u64: moves(),
    f32: Kernels {
        scale: Some(scale_f32),
        add: Some(add_f32),
        sub: Some(sub_f32),
        mul: Some(mul_f32),
        div: Some(div_f32),
        ..moves()
    },
    f64: Kernels {
        scale: Some(scale_f64),
        add: Some(add_f64),
        sub: Some(sub_f64),
        mul: Some(mul_f64),
        div: Some(div_f64),
        ..moves()
    },
};

#[inline]
#[target_feature(enable = "avx")]
unsafe fn undenormalize_ps(v: __m256, bias: __m256) -> __m256 {
    _mm256_sub_ps(_mm256_add_ps(v, bias), bias)
}

#[inline]
#[target_feature(enable = "avx")]
unsafe fn undenormalize_pd(v: __m256d, bias: __m256d) -> __m256d {
    _mm256_sub_pd(_mm256_add_pd(v, bias), bias)
}

/// Four `i32` lanes scaled in `f64`, rounded half to even with an explicit
/// rounding immediate and clamped; see `x86_sse2::scale_pair`.
#[inline]
#[target_feature(enable = "avx")]
unsafe fn scale_quad(v: __m128i, gain: __m256d, lo: __m256d, hi: __m256d) -> __m128i {
    let product = _mm256_mul_pd(_mm256_cvtepi32_pd(v), gain);
    let rounded = _mm256_round_pd::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(product);
    _mm256_cvttpd_epi32(_mm256_min_pd(_mm256_max_pd(rounded, lo), hi))
}

target_kernels! { "avx";
    fn clear<T>(buf: &mut [T]) {
        unroll::fill(STRIDE, buf, T::ZERO, _mm256_setzero_si256())
    }

    fn set<T>(buf: &mut [T], value: T) {
        unroll::fill(STRIDE, buf, value, _mm256_set1_epi64x(value.splat_bits() as i64))
    }

    fn copy<T>(src: &[T], dst: &mut [T]) {
        unroll::copy::<T, __m256i>(STRIDE, src, dst)
    }

    fn scale_i32(buf: &mut [i32], gain: f64) {
        let factor = _mm256_set1_pd(gain);
        let lo = _mm256_set1_pd(f64::from(i32::MIN));
        let hi = _mm256_set1_pd(f64::from(i32::MAX));
        unroll::map(
            STRIDE,
            buf,
            Denormals::Flush,
            |x| <i32 as Element>::scale(x, gain),
            |v: __m256i| unsafe {
                let low = scale_quad(_mm256_castsi256_si128(v), factor, lo, hi);
                let high = scale_quad(_mm256_extractf128_si256::<1>(v), factor, lo, hi);
                _mm256_set_m128i(high, low)
            },
        )
    }

    fn scale_f32(buf: &mut [f32], gain: f64) {
        let factor = _mm256_set1_ps(gain as f32);
        let bias = _mm256_set1_ps(ANTI_DENORMAL_F32);
        unroll::map(
            STRIDE,
            buf,
            Denormals::Flush,
            |x| <f32 as Element>::scale(x, gain),
            |v: __m256| unsafe { undenormalize_ps(_mm256_mul_ps(v, factor), bias) },
        )
    }

    fn add_f32(a: &[f32], b: &[f32], dst: &mut [f32]) {
        unroll::zip(STRIDE, a, b, dst, Denormals::Keep, <f32 as Element>::add, |x: __m256, y| unsafe {
            _mm256_add_ps(x, y)
        })
    }

    fn sub_f32(a: &[f32], b: &[f32], dst: &mut [f32]) {
        unroll::zip(STRIDE, a, b, dst, Denormals::Keep, <f32 as Element>::sub, |x: __m256, y| unsafe {
            _mm256_sub_ps(x, y)
        })
    }

    fn mul_f32(a: &[f32], b: &[f32], dst: &mut [f32]) {
        let bias = _mm256_set1_ps(ANTI_DENORMAL_F32);
        unroll::zip(STRIDE, a, b, dst, Denormals::Flush, <f32 as Element>::mul, |x: __m256, y| unsafe {
            undenormalize_ps(_mm256_mul_ps(x, y), bias)
        })
    }

    fn div_f32(a: &[f32], b: &[f32], dst: &mut [f32]) {
        let bias = _mm256_set1_ps(ANTI_DENORMAL_F32);
        unroll::zip(STRIDE, a, b, dst, Denormals::Flush, <f32 as Element>::div, |x: __m256, y| unsafe {
            undenormalize_ps(_mm256_div_ps(x, y), bias)
        })
    }

    fn scale_f64(buf: &mut [f64], gain: f64) {
        let factor = _mm256_set1_pd(gain);
        let bias = _mm256_set1_pd(ANTI_DENORMAL_F64);
        unroll::map(
            STRIDE,
            buf,
            Denormals::Flush,
            |x| <f64 as Element>::scale(x, gain),
            |v: __m256d| unsafe { undenormalize_pd(_mm256_mul_pd(v, factor), bias) },
        )
    }

    fn add_f64(a: &[f64], b: &[f64], dst: &mut [f64]) {
        unroll::zip(STRIDE, a, b, dst, Denormals::Keep, <f64 as Element>::add, |x: __m256d, y| unsafe {
            _mm256_add_pd(x, y)
        })
    }

    fn sub_f64(a: &[f64], b: &[f64], dst: &mut [f64]) {
        unroll::zip(STRIDE, a, b, dst, Denormals::Keep, <f64 as Element>::sub, |x: __m256d, y| unsafe {
            _mm256_sub_pd(x, y)
        })
    }

    fn mul_f64(a: &[f64], b: &[f64], dst: &mut [f64]) {
        let bias = _mm256_set1_pd(ANTI_DENORMAL_F64);
        unroll::zip(STRIDE, a, b, dst, Denormals::Flush, <f64 as Element>::mul, |x: __m256d, y| unsafe {
            undenormalize_pd(_mm256_mul_pd(x, y), bias)
        })
    }

    fn div_f64(a: &[f64], b: &[f64], dst: &mut [f64]) {
        let bias = _mm256_set1_pd(ANTI_DENORMAL_F64);
        unroll::zip(STRIDE, a, b, dst, Denormals::Flush, <f64 as Element>::div, |x: __m256d, y| unsafe {
            undenormalize_pd(_mm256_div_pd(x, y), bias)
        })
    }
}
