//! SSE tier: 128-bit single-precision kernels.
//!
//! SSE is part of the x86_64 baseline, so no `#[target_feature]` is needed.
//! Only `f32` is specialized; every other type falls through to MMX/FPU.

#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use super::kernels::{KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::{Element, ANTI_DENORMAL_F32};

/// 4 floats per register; below 32 elements the setup does not pay off.
pub(super) const STRIDE: Stride = Stride::new(16, 32);

pub(super) const TABLE: KernelTable = KernelTable {
    f32: Kernels {
        clear: Some(clear_f32),
        set: Some(set_f32),
        scale: Some(scale_f32),
        copy: Some(copy_f32),
        add: Some(add_f32),
        sub: Some(sub_f32),
        mul: Some(mul_f32),
        div: Some(div_f32),
    },
    ..KernelTable::NONE
};

#[inline(always)]
unsafe fn undenormalize(v: __m128, bias: __m128) -> __m128 {
    _mm_sub_ps(_mm_add_ps(v, bias), bias)
}

fn clear_f32(buf: &mut [f32]) -> Outcome {
    unroll::fill(STRIDE, buf, 0.0, unsafe { _mm_setzero_ps() })
}

fn set_f32(buf: &mut [f32], value: f32) -> Outcome {
    unroll::fill(STRIDE, buf, value, unsafe { _mm_set1_ps(value) })
}

fn copy_f32(src: &[f32], dst: &mut [f32]) -> Outcome {
    unroll::copy::<f32, __m128>(STRIDE, src, dst)
}

#[allow(clippy::cast_possible_truncation)] // f32 buffers take the gain at f32 precision
fn scale_f32(buf: &mut [f32], gain: f64) -> Outcome {
    let (factor, bias) = unsafe { (_mm_set1_ps(gain as f32), _mm_set1_ps(ANTI_DENORMAL_F32)) };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <f32 as Element>::scale(x, gain),
        |v: __m128| unsafe { undenormalize(_mm_mul_ps(v, factor), bias) },
    )
}

fn add_f32(a: &[f32], b: &[f32], dst: &mut [f32]) -> Outcome {
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Keep,
        <f32 as Element>::add,
        |x: __m128, y| unsafe { _mm_add_ps(x, y) },
    )
}

fn sub_f32(a: &[f32], b: &[f32], dst: &mut [f32]) -> Outcome {
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Keep,
        <f32 as Element>::sub,
        |x: __m128, y| unsafe { _mm_sub_ps(x, y) },
    )
}

fn mul_f32(a: &[f32], b: &[f32], dst: &mut [f32]) -> Outcome {
    let bias = unsafe { _mm_set1_ps(ANTI_DENORMAL_F32) };
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Flush,
        <f32 as Element>::mul,
        |x: __m128, y| unsafe { undenormalize(_mm_mul_ps(x, y), bias) },
    )
}

fn div_f32(a: &[f32], b: &[f32], dst: &mut [f32]) -> Outcome {
    let bias = unsafe { _mm_set1_ps(ANTI_DENORMAL_F32) };
    unroll::zip(
        STRIDE,
        a,
        b,
        dst,
        Denormals::Flush,
        <f32 as Element>::div,
        |x: __m128, y| unsafe { undenormalize(_mm_div_ps(x, y), bias) },
    )
}
