//! ARM NEON tier for aarch64: 128-bit kernels.
//!
//! NEON is part of the aarch64 baseline. The tier covers:
//! - clear / set / copy / add / subtract for every element type
//! - multiply for 8/16/32-bit integers, `f32` and `f64`
//! - divide and scale for `f32` and `f64`
//! - `i32` scale through `f64` lanes
//!
//! 64-bit integer multiply, integer divide and the remaining integer scales
//! have no NEON instruction and fall back to the scalar engine.

#![allow(unused_unsafe)]
// SAFETY: the f64 gain is narrowed for f32 buffers by definition.
#![allow(clippy::cast_possible_truncation)]

use std::arch::aarch64::*;

use super::kernels::{BinaryKernel, KernelTable, Kernels, Outcome};
use super::unroll::{self, Denormals, Stride};
use crate::element::{Element, ANTI_DENORMAL_F32, ANTI_DENORMAL_F64};

pub(super) const STRIDE: Stride = Stride::new(16, 32);

const fn row<T: Element>(add: BinaryKernel<T>, sub: BinaryKernel<T>) -> Kernels<T> {
    Kernels {
        add: Some(add),
        sub: Some(sub),
        ..Kernels::moves(clear::<T>, set::<T>, copy::<T>)
    }
}

pub(super) const TABLE: KernelTable = KernelTable {
    i8: Kernels {
        mul: Some(mul_i8),
        ..row(add_i8, sub_i8)
    },
    u8: Kernels {
        mul: Some(mul_u8),
        ..row(add_u8, sub_u8)
    },
    i16: Kernels {
        mul: Some(mul_i16),
        ..row(add_i16, sub_i16)
    },
    u16: Kernels {
        mul: Some(mul_u16),
        ..row(add_u16, sub_u16)
    },
    i32: Kernels {
        mul: Some(mul_i32),
        scale: Some(scale_i32),
        ..row(add_i32, sub_i32)
    },
    u32: Kernels {
        mul: Some(mul_u32),
        ..row(add_u32, sub_u32)
    },
    i64: row(add_i64, sub_i64),
    u64: row(add_u64, sub_u64),
    f32: Kernels {
        mul: Some(mul_f32),
        div: Some(div_f32),
        scale: Some(scale_f32),
        ..row(add_f32, sub_f32)
    },
    f64: Kernels {
        mul: Some(mul_f64),
        div: Some(div_f64),
        scale: Some(scale_f64),
        ..row(add_f64, sub_f64)
    },
};

// =============================================================================
// Moves
// =============================================================================

fn clear<T: Element>(buf: &mut [T]) -> Outcome {
    // SAFETY: NEON is always available on aarch64.
    unroll::fill(STRIDE, buf, T::ZERO, unsafe { vdupq_n_u64(0) })
}

fn set<T: Element>(buf: &mut [T], value: T) -> Outcome {
    // SAFETY: NEON is always available on aarch64.
    unroll::fill(STRIDE, buf, value, unsafe { vdupq_n_u64(value.splat_bits()) })
}

fn copy<T: Element>(src: &[T], dst: &mut [T]) -> Outcome {
    unroll::copy::<T, uint64x2_t>(STRIDE, src, dst)
}

// =============================================================================
// Lane-wise arithmetic
// =============================================================================

macro_rules! neon_binary {
    ($($name:ident: $t:ty, $v:ty => $op:ident, $intrinsic:ident;)*) => {$(
        fn $name(a: &[$t], b: &[$t], dst: &mut [$t]) -> Outcome {
            unroll::zip(
                STRIDE,
                a,
                b,
                dst,
                Denormals::Keep,
                <$t as Element>::$op,
                // SAFETY: NEON is always available on aarch64.
                |x: $v, y| unsafe { $intrinsic(x, y) },
            )
        }
    )*};
}

neon_binary! {
    add_i8: i8, int8x16_t => add, vaddq_s8;
    add_u8: u8, uint8x16_t => add, vaddq_u8;
    add_i16: i16, int16x8_t => add, vaddq_s16;
    add_u16: u16, uint16x8_t => add, vaddq_u16;
    add_i32: i32, int32x4_t => add, vaddq_s32;
    add_u32: u32, uint32x4_t => add, vaddq_u32;
    add_i64: i64, int64x2_t => add, vaddq_s64;
    add_u64: u64, uint64x2_t => add, vaddq_u64;
    add_f32: f32, float32x4_t => add, vaddq_f32;
    add_f64: f64, float64x2_t => add, vaddq_f64;
    sub_i8: i8, int8x16_t => sub, vsubq_s8;
    sub_u8: u8, uint8x16_t => sub, vsubq_u8;
    sub_i16: i16, int16x8_t => sub, vsubq_s16;
    sub_u16: u16, uint16x8_t => sub, vsubq_u16;
    sub_i32: i32, int32x4_t => sub, vsubq_s32;
    sub_u32: u32, uint32x4_t => sub, vsubq_u32;
    sub_i64: i64, int64x2_t => sub, vsubq_s64;
    sub_u64: u64, uint64x2_t => sub, vsubq_u64;
    sub_f32: f32, float32x4_t => sub, vsubq_f32;
    sub_f64: f64, float64x2_t => sub, vsubq_f64;
    mul_i8: i8, int8x16_t => mul, vmulq_s8;
    mul_u8: u8, uint8x16_t => mul, vmulq_u8;
    mul_i16: i16, int16x8_t => mul, vmulq_s16;
    mul_u16: u16, uint16x8_t => mul, vmulq_u16;
    mul_i32: i32, int32x4_t => mul, vmulq_s32;
    mul_u32: u32, uint32x4_t => mul, vmulq_u32;
}

// =============================================================================
// Float products (undenormalized, flushed)
// =============================================================================

macro_rules! neon_product {
    ($($name:ident: $t:ty, $v:ty => $op:ident, $intrinsic:ident, $add:ident, $sub:ident, $dup:ident, $bias:expr;)*) => {$(
        fn $name(a: &[$t], b: &[$t], dst: &mut [$t]) -> Outcome {
            // SAFETY: NEON is always available on aarch64.
            let bias = unsafe { $dup($bias) };
            unroll::zip(
                STRIDE,
                a,
                b,
                dst,
                Denormals::Flush,
                <$t as Element>::$op,
                |x: $v, y| unsafe { $sub($add($intrinsic(x, y), bias), bias) },
            )
        }
    )*};
}

neon_product! {
    mul_f32: f32, float32x4_t => mul, vmulq_f32, vaddq_f32, vsubq_f32, vdupq_n_f32, ANTI_DENORMAL_F32;
    div_f32: f32, float32x4_t => div, vdivq_f32, vaddq_f32, vsubq_f32, vdupq_n_f32, ANTI_DENORMAL_F32;
    mul_f64: f64, float64x2_t => mul, vmulq_f64, vaddq_f64, vsubq_f64, vdupq_n_f64, ANTI_DENORMAL_F64;
    div_f64: f64, float64x2_t => div, vdivq_f64, vaddq_f64, vsubq_f64, vdupq_n_f64, ANTI_DENORMAL_F64;
}

fn scale_f32(buf: &mut [f32], gain: f64) -> Outcome {
    // SAFETY: NEON is always available on aarch64.
    let (factor, bias) = unsafe { (vdupq_n_f32(gain as f32), vdupq_n_f32(ANTI_DENORMAL_F32)) };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <f32 as Element>::scale(x, gain),
        |v: float32x4_t| unsafe { vsubq_f32(vaddq_f32(vmulq_f32(v, factor), bias), bias) },
    )
}

fn scale_f64(buf: &mut [f64], gain: f64) -> Outcome {
    // SAFETY: NEON is always available on aarch64.
    let (factor, bias) = unsafe { (vdupq_n_f64(gain), vdupq_n_f64(ANTI_DENORMAL_F64)) };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <f64 as Element>::scale(x, gain),
        |v: float64x2_t| unsafe { vsubq_f64(vaddq_f64(vmulq_f64(v, factor), bias), bias) },
    )
}

/// Two `i32` lanes widened to `f64`, scaled, rounded to nearest-even and
/// clamped. `vmaxnm` returns the number for a NaN product, like `f64::max`.
#[inline(always)]
unsafe fn scale_pair(v: int64x2_t, gain: float64x2_t, lo: float64x2_t, hi: float64x2_t) -> int32x2_t {
    let product = vrndnq_f64(vmulq_f64(vcvtq_f64_s64(v), gain));
    vmovn_s64(vcvtq_s64_f64(vminnmq_f64(vmaxnmq_f64(product, lo), hi)))
}

fn scale_i32(buf: &mut [i32], gain: f64) -> Outcome {
    // SAFETY: NEON is always available on aarch64.
    let (factor, lo, hi) = unsafe {
        (
            vdupq_n_f64(gain),
            vdupq_n_f64(f64::from(i32::MIN)),
            vdupq_n_f64(f64::from(i32::MAX)),
        )
    };
    unroll::map(
        STRIDE,
        buf,
        Denormals::Flush,
        |x| <i32 as Element>::scale(x, gain),
        |v: int32x4_t| unsafe {
            let low = scale_pair(vmovl_s32(vget_low_s32(v)), factor, lo, hi);
            let high = scale_pair(vmovl_high_s32(v), factor, lo, hi);
            vcombine_s32(low, high)
        },
    )
}
