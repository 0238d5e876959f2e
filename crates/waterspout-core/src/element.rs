//! Element types the buffer operations accept, with their per-element
//! semantics.
//!
//! Every engine produces results identical to these functions: the scalar
//! engine calls them directly and the vector tiers call them for the
//! unaligned head and tail of each buffer.
//!
//! # Semantics
//!
//! - Integer `add`/`sub`/`mul` wrap on overflow.
//! - Integer `div` truncates toward zero; division by zero yields 0 and
//!   `MIN / -1` wraps to `MIN`.
//! - Integer `scale` multiplies in `f64`, rounds half to even, then saturates
//!   to the type's range. A NaN product saturates to `MIN`, matching the
//!   hardware's integer-indefinite conversion.
//! - Float operations are IEEE 754. `mul`, `div` and `scale` results pass
//!   through [`undenormalize_f32`] / [`undenormalize_f64`], so subnormal
//!   results become exactly zero.
//! - `scale` on `f32` rounds the gain to `f32` once; every other type applies
//!   the `f64` gain as is.

// SAFETY: Numeric casts in this file are the documented conversion semantics:
// - Integer <-> f64 conversions implement `scale` and saturate by definition
// - Bit reinterpretations (`as u8`, `as u16`...) feed `splat_bits` only
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::fmt::Debug;

use crate::simd::KernelSelect;

/// Bias added then subtracted to flush `f32` subnormals to zero.
pub const ANTI_DENORMAL_F32: f32 = 1e-25;

/// Bias added then subtracted to flush `f64` subnormals to zero.
pub const ANTI_DENORMAL_F64: f64 = 1e-30;

/// Flushes a subnormal `f32` to zero; normal magnitudes are kept.
#[inline(always)]
#[must_use]
pub fn undenormalize_f32(value: f32) -> f32 {
    (value + ANTI_DENORMAL_F32) - ANTI_DENORMAL_F32
}

/// Flushes a subnormal `f64` to zero; normal magnitudes are kept.
#[inline(always)]
#[must_use]
pub fn undenormalize_f64(value: f64) -> f64 {
    (value + ANTI_DENORMAL_F64) - ANTI_DENORMAL_F64
}

/// A buffer element: one of the ten supported integer and float types.
///
/// This trait is sealed; it cannot be implemented outside this crate.
pub trait Element:
    Copy + Default + PartialEq + Debug + Send + Sync + 'static + KernelSelect
{
    /// Type name used in diagnostics (`"i32"`, `"f64"`...).
    const NAME: &'static str;
    /// True for `f32` and `f64`.
    const IS_FLOAT: bool;
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// `self + rhs`.
    fn add(self, rhs: Self) -> Self;
    /// `self - rhs`.
    fn sub(self, rhs: Self) -> Self;
    /// `self * rhs`.
    fn mul(self, rhs: Self) -> Self;
    /// `self / rhs`.
    fn div(self, rhs: Self) -> Self;
    /// `self * gain`, converted back to `Self`.
    fn scale(self, gain: f64) -> Self;

    /// The element's bit pattern repeated to fill 64 bits.
    fn splat_bits(self) -> u64;
    /// The element's bit pattern, zero-extended.
    fn bits(self) -> u64;
    /// Conversion from `f64` with `as` semantics: integers saturate and map
    /// NaN to zero, `f32` rounds and overflows to infinity.
    fn from_f64(value: f64) -> Self;
    /// Conversion to `f64`.
    fn to_f64(self) -> f64;
}

// Multipliers spreading one lane across 64 bits.
const REPEAT_8: u64 = 0x0101_0101_0101_0101;
const REPEAT_16: u64 = 0x0001_0001_0001_0001;
const REPEAT_32: u64 = 0x0000_0001_0000_0001;
const REPEAT_64: u64 = 1;

macro_rules! int_element {
    ($($t:ty => $bits:ty, $repeat:expr;)*) => {$(
        impl Element for $t {
            const NAME: &'static str = stringify!($t);
            const IS_FLOAT: bool = false;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    0
                } else {
                    self.wrapping_div(rhs)
                }
            }

            #[inline(always)]
            fn scale(self, gain: f64) -> Self {
                let product = (self as f64 * gain).round_ties_even();
                // `max` first: a NaN product clamps to MIN like cvtpd2dq.
                product.max(<$t>::MIN as f64).min(<$t>::MAX as f64) as $t
            }

            #[inline(always)]
            fn splat_bits(self) -> u64 {
                (self as $bits as u64).wrapping_mul($repeat)
            }

            #[inline(always)]
            fn bits(self) -> u64 {
                self as $bits as u64
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

int_element! {
    i8 => u8, REPEAT_8;
    u8 => u8, REPEAT_8;
    i16 => u16, REPEAT_16;
    u16 => u16, REPEAT_16;
    i32 => u32, REPEAT_32;
    u32 => u32, REPEAT_32;
    i64 => u64, REPEAT_64;
    u64 => u64, REPEAT_64;
}

impl Element for f32 {
    const NAME: &'static str = "f32";
    const IS_FLOAT: bool = true;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        undenormalize_f32(self * rhs)
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        undenormalize_f32(self / rhs)
    }

    #[inline(always)]
    fn scale(self, gain: f64) -> Self {
        undenormalize_f32(self * gain as f32)
    }

    #[inline(always)]
    fn splat_bits(self) -> u64 {
        u64::from(self.to_bits()) * REPEAT_32
    }

    #[inline(always)]
    fn bits(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Element for f64 {
    const NAME: &'static str = "f64";
    const IS_FLOAT: bool = true;
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        undenormalize_f64(self * rhs)
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        undenormalize_f64(self / rhs)
    }

    #[inline(always)]
    fn scale(self, gain: f64) -> Self {
        undenormalize_f64(self * gain)
    }

    #[inline(always)]
    fn splat_bits(self) -> u64 {
        self.to_bits() * REPEAT_64
    }

    #[inline(always)]
    fn bits(self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}
