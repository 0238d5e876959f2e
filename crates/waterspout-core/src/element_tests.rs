//! Tests for `element` module

#![allow(clippy::float_cmp)]

use super::element::*;

// =============================================================================
// Integer semantics
// =============================================================================

#[test]
fn test_integer_arithmetic_wraps() {
    assert_eq!(Element::add(i8::MAX, 1), i8::MIN);
    assert_eq!(Element::sub(0_u16, 1), u16::MAX);
    assert_eq!(Element::mul(200_u8, 2), 144);
    assert_eq!(Element::mul(i32::MAX, 2), -2);
}

#[test]
fn test_integer_divide_truncates() {
    assert_eq!(Element::div(7_i32, 2), 3);
    assert_eq!(Element::div(-7_i32, 2), -3);
    assert_eq!(Element::div(4_i32, 2), 2);
    assert_eq!(Element::div(u64::MAX, 3), u64::MAX / 3);
}

#[test]
fn test_integer_divide_by_zero_yields_zero() {
    assert_eq!(Element::div(42_i32, 0), 0);
    assert_eq!(Element::div(42_u8, 0), 0);
    assert_eq!(Element::div(i64::MIN, 0), 0);
}

#[test]
fn test_integer_divide_min_by_minus_one_wraps() {
    assert_eq!(Element::div(i32::MIN, -1), i32::MIN);
    assert_eq!(Element::div(i8::MIN, -1), i8::MIN);
}

#[test]
fn test_integer_scale_rounds_half_to_even() {
    assert_eq!(Element::scale(100_i32, 0.5), 50);
    assert_eq!(Element::scale(5_i32, 0.5), 2);
    assert_eq!(Element::scale(7_i32, 0.5), 4);
    assert_eq!(Element::scale(-5_i32, 0.5), -2);
    assert_eq!(Element::scale(3_u8, 0.5), 2);
}

#[test]
fn test_integer_scale_saturates() {
    assert_eq!(Element::scale(100_i8, 2.0), i8::MAX);
    assert_eq!(Element::scale(-100_i8, 2.0), i8::MIN);
    assert_eq!(Element::scale(10_u16, -1.0), 0);
    assert_eq!(Element::scale(i32::MAX, 4.0), i32::MAX);
    assert_eq!(Element::scale(1_u64, f64::INFINITY), u64::MAX);
}

#[test]
fn test_integer_scale_nan_clamps_to_min() {
    assert_eq!(Element::scale(1_i32, f64::NAN), i32::MIN);
    assert_eq!(Element::scale(1_u8, f64::NAN), 0);
}

// =============================================================================
// Float semantics
// =============================================================================

#[test]
fn test_float_arithmetic_is_ieee() {
    assert_eq!(Element::add(1.0_f32, 1.0), 2.0);
    assert_eq!(Element::div(4.0_f64, 2.0), 2.0);
    assert_eq!(Element::div(1.0_f32, 0.0), f32::INFINITY);
    assert!(Element::div(0.0_f64, 0.0).is_nan());
}

#[test]
fn test_float_products_flush_subnormals() {
    let tiny = 1e-20_f32;
    assert_eq!(Element::mul(tiny, tiny), 0.0);
    assert_eq!(Element::scale(f32::MIN_POSITIVE, 0.25), 0.0);
    assert_eq!(Element::div(1e-300_f64, 1e10), 0.0);
    assert_eq!(Element::mul(1e-160_f64, 1e-160), 0.0);
}

#[test]
fn test_undenormalize_keeps_normal_magnitudes() {
    for value in [1.0_f32, -3.5, 1234.5678, 1e-3] {
        assert_eq!(undenormalize_f32(value), value);
    }
    for value in [1.0_f64, -2.25, 9.75e12, 1e-9] {
        assert_eq!(undenormalize_f64(value), value);
    }
}

#[test]
fn test_f32_scale_rounds_double_gain_once() {
    let gain = 0.1_f64;
    assert_eq!(Element::scale(3.0_f32, gain), 3.0_f32 * 0.1_f32);
    assert_eq!(Element::scale(100.0_f32, 0.5), 50.0);
}

// =============================================================================
// Bit helpers
// =============================================================================

#[test]
fn test_splat_bits_repeats_every_lane() {
    assert_eq!(0xAB_u8.splat_bits(), 0xABAB_ABAB_ABAB_ABAB);
    assert_eq!((-1_i16).splat_bits(), u64::MAX);
    assert_eq!(0x1234_5678_u32.splat_bits(), 0x1234_5678_1234_5678);
    assert_eq!(1.0_f32.splat_bits(), 0x3F80_0000_3F80_0000);
    assert_eq!(2.0_f64.splat_bits(), 2.0_f64.to_bits());
    assert_eq!(7_i64.splat_bits(), 7);
}

#[test]
fn test_bits_zero_extends() {
    assert_eq!((-1_i8).bits(), 0xFF);
    assert_eq!((-1_i32).bits(), 0xFFFF_FFFF);
    assert_eq!((-0.0_f32).bits(), 0x8000_0000);
}

#[test]
fn test_identities() {
    assert_eq!(i16::ZERO, 0);
    assert_eq!(u64::ONE, 1);
    assert_eq!(f32::ONE, 1.0);
    assert!(f64::IS_FLOAT);
    assert!(!u8::IS_FLOAT);
    assert_eq!(<i32 as Element>::NAME, "i32");
}
