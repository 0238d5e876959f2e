//! Tests for the scalar reference engine.

use super::kernels::Outcome;
use super::scalar;

#[test]
fn test_clear_and_set() {
    let mut buf = vec![3_i8; 5];
    assert_eq!(scalar::clear(&mut buf), Outcome::Done);
    assert_eq!(buf, [0; 5]);
    assert_eq!(scalar::set(&mut buf, -4), Outcome::Done);
    assert_eq!(buf, [-4; 5]);
}

#[test]
fn test_integer_arithmetic_wraps() {
    let a = [u8::MAX, 0, 200];
    let b = [1_u8, 1, 100];
    let mut dst = [0_u8; 3];
    let _ = scalar::add(&a, &b, &mut dst);
    assert_eq!(dst, [0, 1, 44]);
    let _ = scalar::sub(&a, &b, &mut dst);
    assert_eq!(dst, [254, 255, 100]);
    let _ = scalar::mul(&a, &b, &mut dst);
    assert_eq!(dst, [255, 0, 32]);
}

#[test]
fn test_integer_divide_edge_cases() {
    let a = [7_i32, -7, i32::MIN, 5];
    let b = [2_i32, 2, -1, 0];
    let mut dst = [0_i32; 4];
    let _ = scalar::div(&a, &b, &mut dst);
    assert_eq!(dst, [3, -3, i32::MIN, 0]);
}

#[test]
fn test_integer_scale_rounds_half_to_even_and_saturates() {
    let mut buf = [1_i16, 3, 5, -5, 20_000, -20_000];
    let _ = scalar::scale(&mut buf, 0.5);
    assert_eq!(buf, [0, 2, 2, -2, 10_000, -10_000]);

    let mut buf = [20_000_i16, -20_000];
    let _ = scalar::scale(&mut buf, 2.0);
    assert_eq!(buf, [i16::MAX, i16::MIN]);

    let mut buf = [10_u8];
    let _ = scalar::scale(&mut buf, -1.0);
    assert_eq!(buf, [0]);
}

#[test]
fn test_float_divide_follows_ieee() {
    let a = [1.0_f64, -1.0, 0.0, 6.0];
    let b = [0.0_f64, 0.0, 0.0, 3.0];
    let mut dst = [0.0_f64; 4];
    let _ = scalar::div(&a, &b, &mut dst);
    assert_eq!(dst[0], f64::INFINITY);
    assert_eq!(dst[1], f64::NEG_INFINITY);
    assert!(dst[2].is_nan());
    assert_eq!(dst[3], 2.0);
}

#[test]
fn test_float_multiply_flushes_subnormal_results() {
    let a = [f32::MIN_POSITIVE, 3.0];
    let b = [0.25_f32, 0.5];
    let mut dst = [1.0_f32; 2];
    let _ = scalar::mul(&a, &b, &mut dst);
    assert_eq!(dst[0], 0.0);
    assert_eq!(dst[1], 1.5);
}

#[test]
fn test_copy_and_empty_buffers() {
    let src = [1.5_f32, 2.5];
    let mut dst = [0.0_f32; 2];
    let _ = scalar::copy(&src, &mut dst);
    assert_eq!(dst, src);

    let mut empty: [u64; 0] = [];
    assert_eq!(scalar::scale(&mut empty, 2.0), Outcome::Done);
}
