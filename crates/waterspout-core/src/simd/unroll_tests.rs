//! Tests for the head / body / tail planner and drivers.

use super::kernels::Outcome;
use super::unroll::*;
use crate::AlignedBuffer;

#[test]
fn test_plan_aligned_start() {
    let buf = AlignedBuffer::<f32>::new(64);
    let split = Split::plan(buf.as_ptr(), 19, 16).expect("plan");
    assert_eq!(split, Split { head: 0, body: 16, tail: 3 });
}

#[test]
fn test_plan_misaligned_start() {
    let buf = AlignedBuffer::<f32>::new(64);
    // one f32 past a 16-byte boundary: three elements to reach the next one
    let split = Split::plan(buf[1..].as_ptr(), 20, 16).expect("plan");
    assert_eq!(split, Split { head: 3, body: 16, tail: 1 });
}

#[test]
fn test_plan_head_longer_than_buffer() {
    let buf = AlignedBuffer::<u8>::new(64);
    let split = Split::plan(buf[1..].as_ptr(), 5, 32).expect("plan");
    assert_eq!(split, Split { head: 5, body: 0, tail: 0 });
}

#[test]
fn test_plan_rejects_partial_element_misalignment() {
    let bytes = AlignedBuffer::<u8>::new(64);
    let ptr = bytes[2..].as_ptr().cast::<u32>();
    assert!(Split::plan(ptr, 8, 16).is_none());
}

#[test]
fn test_plan_partitions_every_length() {
    let buf = AlignedBuffer::<u16>::new(128);
    for offset in 0..16 {
        for len in 0..64 {
            let ptr = buf[offset..].as_ptr();
            let split = Split::plan(ptr, len, 32).expect("plan");
            assert_eq!(split.head + split.body + split.tail, len);
            assert_eq!(split.body % 16, 0);
            assert!(split.tail < 16);
            if split.body > 0 {
                // SAFETY: only used for address arithmetic.
                let body = unsafe { ptr.add(split.head) };
                assert_eq!(misalignment(body, 32), 0);
            }
        }
    }
}

#[test]
fn test_fill_declines_short_buffers() {
    let mut buf = AlignedBuffer::<u64>::new(8);
    let stride = Stride::new(16, 32);
    assert_eq!(fill::<u64, [u64; 2]>(stride, &mut buf, 7, [7, 7]), Outcome::Fallback);
    assert!(buf.iter().all(|&x| x == 0));
}

#[test]
fn test_fill_writes_head_body_and_tail() {
    let mut buf = AlignedBuffer::<u32>::new(100);
    let stride = Stride::new(16, 32);
    let view = &mut buf[3..];
    assert_eq!(fill::<u32, [u32; 4]>(stride, view, 9, [9; 4]), Outcome::Done);
    assert!(buf[..3].iter().all(|&x| x == 0));
    assert!(buf[3..].iter().all(|&x| x == 9));
}

#[test]
fn test_zip_declines_mismatched_misalignment() {
    let a = AlignedBuffer::<i32>::new(64);
    let b = AlignedBuffer::<i32>::new(64);
    let mut dst = AlignedBuffer::<i32>::new(64);
    let stride = Stride::new(16, 32);
    let outcome = zip::<i32, [i32; 4]>(
        stride,
        &a[1..41],
        &b[..40],
        &mut dst[..40],
        Denormals::Keep,
        |x, y| x + y + 1,
        |x, y| [x[0] + y[0], x[1] + y[1], x[2] + y[2], x[3] + y[3]],
    );
    assert_eq!(outcome, Outcome::Fallback);
    assert!(dst.iter().all(|&x| x == 0));
}

#[test]
fn test_map_uses_scalar_outside_body() {
    let mut buf = AlignedBuffer::<i32>::new(48);
    let stride = Stride::new(16, 32);
    // scalar adds 1, vector adds 2, so each phase is visible
    let outcome = map::<i32, [i32; 4]>(
        stride,
        &mut buf[1..44],
        Denormals::Keep,
        |x| x + 1,
        |v| v.map(|x| x + 2),
    );
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(buf[0], 0);
    assert!(buf[1..4].iter().all(|&x| x == 1));
    assert!(buf[4..44].iter().all(|&x| x == 2));
    assert!(buf[44..].iter().all(|&x| x == 0));
}

#[test]
fn test_copy_declines_mismatched_misalignment() {
    let src = AlignedBuffer::from_slice(&[5_u8; 80]);
    let mut dst = AlignedBuffer::<u8>::new(80);
    let stride = Stride::new(16, 32);
    assert_eq!(
        copy::<u8, [u8; 16]>(stride, &src[1..65], &mut dst[..64]),
        Outcome::Fallback
    );
    assert_eq!(
        copy::<u8, [u8; 16]>(stride, &src[..64], &mut dst[..64]),
        Outcome::Done
    );
    assert!(dst[..64].iter().all(|&x| x == 5));
}
