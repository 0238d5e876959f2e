//! Tests for `AlignedBuffer`.

use super::aligned_buffer::*;

#[test]
fn test_new_is_zeroed_and_aligned() {
    let buffer = AlignedBuffer::<f32>::new(37);
    assert_eq!(buffer.len(), 37);
    assert_eq!(buffer.alignment(), DEFAULT_ALIGNMENT);
    assert_eq!(buffer.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
    assert!(buffer.iter().all(|&x| x == 0.0));
}

#[test]
fn test_custom_alignment() {
    let buffer = AlignedBuffer::<u8>::with_alignment(10, 64);
    assert_eq!(buffer.alignment(), 64);
    assert_eq!(buffer.as_ptr() as usize % 64, 0);
}

#[test]
fn test_alignment_is_raised_to_element_alignment() {
    let buffer = AlignedBuffer::<u64>::with_alignment(4, 1);
    assert_eq!(buffer.alignment(), std::mem::align_of::<u64>());
}

#[test]
#[should_panic(expected = "power of two")]
fn test_non_power_of_two_alignment_panics() {
    let _ = AlignedBuffer::<u8>::with_alignment(4, 24);
}

#[test]
fn test_empty_buffer() {
    let mut buffer = AlignedBuffer::<i32>::new(0);
    assert!(buffer.is_empty());
    buffer.resize(3);
    assert_eq!(&buffer[..], &[0, 0, 0]);
}

#[test]
fn test_resize_keeps_prefix_and_zero_fills() {
    let mut buffer = AlignedBuffer::from_slice(&[1_i16, 2, 3, 4]);
    buffer.resize(6);
    assert_eq!(&buffer[..], &[1, 2, 3, 4, 0, 0]);
    buffer.resize(2);
    assert_eq!(&buffer[..], &[1, 2]);
    assert_eq!(buffer.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
}

#[test]
fn test_deref_mut_writes_through() {
    let mut buffer = AlignedBuffer::<u32>::new(8);
    buffer[3] = 7;
    buffer.iter_mut().skip(5).for_each(|x| *x = 9);
    assert_eq!(&buffer[..], &[0, 0, 0, 7, 0, 9, 9, 9]);
}

#[test]
fn test_clone_is_deep_and_aligned() {
    let original = AlignedBuffer::from_slice(&[1.5_f64, -2.5]);
    let mut copy = original.clone();
    copy[0] = 0.0;
    assert_eq!(original[0], 1.5);
    assert_eq!(copy.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
}

#[test]
fn test_byte_offset_slices_reach_every_misalignment() {
    let buffer = AlignedBuffer::<u8>::new(64);
    for offset in 0..32 {
        let view = &buffer[offset..];
        assert_eq!(view.as_ptr() as usize % 32, offset);
    }
}

#[test]
fn test_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AlignedBuffer<f32>>();
}
