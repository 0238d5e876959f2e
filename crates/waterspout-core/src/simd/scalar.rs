//! Scalar reference engine.
//!
//! Straight per-element loops over [`Element`] semantics. Used for:
//! - The FPU tier and the end of every fallback chain
//! - Ground truth when comparing vector tiers
//!
//! Results do not depend on buffer alignment.

use super::kernels::Outcome;
use crate::element::Element;

pub(crate) fn clear<T: Element>(buf: &mut [T]) -> Outcome {
    buf.fill(T::ZERO);
    Outcome::Done
}

pub(crate) fn set<T: Element>(buf: &mut [T], value: T) -> Outcome {
    buf.fill(value);
    Outcome::Done
}

pub(crate) fn scale<T: Element>(buf: &mut [T], gain: f64) -> Outcome {
    for x in buf.iter_mut() {
        *x = T::scale(*x, gain);
    }
    Outcome::Done
}

pub(crate) fn copy<T: Element>(src: &[T], dst: &mut [T]) -> Outcome {
    dst.copy_from_slice(src);
    Outcome::Done
}

#[inline(always)]
fn zip_with<T: Element>(a: &[T], b: &[T], dst: &mut [T], op: impl Fn(T, T) -> T) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = op(x, y);
    }
}

pub(crate) fn add<T: Element>(a: &[T], b: &[T], dst: &mut [T]) -> Outcome {
    zip_with(a, b, dst, T::add);
    Outcome::Done
}

pub(crate) fn sub<T: Element>(a: &[T], b: &[T], dst: &mut [T]) -> Outcome {
    zip_with(a, b, dst, T::sub);
    Outcome::Done
}

pub(crate) fn mul<T: Element>(a: &[T], b: &[T], dst: &mut [T]) -> Outcome {
    zip_with(a, b, dst, T::mul);
    Outcome::Done
}

pub(crate) fn div<T: Element>(a: &[T], b: &[T], dst: &mut [T]) -> Outcome {
    zip_with(a, b, dst, T::div);
    Outcome::Done
}
