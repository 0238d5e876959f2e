//! Capability-tiered buffer arithmetic.
//!
//! # Module Structure
//!
//! - `kernels`: kernel tables, the tier registry and fallback links
//! - `scalar`: reference engine (FPU tier, end of every chain)
//! - `unroll`: head / body / tail drivers and the typed vector views
//! - `denormal`: scoped flush-to-zero guard
//! - `x86_mmx`, `x86_sse`, `x86_sse2`, `x86_sse3`, `x86_sse41`, `x86_avx`,
//!   `x86_avx2`: x86_64 tiers
//! - `neon`: aarch64 tier
//! - `dispatch`: the public [`Engine`]
//!
//! # Unsafe Invariants Reference
//!
//! Vector kernels rely on three invariants:
//! 1. A tier's table is only reachable through an [`Engine`] whose fallback
//!    chain was filtered against the detected feature mask, so
//!    `#[target_feature]` bodies never run on a CPU lacking the feature.
//! 2. Operand slices all have the destination's length (enforced by the
//!    dispatcher) and share its misalignment (checked by each driver before
//!    any write).
//! 3. The aligned body is reinterpreted as registers only through
//!    `unroll::vectors` / `unroll::vectors_mut`.

/// Wraps `#[target_feature]` bodies into safe kernel entry points.
///
/// Each `fn name(args) { body }` becomes a safe `fn name(args) -> Outcome`
/// calling an inner `unsafe fn` compiled with `$feature` enabled.
#[cfg(target_arch = "x86_64")]
macro_rules! target_kernels {
    ($feature:literal; $(
        fn $name:ident $(<$g:ident>)? ($($arg:ident: $ty:ty),* $(,)?) $body:block
    )*) => {$(
        fn $name $(<$g: $crate::element::Element>)? ($($arg: $ty),*) -> $crate::simd::kernels::Outcome {
            #[target_feature(enable = $feature)]
            unsafe fn kernel $(<$g: $crate::element::Element>)? ($($arg: $ty),*) -> $crate::simd::kernels::Outcome $body

            // SAFETY: this table is only reachable from an engine whose chain
            // was filtered by the detected feature mask (invariant 1).
            unsafe { kernel $(::<$g>)? ($($arg),*) }
        }
    )*};
}

mod denormal;
mod dispatch;
pub(crate) mod kernels;
mod scalar;
mod unroll;

#[cfg(target_arch = "x86_64")]
mod x86_avx;
#[cfg(target_arch = "x86_64")]
mod x86_avx2;
#[cfg(target_arch = "x86_64")]
mod x86_mmx;
#[cfg(target_arch = "x86_64")]
mod x86_sse;
#[cfg(target_arch = "x86_64")]
mod x86_sse2;
#[cfg(target_arch = "x86_64")]
mod x86_sse3;
#[cfg(target_arch = "x86_64")]
mod x86_sse41;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use denormal::DenormalGuard;
pub use dispatch::Engine;
pub(crate) use kernels::KernelSelect;

#[cfg(test)]
mod scalar_tests;
#[cfg(test)]
mod unroll_tests;
