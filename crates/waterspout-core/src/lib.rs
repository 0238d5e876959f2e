//! # Waterspout Core
//!
//! Runtime CPU-feature dispatch over vectorized buffer arithmetic.
//!
//! An [`Engine`] probes the processor once, picks the most capable
//! instruction-set tier this binary carries kernels for (AVX2 down to a
//! scalar FPU reference), and forwards eight buffer operations to it for
//! ten element types. Every tier produces bit-identical results to the
//! scalar engine, so the choice is invisible except through
//! [`Engine::name`] and speed.
//!
//! ## Operations
//!
//! | Operation  | Result                  |
//! |------------|-------------------------|
//! | `clear`    | `dst[i] = 0`            |
//! | `set`      | `dst[i] = v`            |
//! | `scale`    | `dst[i] = dst[i] * g`   |
//! | `copy`     | `dst[i] = src[i]`       |
//! | `add`      | `dst[i] = a[i] + b[i]`  |
//! | `subtract` | `dst[i] = a[i] - b[i]`  |
//! | `multiply` | `dst[i] = a[i] * b[i]`  |
//! | `divide`   | `dst[i] = a[i] / b[i]`  |
//!
//! Element types: `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`,
//! `f32`, `f64`.
//!
//! ## Quick Start
//!
//! ```rust
//! use waterspout_core::{AlignedBuffer, Engine, Tier, TierSelector};
//!
//! fn main() -> waterspout_core::Result<()> {
//!     let engine = Engine::auto();
//!     println!("running on {}", engine.name());
//!
//!     let mut samples = AlignedBuffer::<i32>::new(8192);
//!     engine.set(&mut samples, 100);
//!     engine.scale(&mut samples, 0.5);
//!     assert!(samples.iter().all(|&x| x == 50));
//!
//!     // Pin the scalar reference engine, e.g. for comparisons.
//!     let reference = Engine::new(TierSelector::Force(Tier::Fpu), false)?;
//!     assert_eq!(reference.name(), "FPU");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::float_cmp,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss
    )
)]

pub mod aligned_buffer;
#[cfg(test)]
mod aligned_buffer_tests;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod cpu;
#[cfg(test)]
mod cpu_tests;
pub mod element;
#[cfg(test)]
mod element_tests;
pub mod error;
pub mod memory;
mod simd;
pub mod tier;

pub use aligned_buffer::AlignedBuffer;
pub use config::{DispatchConfig, LoggingConfig, WaterspoutConfig};
pub use cpu::{CpuInfo, Endianness, FeatureMask};
pub use element::Element;
pub use error::{Error, Result};
pub use simd::{DenormalGuard, Engine};
pub use tier::{Tier, TierSelector};
