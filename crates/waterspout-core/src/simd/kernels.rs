//! Kernel tables: the strategy objects each tier registers.
//!
//! A tier is a [`TierEngine`]: its identity, the tier it falls back to, and a
//! [`KernelTable`] of optional kernels per element type. Empty slots mean
//! "not specialized here"; the dispatcher moves down the chain.

use super::scalar;
use crate::element::Element;
use crate::tier::Tier;

/// Result of a kernel call.
///
/// `Fallback` is decided before anything is written, so the caller can hand
/// the untouched buffers to the next tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The destination holds the result.
    Done,
    /// This kernel declined (too short, incompatible alignment).
    Fallback,
}

pub type ClearKernel<T> = fn(&mut [T]) -> Outcome;
pub type SetKernel<T> = fn(&mut [T], T) -> Outcome;
pub type ScaleKernel<T> = fn(&mut [T], f64) -> Outcome;
pub type CopyKernel<T> = fn(&[T], &mut [T]) -> Outcome;
pub type BinaryKernel<T> = fn(&[T], &[T], &mut [T]) -> Outcome;

/// The eight operations for one element type.
pub struct Kernels<T: 'static> {
    pub clear: Option<ClearKernel<T>>,
    pub set: Option<SetKernel<T>>,
    pub scale: Option<ScaleKernel<T>>,
    pub copy: Option<CopyKernel<T>>,
    pub add: Option<BinaryKernel<T>>,
    pub sub: Option<BinaryKernel<T>>,
    pub mul: Option<BinaryKernel<T>>,
    pub div: Option<BinaryKernel<T>>,
}

impl<T: 'static> Kernels<T> {
    /// No specialized kernels.
    pub const NONE: Self = Self {
        clear: None,
        set: None,
        scale: None,
        copy: None,
        add: None,
        sub: None,
        mul: None,
        div: None,
    };

    /// Only the type-agnostic moves: clear, set and copy.
    pub(crate) const fn moves(
        clear: ClearKernel<T>,
        set: SetKernel<T>,
        copy: CopyKernel<T>,
    ) -> Self {
        Self {
            clear: Some(clear),
            set: Some(set),
            copy: Some(copy),
            ..Self::NONE
        }
    }
}

impl<T: Element> Kernels<T> {
    /// Every slot filled with the scalar reference body.
    pub const SCALAR: Self = Self {
        clear: Some(scalar::clear::<T>),
        set: Some(scalar::set::<T>),
        scale: Some(scalar::scale::<T>),
        copy: Some(scalar::copy::<T>),
        add: Some(scalar::add::<T>),
        sub: Some(scalar::sub::<T>),
        mul: Some(scalar::mul::<T>),
        div: Some(scalar::div::<T>),
    };
}

/// One [`Kernels`] per element type.
pub struct KernelTable {
    pub i8: Kernels<i8>,
    pub u8: Kernels<u8>,
    pub i16: Kernels<i16>,
    pub u16: Kernels<u16>,
    pub i32: Kernels<i32>,
    pub u32: Kernels<u32>,
    pub i64: Kernels<i64>,
    pub u64: Kernels<u64>,
    pub f32: Kernels<f32>,
    pub f64: Kernels<f64>,
}

impl KernelTable {
    /// A tier that specializes nothing and inherits everything.
    pub const NONE: Self = Self {
        i8: Kernels::NONE,
        u8: Kernels::NONE,
        i16: Kernels::NONE,
        u16: Kernels::NONE,
        i32: Kernels::NONE,
        u32: Kernels::NONE,
        i64: Kernels::NONE,
        u64: Kernels::NONE,
        f32: Kernels::NONE,
        f64: Kernels::NONE,
    };

    /// The scalar reference engine.
    pub const SCALAR: Self = Self {
        i8: Kernels::SCALAR,
        u8: Kernels::SCALAR,
        i16: Kernels::SCALAR,
        u16: Kernels::SCALAR,
        i32: Kernels::SCALAR,
        u32: Kernels::SCALAR,
        i64: Kernels::SCALAR,
        u64: Kernels::SCALAR,
        f32: Kernels::SCALAR,
        f64: Kernels::SCALAR,
    };
}

/// Picks the per-type slot row out of a [`KernelTable`].
///
/// Implemented for exactly the [`Element`] types; not nameable outside the
/// crate, which seals `Element`.
pub trait KernelSelect: Sized + 'static {
    /// The row of `table` for `Self`.
    fn kernels(table: &KernelTable) -> &Kernels<Self>;
}

macro_rules! kernel_select {
    ($($t:ident),*) => {$(
        impl KernelSelect for $t {
            #[inline(always)]
            fn kernels(table: &KernelTable) -> &Kernels<Self> {
                &table.$t
            }
        }
    )*};
}

kernel_select!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// A registered tier: what it is, what it falls back to, what it runs.
pub struct TierEngine {
    pub tier: Tier,
    pub fallback: Option<Tier>,
    pub table: &'static KernelTable,
}

const FPU: TierEngine = TierEngine {
    tier: Tier::Fpu,
    fallback: None,
    table: &KernelTable::SCALAR,
};

#[cfg(target_arch = "x86_64")]
static REGISTRY: [TierEngine; 10] = [
    TierEngine {
        tier: Tier::Avx2,
        fallback: Some(Tier::Avx),
        table: &super::x86_avx2::TABLE,
    },
    TierEngine {
        tier: Tier::Avx,
        fallback: Some(Tier::Sse42),
        table: &super::x86_avx::TABLE,
    },
    TierEngine {
        tier: Tier::Sse42,
        fallback: Some(Tier::Sse41),
        table: &super::x86_sse41::SSE42_TABLE,
    },
    TierEngine {
        tier: Tier::Sse41,
        fallback: Some(Tier::Ssse3),
        table: &super::x86_sse41::TABLE,
    },
    TierEngine {
        tier: Tier::Ssse3,
        fallback: Some(Tier::Sse3),
        table: &super::x86_sse3::SSSE3_TABLE,
    },
    TierEngine {
        tier: Tier::Sse3,
        fallback: Some(Tier::Sse2),
        table: &super::x86_sse3::TABLE,
    },
    TierEngine {
        tier: Tier::Sse2,
        fallback: Some(Tier::Sse),
        table: &super::x86_sse2::TABLE,
    },
    TierEngine {
        tier: Tier::Sse,
        fallback: Some(Tier::Mmx),
        table: &super::x86_sse::TABLE,
    },
    TierEngine {
        tier: Tier::Mmx,
        fallback: Some(Tier::Fpu),
        table: &super::x86_mmx::TABLE,
    },
    FPU,
];

#[cfg(target_arch = "aarch64")]
static REGISTRY: [TierEngine; 2] = [
    TierEngine {
        tier: Tier::Neon,
        fallback: Some(Tier::Fpu),
        table: &super::neon::TABLE,
    },
    FPU,
];

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
static REGISTRY: [TierEngine; 1] = [FPU];

/// Every tier compiled into this binary.
pub fn registry() -> &'static [TierEngine] {
    &REGISTRY
}

/// The registered engine for `tier`, if it is compiled in.
pub fn lookup(tier: Tier) -> Option<&'static TierEngine> {
    REGISTRY.iter().find(|engine| engine.tier == tier)
}
