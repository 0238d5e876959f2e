//! The dispatcher: selects one tier at construction and forwards every
//! buffer operation along that tier's fallback chain.

use std::fmt;

use super::kernels::{self, KernelTable, Outcome, TierEngine};
use super::scalar;
use crate::config::DispatchConfig;
use crate::cpu::{self, CpuInfo, FeatureMask};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::tier::{Tier, TierSelector};

/// Handle to the selected tier.
///
/// Stateless after construction: clone it freely and share it across
/// threads. Each operation takes its element count from the destination;
/// sources must be at least as long (they are debug-asserted to be exactly
/// as long).
///
/// # Example
///
/// ```
/// use waterspout_core::{Engine, TierSelector};
///
/// let engine = Engine::new(TierSelector::Auto, true)?;
/// let a = vec![1.0_f32; 8192];
/// let b = vec![1.0_f32; 8192];
/// let mut dst = vec![0.0_f32; 8192];
/// engine.add(&a, &b, &mut dst);
/// assert!(dst.iter().all(|&x| x == 2.0));
/// # Ok::<(), waterspout_core::Error>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    tier: Tier,
    chain: Vec<&'static TierEngine>,
}

impl Engine {
    /// Builds a dispatcher for `requested` against the process-wide CPU report.
    ///
    /// # Errors
    ///
    /// [`Error::TierUnavailable`] when `requested` forces a tier this binary
    /// was built without and `allow_fallback` is false.
    pub fn new(requested: TierSelector, allow_fallback: bool) -> Result<Self> {
        Self::with_cpu(cpu::init(), requested, allow_fallback)
    }

    /// Builds a dispatcher against a CPU report the caller initialised and
    /// passes in explicitly.
    ///
    /// `cpu.features` goes through [`Engine::with_features`], so an edited
    /// report can hide features but never claim ones the host lacks.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`].
    pub fn with_cpu(cpu: &CpuInfo, requested: TierSelector, allow_fallback: bool) -> Result<Self> {
        Self::with_features(cpu.features, requested, allow_fallback)
    }

    /// Best tier the host supports. Never fails.
    #[must_use]
    pub fn auto() -> Self {
        Self::select(cpu::init().features, TierSelector::Auto)
    }

    /// Builds a dispatcher from the `[dispatch]` configuration section.
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        Self::new(config.tier, config.allow_fallback)
    }

    /// Like [`Engine::new`], but only considers features in `mask`.
    ///
    /// The mask is intersected with what the CPU actually reports, so it can
    /// hide features (to emulate an older processor) but never add them.
    pub fn with_features(
        mask: FeatureMask,
        requested: TierSelector,
        allow_fallback: bool,
    ) -> Result<Self> {
        if let TierSelector::Force(tier) = requested {
            if !allow_fallback && !tier.is_compiled() {
                return Err(Error::TierUnavailable { tier });
            }
        }

        let features = cpu::init().features.intersection(mask);
        let engine = Self::select(features, requested);

        if let Some(forced) = requested.forced() {
            if engine.tier != forced {
                tracing::warn!(
                    requested = %forced,
                    selected = %engine.tier,
                    "Forced tier not supported by this CPU, falling back"
                );
            }
        }
        Ok(engine)
    }

    /// Walks tiers from most to least capable and resolves the chain of the
    /// first one that is compiled, present and permitted.
    fn select(features: FeatureMask, requested: TierSelector) -> Self {
        let usable =
            |tier: Tier| tier == Tier::Fpu || features.contains(tier.required_feature());

        let selected = Tier::BY_CAPABILITY
            .into_iter()
            .filter(|&tier| requested.permits(tier) && usable(tier))
            .find_map(kernels::lookup)
            .or_else(|| kernels::lookup(Tier::Fpu));

        let mut chain = Vec::new();
        let mut next = selected;
        while let Some(engine) = next {
            if usable(engine.tier) {
                chain.push(engine);
            }
            next = engine.fallback.and_then(kernels::lookup);
        }

        let tier = chain.first().map_or(Tier::Fpu, |engine| engine.tier);
        tracing::debug!(
            requested = %requested,
            selected = %tier,
            chain = ?chain.iter().map(|e| e.tier.name()).collect::<Vec<_>>(),
            "Dispatch engine selected"
        );
        Self { tier, chain }
    }

    /// Tiers compiled into this binary that the host can run, most capable
    /// first.
    #[must_use]
    pub fn available() -> Vec<Tier> {
        let features = cpu::init().features;
        kernels::registry()
            .iter()
            .map(|engine| engine.tier)
            .filter(|&tier| tier == Tier::Fpu || features.contains(tier.required_feature()))
            .collect()
    }

    /// Diagnostic name of the selected tier (`"AVX"`, `"SSE2"`, `"FPU"`...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.tier.name()
    }

    /// The selected tier.
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Tiers consulted for each call, in order; always ends with FPU.
    pub fn chain(&self) -> impl Iterator<Item = Tier> + '_ {
        self.chain.iter().map(|engine| engine.tier)
    }

    /// Hands the call to the first tier with a kernel that accepts it.
    #[inline]
    fn run<K: Copy>(
        &self,
        slot: impl Fn(&KernelTable) -> Option<K>,
        mut call: impl FnMut(K) -> Outcome,
    ) -> bool {
        self.chain
            .iter()
            .filter_map(|engine| slot(engine.table))
            .any(|kernel| call(kernel) == Outcome::Done)
    }

    // =========================================================================
    // Buffer operations
    // =========================================================================

    /// Sets every element to zero.
    pub fn clear<T: Element>(&self, buf: &mut [T]) {
        if !self.run(|t| T::kernels(t).clear, |k| k(&mut *buf)) {
            let _ = scalar::clear(buf);
        }
    }

    /// Sets every element to `value`.
    pub fn set<T: Element>(&self, buf: &mut [T], value: T) {
        if !self.run(|t| T::kernels(t).set, |k| k(&mut *buf, value)) {
            let _ = scalar::set(buf, value);
        }
    }

    /// Multiplies every element by a single-precision `gain`.
    pub fn scale<T: Element>(&self, buf: &mut [T], gain: f32) {
        self.scale_f64(buf, f64::from(gain));
    }

    /// Multiplies every element by a double-precision `gain`.
    ///
    /// `f32` buffers round the gain to `f32` first; all other types apply
    /// it in double precision.
    pub fn scale_f64<T: Element>(&self, buf: &mut [T], gain: f64) {
        if !self.run(|t| T::kernels(t).scale, |k| k(&mut *buf, gain)) {
            let _ = scalar::scale(buf, gain);
        }
    }

    /// Copies `src` into `dst`.
    pub fn copy<T: Element>(&self, src: &[T], dst: &mut [T]) {
        debug_assert_eq!(src.len(), dst.len(), "copy: source and destination lengths differ");
        let src = &src[..dst.len()];
        if !self.run(|t| T::kernels(t).copy, |k| k(src, &mut *dst)) {
            let _ = scalar::copy(src, dst);
        }
    }

    /// `dst[i] = a[i] + b[i]`.
    pub fn add<T: Element>(&self, a: &[T], b: &[T], dst: &mut [T]) {
        let (a, b) = operands(a, b, dst.len());
        if !self.run(|t| T::kernels(t).add, |k| k(a, b, &mut *dst)) {
            let _ = scalar::add(a, b, dst);
        }
    }

    /// `dst[i] = a[i] - b[i]`.
    pub fn subtract<T: Element>(&self, a: &[T], b: &[T], dst: &mut [T]) {
        let (a, b) = operands(a, b, dst.len());
        if !self.run(|t| T::kernels(t).sub, |k| k(a, b, &mut *dst)) {
            let _ = scalar::sub(a, b, dst);
        }
    }

    /// `dst[i] = a[i] * b[i]`.
    pub fn multiply<T: Element>(&self, a: &[T], b: &[T], dst: &mut [T]) {
        let (a, b) = operands(a, b, dst.len());
        if !self.run(|t| T::kernels(t).mul, |k| k(a, b, &mut *dst)) {
            let _ = scalar::mul(a, b, dst);
        }
    }

    /// `dst[i] = a[i] / b[i]`.
    pub fn divide<T: Element>(&self, a: &[T], b: &[T], dst: &mut [T]) {
        let (a, b) = operands(a, b, dst.len());
        if !self.run(|t| T::kernels(t).div, |k| k(a, b, &mut *dst)) {
            let _ = scalar::div(a, b, dst);
        }
    }
}

/// Trims both sources to the destination length.
#[inline]
fn operands<'a, T>(a: &'a [T], b: &'a [T], len: usize) -> (&'a [T], &'a [T]) {
    debug_assert_eq!(a.len(), len, "first source and destination lengths differ");
    debug_assert_eq!(b.len(), len, "second source and destination lengths differ");
    (&a[..len], &b[..len])
}

impl Default for Engine {
    fn default() -> Self {
        Self::auto()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("tier", &self.tier)
            .field("chain", &self.chain().collect::<Vec<_>>())
            .finish()
    }
}
