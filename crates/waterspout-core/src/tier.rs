//! Instruction-set tiers and the caller-facing tier selector.
//!
//! Tiers are ordered by [`Tier::BY_CAPABILITY`], the walk the dispatcher
//! performs when choosing an engine. A [`TierSelector::Force`] caps that walk:
//! nothing listed before the forced tier may be selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cpu::FeatureMask;
use crate::error::Error;

/// One instruction-set generation with its own kernel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Scalar reference engine, always available.
    Fpu,
    /// 64-bit packed integers.
    Mmx,
    /// 128-bit single-precision floats.
    Sse,
    /// 128-bit integers and double-precision floats.
    Sse2,
    /// SSE3 extensions.
    Sse3,
    /// Supplemental SSE3 extensions.
    Ssse3,
    /// SSE4.1 extensions.
    Sse41,
    /// SSE4.2 extensions.
    Sse42,
    /// 256-bit floats.
    Avx,
    /// 256-bit integers.
    Avx2,
    /// ARM advanced SIMD (128-bit).
    Neon,
}

impl Tier {
    /// Every tier from most to least capable.
    pub const BY_CAPABILITY: [Tier; 11] = [
        Tier::Avx2,
        Tier::Avx,
        Tier::Sse42,
        Tier::Sse41,
        Tier::Ssse3,
        Tier::Sse3,
        Tier::Sse2,
        Tier::Neon,
        Tier::Sse,
        Tier::Mmx,
        Tier::Fpu,
    ];

    /// Diagnostic name, e.g. `"SSE2"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Fpu => "FPU",
            Tier::Mmx => "MMX",
            Tier::Sse => "SSE",
            Tier::Sse2 => "SSE2",
            Tier::Sse3 => "SSE3",
            Tier::Ssse3 => "SSSE3",
            Tier::Sse41 => "SSE41",
            Tier::Sse42 => "SSE42",
            Tier::Avx => "AVX",
            Tier::Avx2 => "AVX2",
            Tier::Neon => "NEON",
        }
    }

    /// CPU feature that must be present for this tier to run.
    #[must_use]
    pub const fn required_feature(self) -> FeatureMask {
        match self {
            Tier::Fpu => FeatureMask::FPU,
            Tier::Mmx => FeatureMask::MMX,
            Tier::Sse => FeatureMask::SSE,
            Tier::Sse2 => FeatureMask::SSE2,
            Tier::Sse3 => FeatureMask::SSE3,
            Tier::Ssse3 => FeatureMask::SSSE3,
            Tier::Sse41 => FeatureMask::SSE41,
            Tier::Sse42 => FeatureMask::SSE42,
            Tier::Avx => FeatureMask::AVX,
            Tier::Avx2 => FeatureMask::AVX2,
            Tier::Neon => FeatureMask::NEON,
        }
    }

    /// Whether this binary carries kernels for the tier.
    #[must_use]
    pub const fn is_compiled(self) -> bool {
        match self {
            Tier::Fpu => true,
            Tier::Neon => cfg!(target_arch = "aarch64"),
            _ => cfg!(target_arch = "x86_64"),
        }
    }

    /// Position in [`Tier::BY_CAPABILITY`]; lower is more capable.
    #[must_use]
    pub fn rank(self) -> usize {
        Self::BY_CAPABILITY
            .iter()
            .position(|&t| t == self)
            .unwrap_or(Self::BY_CAPABILITY.len())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::BY_CAPABILITY
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidTier(wanted.to_string()))
    }
}

/// Caller request: pick the best tier, or cap the choice at a given one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TierSelector {
    /// Use the most capable tier the CPU supports.
    #[default]
    Auto,
    /// Use this tier, or something less capable if it cannot run.
    Force(Tier),
}

impl TierSelector {
    /// Returns true when `candidate` may be selected under this request.
    #[must_use]
    pub fn permits(self, candidate: Tier) -> bool {
        match self {
            TierSelector::Auto => true,
            TierSelector::Force(tier) => candidate == Tier::Fpu || candidate.rank() >= tier.rank(),
        }
    }

    /// The forced tier, if any.
    #[must_use]
    pub const fn forced(self) -> Option<Tier> {
        match self {
            TierSelector::Auto => None,
            TierSelector::Force(tier) => Some(tier),
        }
    }
}

impl From<Tier> for TierSelector {
    fn from(tier: Tier) -> Self {
        TierSelector::Force(tier)
    }
}

impl fmt::Display for TierSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierSelector::Auto => f.write_str("auto"),
            TierSelector::Force(tier) => write!(f, "{tier}"),
        }
    }
}

impl FromStr for TierSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(TierSelector::Auto)
        } else {
            s.parse().map(TierSelector::Force)
        }
    }
}

impl Serialize for TierSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for TierSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
