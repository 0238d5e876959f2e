//! Capability prober: which instruction-set generations the host supports.
//!
//! [`detect`] is a pure query and may be called any number of times.
//! [`init`] runs it once for the whole process and keeps the report, which is
//! what the dispatcher consults.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

/// Bitmask of detected instruction-set generations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "Vec<&'static str>")]
pub struct FeatureMask(u32);

impl FeatureMask {
    /// Scalar floating-point unit.
    pub const FPU: Self = Self(1 << 0);
    /// 64-bit packed integer extension.
    pub const MMX: Self = Self(1 << 1);
    /// 128-bit single-precision extension.
    pub const SSE: Self = Self(1 << 2);
    /// 128-bit integer and double-precision extension.
    pub const SSE2: Self = Self(1 << 3);
    /// SSE3.
    pub const SSE3: Self = Self(1 << 4);
    /// Supplemental SSE3.
    pub const SSSE3: Self = Self(1 << 5);
    /// SSE4.1.
    pub const SSE41: Self = Self(1 << 6);
    /// SSE4.2.
    pub const SSE42: Self = Self(1 << 7);
    /// AMD SSE4a.
    pub const SSE4A: Self = Self(1 << 8);
    /// 256-bit floating-point extension (with OS register support).
    pub const AVX: Self = Self(1 << 9);
    /// 256-bit integer extension (with OS register support).
    pub const AVX2: Self = Self(1 << 10);
    /// ARM advanced SIMD.
    pub const NEON: Self = Self(1 << 11);

    const NAMED: [(Self, &'static str); 12] = [
        (Self::FPU, "FPU"),
        (Self::MMX, "MMX"),
        (Self::SSE, "SSE"),
        (Self::SSE2, "SSE2"),
        (Self::SSE3, "SSE3"),
        (Self::SSSE3, "SSSE3"),
        (Self::SSE41, "SSE41"),
        (Self::SSE42, "SSE42"),
        (Self::SSE4A, "SSE4A"),
        (Self::AVX, "AVX"),
        (Self::AVX2, "AVX2"),
        (Self::NEON, "NEON"),
    ];

    /// No features at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every known feature.
    #[must_use]
    pub const fn all() -> Self {
        Self((1 << 12) - 1)
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a mask from raw bits, dropping unknown positions.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::all().0)
    }

    /// True when every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Bitwise union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bitwise intersection.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Mask with `other` cleared.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Names of the set features, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Every known feature paired with its presence in `self`.
    pub fn report(self) -> impl Iterator<Item = (&'static str, bool)> {
        Self::NAMED
            .into_iter()
            .map(move |(flag, name)| (name, self.contains(flag)))
    }
}

impl std::ops::BitOr for FeatureMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for FeatureMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl std::ops::BitAnd for FeatureMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl fmt::Debug for FeatureMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl fmt::Display for FeatureMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

impl From<FeatureMask> for Vec<&'static str> {
    fn from(mask: FeatureMask) -> Self {
        mask.names().collect()
    }
}

/// Byte order of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// Byte order this binary was built for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endianness::Little => "little-endian",
            Endianness::Big => "big-endian",
        })
    }
}

/// Process-wide CPU report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuInfo {
    /// Vendor identification string (`"GenuineIntel"`, `"AuthenticAMD"`, ...),
    /// when the platform exposes one.
    pub vendor: Option<String>,
    /// Host byte order.
    pub endianness: Endianness,
    /// Detected instruction-set generations.
    pub features: FeatureMask,
}

impl CpuInfo {
    /// Probes the host.
    #[must_use]
    pub fn probe() -> Self {
        Self {
            vendor: vendor(),
            endianness: Endianness::native(),
            features: detect(),
        }
    }
}

static CPU_INFO: OnceLock<CpuInfo> = OnceLock::new();

/// Probes the CPU once for the whole process and returns the cached report.
///
/// Call this from program start-up before sharing engines across threads.
/// Later calls return the same report without probing again.
pub fn init() -> &'static CpuInfo {
    CPU_INFO.get_or_init(|| {
        let info = CpuInfo::probe();
        tracing::info!(
            vendor = info.vendor.as_deref().unwrap_or("unknown"),
            endianness = %info.endianness,
            features = %info.features,
            "CPU capabilities detected"
        );
        info
    })
}

// =============================================================================
// x86_64: cpuid
// =============================================================================

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::FeatureMask;
    use std::arch::x86_64::{CpuidResult, __cpuid, __cpuid_count, _xgetbv};

    // Leaf 1, EDX.
    const EDX_FPU: u32 = 1 << 0;
    const EDX_MMX: u32 = 1 << 23;
    const EDX_SSE: u32 = 1 << 25;
    const EDX_SSE2: u32 = 1 << 26;

    // Leaf 1, ECX.
    const ECX_SSE3: u32 = 1 << 0;
    const ECX_SSSE3: u32 = 1 << 9;
    const ECX_SSE41: u32 = 1 << 19;
    const ECX_SSE42: u32 = 1 << 20;
    const ECX_OSXSAVE: u32 = 1 << 27;
    const ECX_AVX: u32 = 1 << 28;

    // Leaf 0x8000_0001, ECX.
    const EXT_ECX_SSE4A: u32 = 1 << 6;

    // Leaf 7 sub-leaf 0, EBX.
    const EBX_AVX2: u32 = 1 << 5;

    // XCR0: XMM (bit 1) and YMM (bit 2) state enabled by the OS.
    const XCR0_AVX_MASK: u64 = 0x6;

    #[allow(unused_unsafe)]
    fn cpuid(leaf: u32) -> CpuidResult {
        // SAFETY: cpuid is available on every x86_64 processor.
        unsafe { __cpuid(leaf) }
    }

    #[allow(unused_unsafe)]
    fn cpuid_count(leaf: u32, sub_leaf: u32) -> CpuidResult {
        // SAFETY: cpuid is available on every x86_64 processor.
        unsafe { __cpuid_count(leaf, sub_leaf) }
    }

    pub(super) fn detect() -> FeatureMask {
        let max_leaf = cpuid(0).eax;
        let leaf1 = cpuid(1);
        let (edx, ecx) = (leaf1.edx, leaf1.ecx);

        let mut caps = FeatureMask::empty();
        for (bit, flag) in [
            (EDX_FPU, FeatureMask::FPU),
            (EDX_MMX, FeatureMask::MMX),
            (EDX_SSE, FeatureMask::SSE),
            (EDX_SSE2, FeatureMask::SSE2),
        ] {
            if edx & bit != 0 {
                caps |= flag;
            }
        }
        for (bit, flag) in [
            (ECX_SSE3, FeatureMask::SSE3),
            (ECX_SSSE3, FeatureMask::SSSE3),
            (ECX_SSE41, FeatureMask::SSE41),
            (ECX_SSE42, FeatureMask::SSE42),
        ] {
            if ecx & bit != 0 {
                caps |= flag;
            }
        }

        if cpuid(0x8000_0000).eax >= 0x8000_0001 && cpuid(0x8000_0001).ecx & EXT_ECX_SSE4A != 0 {
            caps |= FeatureMask::SSE4A;
        }

        // The 256-bit register file is only usable when the OS saves it.
        let os_avx = ecx & ECX_OSXSAVE != 0 && {
            // SAFETY: OSXSAVE is set, so XGETBV is enabled and XCR0 is readable.
            let xcr0 = unsafe { _xgetbv(0) };
            xcr0 & XCR0_AVX_MASK == XCR0_AVX_MASK
        };
        if os_avx {
            if ecx & ECX_AVX != 0 {
                caps |= FeatureMask::AVX;
            }
            if max_leaf >= 7 && cpuid_count(7, 0).ebx & EBX_AVX2 != 0 {
                caps |= FeatureMask::AVX2;
            }
        }

        caps
    }

    pub(super) fn vendor() -> Option<String> {
        let leaf0 = cpuid(0);
        let mut raw = [0_u8; 12];
        raw[0..4].copy_from_slice(&leaf0.ebx.to_le_bytes());
        raw[4..8].copy_from_slice(&leaf0.edx.to_le_bytes());
        raw[8..12].copy_from_slice(&leaf0.ecx.to_le_bytes());
        let name = String::from_utf8_lossy(&raw).trim_matches('\0').trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// Returns the instruction-set generations supported by the host.
///
/// Never fails: anything the probe cannot confirm is reported absent.
/// The scalar FPU bit is always set, since the scalar engine runs anywhere.
#[must_use]
pub fn detect() -> FeatureMask {
    #[cfg(target_arch = "x86_64")]
    {
        x86::detect() | FeatureMask::FPU
    }

    #[cfg(target_arch = "aarch64")]
    {
        let mut caps = FeatureMask::FPU;
        if std::arch::is_aarch64_feature_detected!("neon") {
            caps |= FeatureMask::NEON;
        }
        caps
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        FeatureMask::FPU
    }
}

fn vendor() -> Option<String> {
    #[cfg(target_arch = "x86_64")]
    {
        x86::vendor()
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        None
    }
}
