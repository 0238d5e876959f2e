//! Tests for `cpu` module

use super::cpu::*;

#[test]
fn test_detect_always_reports_fpu() {
    assert!(detect().contains(FeatureMask::FPU));
}

#[test]
fn test_detect_is_stable() {
    assert_eq!(detect(), detect());
}

#[test]
fn test_init_returns_same_report() {
    let first = init();
    let second = init();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.features, detect());
}

#[cfg(target_arch = "x86_64")]
#[test]
fn test_detect_matches_std_feature_detection() {
    let caps = detect();
    // x86_64 guarantees SSE and SSE2.
    assert!(caps.contains(FeatureMask::SSE | FeatureMask::SSE2));
    assert_eq!(
        caps.contains(FeatureMask::SSE41),
        is_x86_feature_detected!("sse4.1")
    );
    assert_eq!(caps.contains(FeatureMask::AVX), is_x86_feature_detected!("avx"));
    assert_eq!(caps.contains(FeatureMask::AVX2), is_x86_feature_detected!("avx2"));
    assert!(!caps.contains(FeatureMask::NEON));
}

#[cfg(target_arch = "x86_64")]
#[test]
fn test_vendor_is_reported_on_x86() {
    let vendor = CpuInfo::probe().vendor.expect("cpuid leaf 0 has a vendor string");
    assert_eq!(vendor.len(), 12, "vendor strings are 12 bytes: {vendor:?}");
}

#[cfg(target_arch = "aarch64")]
#[test]
fn test_detect_reports_neon_on_aarch64() {
    assert!(detect().contains(FeatureMask::NEON));
}

#[test]
fn test_mask_set_operations() {
    let mask = FeatureMask::SSE | FeatureMask::SSE2;
    assert!(mask.contains(FeatureMask::SSE));
    assert!(!mask.contains(FeatureMask::AVX));
    assert_eq!(mask & FeatureMask::SSE2, FeatureMask::SSE2);
    assert_eq!(mask.difference(FeatureMask::SSE), FeatureMask::SSE2);
    assert_eq!(
        FeatureMask::from_bits_truncate(u32::MAX),
        FeatureMask::all()
    );
}

#[test]
fn test_mask_display_lists_names_in_bit_order() {
    let mask = FeatureMask::AVX2 | FeatureMask::FPU | FeatureMask::SSE2;
    assert_eq!(mask.to_string(), "FPU SSE2 AVX2");
    assert_eq!(FeatureMask::empty().to_string(), "");
    assert_eq!(format!("{:?}", FeatureMask::MMX), "{\"MMX\"}");
}

#[test]
fn test_report_covers_every_feature() {
    let report: Vec<_> = FeatureMask::FPU.report().collect();
    assert_eq!(report.len(), 12);
    assert_eq!(report[0], ("FPU", true));
    assert!(report[1..].iter().all(|(_, present)| !present));
}

#[test]
fn test_endianness_matches_target() {
    let expected = if cfg!(target_endian = "big") {
        Endianness::Big
    } else {
        Endianness::Little
    };
    assert_eq!(Endianness::native(), expected);
}

#[test]
fn test_cpu_info_serializes_feature_names() {
    let info = CpuInfo {
        vendor: Some("GenuineIntel".to_string()),
        endianness: Endianness::Little,
        features: FeatureMask::FPU | FeatureMask::SSE,
    };
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["features"], serde_json::json!(["FPU", "SSE"]));
    assert_eq!(json["endianness"], "little");
}
