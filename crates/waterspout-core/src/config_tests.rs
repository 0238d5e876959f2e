//! Tests for layered configuration loading.

use figment::Jail;

use super::config::*;
use crate::tier::{Tier, TierSelector};
use crate::Error;

#[test]
fn test_defaults_without_sources() {
    Jail::expect_with(|_jail| {
        let config = WaterspoutConfig::load().expect("load");
        assert_eq!(config, WaterspoutConfig::default());
        assert_eq!(config.dispatch.tier, TierSelector::Auto);
        assert!(config.dispatch.allow_fallback);
        assert_eq!(config.logging.level, "info");
        Ok(())
    });
}

#[test]
fn test_toml_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            DEFAULT_CONFIG_FILE,
            r#"
                [dispatch]
                tier = "sse2"
                allow_fallback = false
            "#,
        )?;

        let config = WaterspoutConfig::load().expect("load");
        assert_eq!(config.dispatch.tier, TierSelector::Force(Tier::Sse2));
        assert!(!config.dispatch.allow_fallback);
        assert_eq!(config.logging.level, "info");
        Ok(())
    });
}

#[test]
fn test_tier_names_are_case_insensitive_in_files() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[dispatch]\ntier = \"AVX2\"\n")?;

        let config = WaterspoutConfig::load_from("custom.toml").expect("load");
        assert_eq!(config.dispatch.tier, TierSelector::Force(Tier::Avx2));
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(DEFAULT_CONFIG_FILE, "[dispatch]\ntier = \"sse2\"\n")?;
        jail.set_env("WATERSPOUT_DISPATCH__TIER", "fpu");
        jail.set_env("WATERSPOUT_LOGGING__LEVEL", "debug");

        let config = WaterspoutConfig::load().expect("load");
        assert_eq!(config.dispatch.tier, TierSelector::Force(Tier::Fpu));
        assert_eq!(config.logging.level, "debug");
        Ok(())
    });
}

#[test]
fn test_env_bool_override() {
    Jail::expect_with(|jail| {
        jail.set_env("WATERSPOUT_DISPATCH__ALLOW_FALLBACK", "false");

        let config = WaterspoutConfig::load().expect("load");
        assert!(!config.dispatch.allow_fallback);
        Ok(())
    });
}

#[test]
fn test_unknown_tier_is_config_error() {
    Jail::expect_with(|jail| {
        jail.create_file(DEFAULT_CONFIG_FILE, "[dispatch]\ntier = \"avx512\"\n")?;

        let err = WaterspoutConfig::load().expect_err("unknown tier must fail");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("avx512"));
        Ok(())
    });
}

#[test]
fn test_missing_explicit_file_falls_back_to_defaults() {
    Jail::expect_with(|_jail| {
        let config = WaterspoutConfig::load_from("does-not-exist.toml").expect("load");
        assert_eq!(config, WaterspoutConfig::default());
        Ok(())
    });
}

#[test]
fn test_engine_from_config_honours_forced_scalar() {
    let config = DispatchConfig {
        tier: TierSelector::Force(Tier::Fpu),
        allow_fallback: false,
    };
    let engine = crate::Engine::from_config(&config).expect("FPU is always compiled");
    assert_eq!(engine.name(), "FPU");
}
