//! Property-based checks of the dispatcher against the scalar engine.
//!
//! The deterministic matrix in `tier_equivalence.rs` covers boundaries; these
//! tests add randomized values, lengths and offsets on the auto-selected tier.

use proptest::{
    collection::vec,
    prelude::{any, prop_assert, prop_assert_eq, prop_oneof, Just, Strategy},
    proptest,
    test_runner::{Config as ProptestConfig, FileFailurePersistence},
};
use waterspout_core::{AlignedBuffer, Engine, Tier, TierSelector};

const TIER_PROP_CASES: u32 = 256;
const TIER_PROP_MAX_SHRINK_ITERS: u32 = 2048;

fn length_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![
        Just(0_usize),
        Just(15_usize),
        Just(16_usize),
        Just(31_usize),
        Just(32_usize),
        Just(33_usize),
        Just(64_usize),
        0_usize..=700,
    ]
}

fn pair_strategy<S: Strategy + Clone>(values: S) -> impl Strategy<Value = (Vec<S::Value>, Vec<S::Value>, usize)>
where
    S::Value: Clone + std::fmt::Debug,
{
    (length_strategy(), 0_usize..8).prop_flat_map(move |(len, offset)| {
        (vec(values.clone(), len), vec(values.clone(), len), Just(offset))
    })
}

fn tier_proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: TIER_PROP_CASES,
        max_shrink_iters: TIER_PROP_MAX_SHRINK_ITERS,
        // Integration tests do not have a nearby lib.rs/main.rs, so set an
        // explicit persistence root for reproducible counterexamples.
        failure_persistence: Some(Box::new(FileFailurePersistence::WithSource(
            "tier-property-regressions",
        ))),
        ..ProptestConfig::default()
    }
}

fn reference() -> Engine {
    Engine::new(TierSelector::Force(Tier::Fpu), false).expect("FPU")
}

/// Places `values` `offset` elements past a 32-byte boundary.
fn placed<T: waterspout_core::Element>(values: &[T], offset: usize) -> AlignedBuffer<T> {
    let mut buffer = AlignedBuffer::<T>::new(values.len() + offset);
    buffer[offset..].copy_from_slice(values);
    buffer
}

proptest! {
    #![proptest_config(tier_proptest_config())]

    #[test]
    fn test_f32_binary_ops_match_scalar((a, b, offset) in pair_strategy(any::<f32>())) {
        let auto = Engine::auto();
        let fpu = reference();
        let (a, b) = (placed(&a, offset), placed(&b, offset));
        let mut got = AlignedBuffer::<f32>::new(a.len());
        let mut want = AlignedBuffer::<f32>::new(a.len());
        let ops: [fn(&Engine, &[f32], &[f32], &mut [f32]); 4] =
            [Engine::add, Engine::subtract, Engine::multiply, Engine::divide];
        for op in ops {
            op(&auto, &a[offset..], &b[offset..], &mut got[offset..]);
            op(&fpu, &a[offset..], &b[offset..], &mut want[offset..]);
            for (g, w) in got.iter().zip(want.iter()) {
                prop_assert!(g.to_bits() == w.to_bits() || (g.is_nan() && w.is_nan()), "{g} != {w}");
            }
        }
    }

    #[test]
    fn test_f64_scale_matches_scalar(
        (a, _, offset) in pair_strategy(-1.0e300_f64..1.0e300),
        gain in any::<f64>(),
    ) {
        let mut got = placed(&a, offset);
        let mut want = got.clone();
        Engine::auto().scale_f64(&mut got[offset..], gain);
        reference().scale_f64(&mut want[offset..], gain);
        for (g, w) in got.iter().zip(want.iter()) {
            prop_assert!(g.to_bits() == w.to_bits() || (g.is_nan() && w.is_nan()), "{g} != {w}");
        }
    }

    #[test]
    fn test_i32_scale_matches_scalar(
        (a, _, offset) in pair_strategy(any::<i32>()),
        gain in -4.0_f32..4.0,
    ) {
        let mut got = placed(&a, offset);
        let mut want = got.clone();
        Engine::auto().scale(&mut got[offset..], gain);
        reference().scale(&mut want[offset..], gain);
        prop_assert_eq!(&got[..], &want[..]);
    }

    #[test]
    fn test_i16_binary_ops_match_scalar((a, b, offset) in pair_strategy(any::<i16>())) {
        let auto = Engine::auto();
        let fpu = reference();
        let (a, b) = (placed(&a, offset), placed(&b, offset));
        let mut got = AlignedBuffer::<i16>::new(a.len());
        let mut want = AlignedBuffer::<i16>::new(a.len());
        let ops: [fn(&Engine, &[i16], &[i16], &mut [i16]); 4] =
            [Engine::add, Engine::subtract, Engine::multiply, Engine::divide];
        for op in ops {
            op(&auto, &a[offset..], &b[offset..], &mut got[offset..]);
            op(&fpu, &a[offset..], &b[offset..], &mut want[offset..]);
            prop_assert_eq!(&got[..], &want[..]);
        }
    }

    #[test]
    fn test_u8_set_then_copy_round_trips(
        (a, _, offset) in pair_strategy(any::<u8>()),
        value in any::<u8>(),
    ) {
        let engine = Engine::auto();
        let src = placed(&a, offset);
        let mut dst = AlignedBuffer::<u8>::new(src.len());
        engine.set(&mut dst[offset..], value);
        prop_assert!(dst[offset..].iter().all(|&x| x == value));
        engine.copy(&src[offset..], &mut dst[offset..]);
        prop_assert_eq!(&dst[offset..], &src[offset..]);
    }
}
