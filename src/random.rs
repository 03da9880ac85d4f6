//! Reproducible randomness.
//!
//! The engine owns no random state: every stochastic entry point takes an
//! `&mut impl Rng` supplied by the caller. [`stream_rng`] derives named
//! `StdRng` streams from one experiment seed so that independent concerns
//! (stepping, seeding, each intervention) draw decorrelated but
//! reproducible sequences, and the sampling helpers centralize uniform
//! without-replacement selection.

use crate::population::NodeId;
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// A convenience method to compute the hash of a `&str`.
fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_bytes());
    hasher.finish()
}

/// An `StdRng` for the named stream, seeded with the base seed offset by
/// the hash of the name. Two streams sharing an experiment seed are
/// decorrelated while each remains reproducible.
#[must_use]
pub fn stream_rng(base_seed: u64, name: &str) -> StdRng {
    trace!("creating rng for stream {name:?} (base_seed={base_seed})");
    StdRng::seed_from_u64(base_seed.wrapping_add(hash_str(name)))
}

/// `min(count, length)` distinct indices in `0..length`, uniform without
/// replacement. A zero request or an empty range yields an empty vector.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, length: usize, count: usize) -> Vec<usize> {
    let amount = count.min(length);
    if amount == 0 {
        return Vec::new();
    }
    rand::seq::index::sample(rng, length, amount).into_vec()
}

/// `min(count, node_count)` distinct node ids, uniform without
/// replacement.
pub fn sample_nodes<R: Rng + ?Sized>(
    rng: &mut R,
    node_count: usize,
    count: usize,
) -> Vec<NodeId> {
    sample_indices(rng, node_count, count)
        .into_iter()
        .map(NodeId)
        .collect()
}

#[cfg(test)]
mod test {
    use super::{sample_indices, stream_rng};
    use assert_approx_eq::assert_approx_eq;
    use rand::RngCore;

    #[test]
    fn same_seed_and_name_reproduce_the_sequence() {
        let mut first = stream_rng(42, "transmission");
        let mut second = stream_rng(42, "transmission");
        assert_eq!(first.next_u64(), second.next_u64());
        assert_eq!(first.next_u64(), second.next_u64());
    }

    #[test]
    fn different_names_are_decorrelated() {
        let mut first = stream_rng(42, "transmission");
        let mut second = stream_rng(42, "interventions");
        assert_ne!(first.next_u64(), second.next_u64());
    }

    #[test]
    fn different_base_seeds_diverge() {
        let mut first = stream_rng(42, "transmission");
        let mut second = stream_rng(88, "transmission");
        assert_ne!(first.next_u64(), second.next_u64());
    }

    #[test]
    fn sample_indices_are_distinct_and_in_range() {
        let mut rng = stream_rng(42, "sampling");
        let sample = sample_indices(&mut rng, 100, 30);
        assert_eq!(sample.len(), 30);
        let mut seen = sample.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 30);
        assert!(sample.iter().all(|&index| index < 100));
    }

    #[test]
    fn sample_indices_saturate_at_the_range_length() {
        let mut rng = stream_rng(42, "sampling");
        let sample = sample_indices(&mut rng, 5, 20);
        assert_eq!(sample.len(), 5);
    }

    #[test]
    fn sample_indices_zero_request_is_empty() {
        let mut rng = stream_rng(42, "sampling");
        assert!(sample_indices(&mut rng, 5, 0).is_empty());
        assert!(sample_indices(&mut rng, 0, 5).is_empty());
    }

    #[test]
    fn sampling_is_roughly_uniform() {
        let mut rng = stream_rng(42, "uniformity");
        let n_samples = 3000;
        let mut zero_counter = 0_i32;
        for _ in 0..n_samples {
            if sample_indices(&mut rng, 3, 1)[0] == 0 {
                zero_counter += 1;
            }
        }
        // The expected frequency of index zero is one third.
        assert_approx_eq!(f64::from(zero_counter) / 3000.0, 1.0 / 3.0, 0.03);
    }
}
