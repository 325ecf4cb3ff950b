//! Hamming-distance matching with Lowe's ratio test.

use log::debug;
use orb_core::{hamming_distance, CandidateMatch, Descriptor};
use rayon::prelude::*;

pub const DEFAULT_RATIO_THRESHOLD: f32 = 0.75;
pub const DEFAULT_MAX_MATCHES: usize = 200;

/// Brute-force k-nearest-neighbour search. Each entry holds up to `k`
/// neighbours of one query descriptor, nearest first; equal distances keep
/// the lower train index first.
pub fn knn_match(query: &[Descriptor], train: &[Descriptor], k: usize) -> Vec<Vec<CandidateMatch>> {
    query
        .par_iter()
        .enumerate()
        .map(|(query_idx, q)| {
            let mut best: Vec<CandidateMatch> = Vec::with_capacity(k + 1);
            if k == 0 {
                return best;
            }
            for (train_idx, t) in train.iter().enumerate() {
                let distance = hamming_distance(q, t);
                if best.len() == k && distance >= best[k - 1].distance {
                    continue;
                }
                // Insert after every neighbour at the same distance
                let pos = best.partition_point(|m| m.distance <= distance);
                best.insert(pos, CandidateMatch { query_idx, train_idx, distance });
                best.truncate(k);
            }
            best
        })
        .collect()
}

/// Keep the nearest neighbour only when `d1 < ratio * d2`. Queries with fewer
/// than two neighbours contribute nothing.
pub fn ratio_test(knn: &[Vec<CandidateMatch>], ratio: f32) -> Vec<CandidateMatch> {
    knn.iter()
        .filter_map(|neighbours| match neighbours.as_slice() {
            [first, second, ..] if (first.distance as f32) < ratio * second.distance as f32 => Some(*first),
            _ => None,
        })
        .collect()
}

/// Sort best first and keep at most `max_matches`. The sort is stable, so
/// equal distances stay in query order.
pub fn rank_and_truncate(mut matches: Vec<CandidateMatch>, max_matches: usize) -> Vec<CandidateMatch> {
    matches.sort_by_key(|m| m.distance);
    matches.truncate(max_matches);
    matches
}

/// Ratio-test matcher with a cap on the number of returned matches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    pub ratio_threshold: f32,
    pub max_matches: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

impl Matcher {
    pub fn new(ratio_threshold: f32, max_matches: usize) -> Self {
        Self { ratio_threshold, max_matches }
    }

    /// Match descriptors of image A (`query`) against image B (`train`).
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<CandidateMatch> {
        if query.is_empty() || train.len() < 2 {
            debug!("skipping matching: {} query / {} train descriptors", query.len(), train.len());
            return Vec::new();
        }

        let knn = knn_match(query, train, 2);
        let accepted = ratio_test(&knn, self.ratio_threshold);
        let accepted_count = accepted.len();
        let ranked = rank_and_truncate(accepted, self.max_matches);

        debug!(
            "ratio test kept {} of {} queries, {} after truncation",
            accepted_count,
            query.len(),
            ranked.len()
        );

        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn descriptor(seed: u64) -> Descriptor {
        let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let mut d = [0u8; 32];
        for byte in d.iter_mut() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            *byte = (state >> 56) as u8;
        }
        d
    }

    fn with_flipped_bits(d: &Descriptor, bits: usize) -> Descriptor {
        let mut out = *d;
        for i in 0..bits {
            out[i / 8] ^= 1 << (i % 8);
        }
        out
    }

    #[test]
    fn knn_returns_nearest_first() {
        let base = descriptor(1);
        let train = vec![with_flipped_bits(&base, 10), with_flipped_bits(&base, 2), with_flipped_bits(&base, 5)];
        let knn = knn_match(&[base], &train, 2);
        assert_eq!(knn.len(), 1);
        assert_eq!(knn[0].iter().map(|m| m.train_idx).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(knn[0][0].distance, 2);
        assert_eq!(knn[0][1].distance, 5);
    }

    #[test]
    fn knn_ties_prefer_lower_train_index() {
        let base = descriptor(2);
        let same = with_flipped_bits(&base, 3);
        let knn = knn_match(&[base], &[same, descriptor(9), same, same], 2);
        assert_eq!(knn[0][0].train_idx, 0);
        assert_eq!(knn[0][1].train_idx, 2);
    }

    #[test]
    fn ratio_test_rejects_ambiguous_matches() {
        let base = descriptor(3);
        // Distinct: 2 vs 40 bits; ambiguous: 20 vs 21 bits
        let distinct = knn_match(&[base], &[with_flipped_bits(&base, 2), with_flipped_bits(&base, 40)], 2);
        let ambiguous = knn_match(&[base], &[with_flipped_bits(&base, 20), with_flipped_bits(&base, 21)], 2);
        assert_eq!(ratio_test(&distinct, 0.75).len(), 1);
        assert!(ratio_test(&ambiguous, 0.75).is_empty());
    }

    #[test]
    fn exact_duplicates_are_ambiguous() {
        let base = descriptor(4);
        let knn = knn_match(&[base], &[base, base], 2);
        assert!(ratio_test(&knn, 0.75).is_empty());
    }

    #[test]
    fn too_few_train_descriptors_give_no_matches() {
        let matcher = Matcher::default();
        assert!(matcher.match_descriptors(&[descriptor(1)], &[descriptor(1)]).is_empty());
        assert!(matcher.match_descriptors(&[], &[descriptor(1), descriptor(2)]).is_empty());
    }

    #[test]
    fn matcher_recovers_perturbed_copies() {
        let train: Vec<Descriptor> = (0..50).map(descriptor).collect();
        let query: Vec<Descriptor> = train.iter().map(|d| with_flipped_bits(d, 3)).collect();
        let matches = Matcher::default().match_descriptors(&query, &train);
        assert_eq!(matches.len(), 50);
        for m in &matches {
            assert_eq!(m.query_idx, m.train_idx);
            assert_eq!(m.distance, 3);
        }
    }

    #[test]
    fn matcher_caps_and_sorts() {
        let train: Vec<Descriptor> = (0..40).map(descriptor).collect();
        let query: Vec<Descriptor> = train
            .iter()
            .enumerate()
            .map(|(i, d)| with_flipped_bits(d, i % 7))
            .collect();
        let matches = Matcher::new(0.75, 10).match_descriptors(&query, &train);
        assert_eq!(matches.len(), 10);
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(matches[0].distance, 0);
    }

    fn descriptor_sets() -> impl Strategy<Value = (Vec<Descriptor>, Vec<Descriptor>)> {
        (
            prop::collection::vec(any::<[u8; 32]>(), 0..30),
            prop::collection::vec(any::<[u8; 32]>(), 0..30),
        )
    }

    proptest! {
        #[test]
        fn lower_ratio_never_accepts_more((query, train) in descriptor_sets(), low in 0.1f32..1.0, delta in 0.0f32..0.5) {
            let strict = Matcher::new(low, usize::MAX).match_descriptors(&query, &train);
            let loose = Matcher::new(low + delta, usize::MAX).match_descriptors(&query, &train);
            prop_assert!(strict.len() <= loose.len());
        }

        #[test]
        fn truncation_keeps_the_best((query, train) in descriptor_sets(), ratio in 0.5f32..1.0, max in 0usize..20) {
            let all = Matcher::new(ratio, usize::MAX).match_descriptors(&query, &train);
            let kept = Matcher::new(ratio, max).match_descriptors(&query, &train);

            prop_assert_eq!(kept.len(), all.len().min(max));
            prop_assert!(kept.windows(2).all(|w| w[0].distance <= w[1].distance));
            if let Some(worst_kept) = kept.last() {
                for dropped in &all[kept.len()..] {
                    prop_assert!(dropped.distance >= worst_kept.distance);
                }
            }
            for m in &kept {
                prop_assert!(m.query_idx < query.len());
                prop_assert!(m.train_idx < train.len());
            }
        }
    }
}
