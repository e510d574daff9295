//! Relevance scoring for related-topic candidates.
//!
//! A candidate name is scored against its main topic name with a handful of
//! cheap textual signals:
//!
//! - base score of 5
//! - +3 when the candidate contains the main topic name (case-insensitive)
//! - up to +3 for length (`chars / 15`), longer names are more specific
//! - up to +2 for word count (`0.5` per word)
//! - advanced only: `1 - position / 20` for earlier candidates and a jitter
//!   in `[0, 0.5)` to break ties
//!
//! Advanced scores are clamped into [4, 10], simple scores into [1, 10].
//! Scoring never fails; a non-finite result is replaced by a deterministic
//! fallback.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use learnpath_types::{ScoringMode, ScoringSettings, MAX_WEIGHT, MIN_WEIGHT};

const BASE_SCORE: f64 = 5.0;
const CONTAINS_BONUS: f64 = 3.0;
const LENGTH_DIVISOR: f64 = 15.0;
const LENGTH_BONUS_CAP: f64 = 3.0;
const WORD_BONUS: f64 = 0.5;
const WORD_BONUS_CAP: f64 = 2.0;
const POSITION_DIVISOR: f64 = 20.0;
const MAX_JITTER: f64 = 0.5;
const ADVANCED_MIN_SCORE: f64 = 4.0;
const FALLBACK_POSITION_STEP: f64 = 0.01;

/// Source of tie-breaking jitter.
pub trait JitterSource: Send + Sync {
    /// Return a value in `[0, max)`.
    fn jitter(&self, max: f64) -> f64;
}

/// Seedable random jitter.
pub struct RandomJitter {
    rng: Mutex<StdRng>,
}

impl RandomJitter {
    /// Create a jitter source with a random seed.
    pub fn new() -> Self {
        Self::seeded(rand::random())
    }

    /// Create a reproducible jitter source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn jitter(&self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0.0..max)
    }
}

/// Jitter source that never perturbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn jitter(&self, _max: f64) -> f64 {
        0.0
    }
}

/// Jitter source that always returns the same value (clamped to `[0, max]`).
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn jitter(&self, max: f64) -> f64 {
        self.0.clamp(0.0, max.max(0.0))
    }
}

/// Scores related-topic candidates against a main topic.
#[derive(Clone)]
pub struct RelationScorer {
    mode: ScoringMode,
    max_unique_attempts: u32,
    jitter: Arc<dyn JitterSource>,
}

impl RelationScorer {
    /// Create a scorer with random jitter.
    pub fn new(settings: &ScoringSettings) -> Self {
        Self::with_jitter(settings, Arc::new(RandomJitter::new()))
    }

    /// Create a scorer with an explicit jitter source.
    pub fn with_jitter(settings: &ScoringSettings, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            mode: settings.mode,
            max_unique_attempts: settings.max_unique_attempts,
            jitter,
        }
    }

    /// Inclusive range of scores this scorer produces.
    pub fn range(&self) -> (f64, f64) {
        match self.mode {
            ScoringMode::Simple => (MIN_WEIGHT, MAX_WEIGHT),
            ScoringMode::Advanced => (ADVANCED_MIN_SCORE, MAX_WEIGHT),
        }
    }

    /// Score one candidate. `position` is the candidate's index in the
    /// source's response.
    pub fn score(&self, candidate: &str, main_topic: &str, position: usize) -> f64 {
        let mut score = BASE_SCORE + text_bonus(candidate, main_topic);

        if self.mode == ScoringMode::Advanced {
            score += 1.0 - position as f64 / POSITION_DIVISOR;
            score += self.jitter.jitter(MAX_JITTER);
        }

        if !score.is_finite() {
            debug!(candidate = %candidate, "Non-finite score, using fallback");
            return self.fallback(position);
        }

        let (min, max) = self.range();
        score.clamp(min, max)
    }

    /// Score a list of candidates for the same main topic, rounded to two
    /// decimals.
    ///
    /// In advanced mode no two returned scores are equal: a colliding
    /// candidate is re-scored a bounded number of times, then perturbed by
    /// `position * 0.01` and moved to the nearest free value in range.
    pub fn score_unique(&self, candidates: &[String], main_topic: &str) -> Vec<f64> {
        if self.mode == ScoringMode::Simple {
            return candidates
                .iter()
                .enumerate()
                .map(|(i, c)| round2(self.score(c, main_topic, i)))
                .collect();
        }

        let (min, max) = self.range();
        let (lo, hi) = (to_hundredths(min), to_hundredths(max));
        let mut taken: HashSet<i64> = HashSet::with_capacity(candidates.len());
        let mut scores = Vec::with_capacity(candidates.len());

        for (position, candidate) in candidates.iter().enumerate() {
            let mut value = to_hundredths(self.score(candidate, main_topic, position));
            let mut attempts = 0;

            while taken.contains(&value) && attempts < self.max_unique_attempts {
                attempts += 1;
                value = to_hundredths(self.score(candidate, main_topic, position));
            }

            if taken.contains(&value) {
                let perturbed = (value + position as i64).clamp(lo, hi);
                value = nearest_free(perturbed, lo, hi, &taken);
                debug!(
                    candidate = %candidate,
                    position = position,
                    score = value as f64 / 100.0,
                    "Perturbed colliding score"
                );
            }

            taken.insert(value);
            scores.push(value as f64 / 100.0);
        }

        scores
    }

    fn fallback(&self, position: usize) -> f64 {
        match self.mode {
            ScoringMode::Simple => BASE_SCORE,
            ScoringMode::Advanced => BASE_SCORE + position as f64 * FALLBACK_POSITION_STEP,
        }
    }
}

/// Containment, length and word-count bonuses.
fn text_bonus(candidate: &str, main_topic: &str) -> f64 {
    let needle = main_topic.trim().to_lowercase();
    let mut bonus = 0.0;

    if !needle.is_empty() && candidate.to_lowercase().contains(&needle) {
        bonus += CONTAINS_BONUS;
    }

    let length = candidate.chars().count() as f64;
    bonus += (length / LENGTH_DIVISOR).min(LENGTH_BONUS_CAP);

    let words = candidate.split_whitespace().count() as f64;
    bonus += (words * WORD_BONUS).min(WORD_BONUS_CAP);

    bonus
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Closest value to `start` within `[lo, hi]` not in `taken`, searching
/// downward first. Returns `start` when every slot is taken.
fn nearest_free(start: i64, lo: i64, hi: i64, taken: &HashSet<i64>) -> i64 {
    for distance in 0..=(hi - lo) {
        let below = start - distance;
        if below >= lo && !taken.contains(&below) {
            return below;
        }
        let above = start + distance;
        if above <= hi && !taken.contains(&above) {
            return above;
        }
    }
    start
}
