//! Attribute sampler: statistically shaped scalar values.
//!
//! Every function takes the batch's SampleRng explicitly. Derived scores
//! (churn risk, patient risk) are linear-additive formulas with a small
//! uniform noise term; their coefficients are fixed for output
//! compatibility and are not exposed through the model config.

use crate::{
    config::ClippedNormalParams,
    error::{GenError, GenResult},
    rng::SampleRng,
    types::SmokingStatus,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Gamma, Normal};

// ── Dates ────────────────────────────────────────────────────────────────────

/// Uniform day in [start, end]. `start` must not be after `end`.
pub fn sample_date_between(rng: &mut SampleRng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days().max(0);
    start + Duration::days(rng.int_inclusive(0, span))
}

/// Uniform whole second in [start, end].
pub fn sample_datetime_between(
    rng: &mut SampleRng,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let span = (end - start).num_seconds().max(0);
    start + Duration::seconds(rng.int_inclusive(0, span))
}

// ── Continuous distributions ─────────────────────────────────────────────────

/// Gamma(shape, scale) used for customer lifetime value.
pub fn lifetime_value_distribution(shape: f64, scale: f64) -> GenResult<Gamma<f64>> {
    Gamma::new(shape, scale)
        .map_err(|e| GenError::invalid(format!("lifetime value gamma({shape}, {scale}): {e}")))
}

/// Gamma draw rounded to cents. Unbounded above: most customers are
/// low-value, a few are very high-value.
pub fn sample_lifetime_value(rng: &mut SampleRng, dist: &Gamma<f64>) -> f64 {
    round_to(dist.sample(rng), 2)
}

/// A Normal sample clipped to a closed interval, then truncated to an integer.
#[derive(Debug, Clone, Copy)]
pub struct ClippedNormal {
    normal: Normal<f64>,
    min: f64,
    max: f64,
}

impl ClippedNormal {
    pub fn new(params: &ClippedNormalParams) -> GenResult<Self> {
        let normal = Normal::new(params.mean, params.std_dev).map_err(|e| {
            GenError::invalid(format!(
                "normal({}, {}): {e}",
                params.mean, params.std_dev
            ))
        })?;
        if params.min.is_nan() || params.max.is_nan() || params.min > params.max {
            return Err(GenError::invalid(format!(
                "clip bounds [{}, {}] are inverted",
                params.min, params.max
            )));
        }
        Ok(Self {
            normal,
            min: params.min,
            max: params.max,
        })
    }

    pub fn sample(&self, rng: &mut SampleRng) -> i64 {
        self.normal.sample(rng).clamp(self.min, self.max) as i64
    }
}

/// Normal(690, 60) clipped to [300, 850] with the default model.
pub fn sample_credit_score(rng: &mut SampleRng, dist: &ClippedNormal) -> i64 {
    dist.sample(rng)
}

// ── Categorical ──────────────────────────────────────────────────────────────

/// A fixed set of categories with relative weights, validated once.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T> WeightedChoice<T> {
    /// Weights need not be normalized but must be non-negative and sum > 0.
    pub fn new(items: Vec<T>, weights: &[f64]) -> GenResult<Self> {
        if items.len() != weights.len() {
            return Err(GenError::invalid(format!(
                "{} categories but {} weights",
                items.len(),
                weights.len()
            )));
        }
        let index = WeightedIndex::new(weights)
            .map_err(|e| GenError::invalid(format!("category weights: {e}")))?;
        Ok(Self { items, index })
    }

    pub fn sample(&self, rng: &mut SampleRng) -> &T {
        &self.items[self.index.sample(rng)]
    }
}

/// One-shot weighted draw. Prefer WeightedChoice when drawing repeatedly.
pub fn sample_weighted_category<'a, T>(
    rng: &mut SampleRng,
    categories: &'a [T],
    weights: &[f64],
) -> GenResult<&'a T> {
    if categories.len() != weights.len() {
        return Err(GenError::invalid(format!(
            "{} categories but {} weights",
            categories.len(),
            weights.len()
        )));
    }
    let index = WeightedIndex::new(weights)
        .map_err(|e| GenError::invalid(format!("category weights: {e}")))?;
    Ok(&categories[index.sample(rng)])
}

/// Random-size subset (0..=max_size, capped at the vocabulary size)
/// drawn without replacement. Order is arbitrary.
pub fn sample_subset<'a, T>(
    rng: &mut SampleRng,
    vocabulary: &'a [T],
    max_size: usize,
) -> Vec<&'a T> {
    let cap = max_size.min(vocabulary.len());
    let size = rng.int_inclusive(0, cap as i64) as usize;
    vocabulary.choose_multiple(rng, size).collect()
}

// ── Derived scores ───────────────────────────────────────────────────────────

/// Customer churn risk in [0, 1], 3 decimals.
///
/// base 0.5; -0.15 if active; -0.10 Enterprise / +0.05 Consumer;
/// -min(0.20, ltv/10000); + U(-0.05, 0.05).
pub fn sample_churn_risk(
    rng: &mut SampleRng,
    is_active: bool,
    segment: &str,
    lifetime_value: f64,
) -> f64 {
    let mut risk = 0.5;
    if is_active {
        risk -= 0.15;
    }
    match segment {
        "Enterprise" => risk -= 0.10,
        "Consumer" => risk += 0.05,
        _ => {}
    }
    risk -= (lifetime_value / 10_000.0).min(0.20);
    risk += rng.uniform(-0.05, 0.05);
    round_to(risk.clamp(0.0, 1.0), 3)
}

/// Patient risk score in [0, 1], 3 decimals.
///
/// base 0.1; +min(0.3, age/200); +0.15 if bmi>=30, +0.07 if 25<=bmi<30;
/// +min(0.25, 0.06 per condition); +0.2 Current / +0.05 Former smoker;
/// + U(-0.03, 0.03).
pub fn sample_risk_score(
    rng: &mut SampleRng,
    age: i64,
    bmi: f64,
    condition_count: usize,
    smoking: SmokingStatus,
) -> f64 {
    let mut score = 0.1;
    score += (age as f64 / 200.0).min(0.3);
    if bmi >= 30.0 {
        score += 0.15;
    } else if bmi >= 25.0 {
        score += 0.07;
    }
    score += (condition_count as f64 * 0.06).min(0.25);
    match smoking {
        SmokingStatus::Current => score += 0.2,
        SmokingStatus::Former => score += 0.05,
        SmokingStatus::Never => {}
    }
    score += rng.uniform(-0.03, 0.03);
    round_to(score.clamp(0.0, 1.0), 3)
}

/// weight / (height in metres)², one decimal.
pub fn compute_bmi(height_cm: i64, weight_kg: i64) -> f64 {
    let h_m = height_cm as f64 / 100.0;
    round_to(weight_kg as f64 / (h_m * h_m), 1)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomerModel;
    use std::collections::HashSet;

    fn rng(seed: u64) -> SampleRng {
        SampleRng::new(seed, 0)
    }

    #[test]
    fn date_between_is_inclusive_and_bounded() {
        let mut rng = rng(1);
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let seen: HashSet<NaiveDate> = (0..500)
            .map(|_| sample_date_between(&mut rng, start, end))
            .collect();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|d| *d >= start && *d <= end));
    }

    #[test]
    fn date_between_single_day() {
        let mut rng = rng(2);
        let day = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(sample_date_between(&mut rng, day, day), day);
    }

    #[test]
    fn lifetime_value_is_non_negative_and_right_skewed() {
        let mut rng = rng(3);
        let dist = lifetime_value_distribution(2.5, 120.0).unwrap();
        let mut values: Vec<f64> = (0..5_000)
            .map(|_| sample_lifetime_value(&mut rng, &dist))
            .collect();
        assert!(values.iter().all(|v| *v >= 0.0));
        assert!(values.iter().all(|v| round_to(*v, 2) == *v));

        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = values[values.len() / 2];
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!(mean > median, "mean {mean:.2} should exceed median {median:.2}");
        assert!((mean - 300.0).abs() < 20.0, "gamma mean should be near 300, got {mean:.2}");
    }

    #[test]
    fn bad_gamma_parameters_are_rejected() {
        assert!(lifetime_value_distribution(0.0, 120.0).is_err());
    }

    #[test]
    fn credit_scores_stay_clipped() {
        let mut rng = rng(4);
        let dist = ClippedNormal::new(&CustomerModel::default().credit_score).unwrap();
        for _ in 0..10_000 {
            let score = sample_credit_score(&mut rng, &dist);
            assert!((300..=850).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn clipping_pins_extreme_distributions() {
        let mut rng = rng(5);
        let params = ClippedNormalParams {
            mean: 10_000.0,
            std_dev: 1.0,
            min: 0.0,
            max: 100.0,
        };
        let dist = ClippedNormal::new(&params).unwrap();
        assert_eq!(dist.sample(&mut rng), 100);
    }

    #[test]
    fn churn_risk_formula_without_noise_bounds() {
        let mut rng = rng(6);
        for _ in 0..1_000 {
            // Active Enterprise with high value: 0.5 - 0.15 - 0.10 - 0.20 = 0.05 ± 0.05
            let low = sample_churn_risk(&mut rng, true, "Enterprise", 50_000.0);
            assert!((0.0..=0.1).contains(&low), "{low}");

            // Inactive Consumer, zero value: 0.55 ± 0.05
            let high = sample_churn_risk(&mut rng, false, "Consumer", 0.0);
            assert!((0.5..=0.6).contains(&high), "{high}");
        }
    }

    #[test]
    fn churn_risk_is_rounded_to_three_decimals() {
        let mut rng = rng(7);
        for _ in 0..200 {
            let r = sample_churn_risk(&mut rng, false, "SMB", 123.45);
            assert_eq!(round_to(r, 3), r);
        }
    }

    #[test]
    fn risk_score_saturates_components() {
        let mut rng = rng(8);
        for _ in 0..1_000 {
            // 0.1 + 0.3 + 0.15 + 0.25 + 0.2 = 1.0, noise can only push it down by 0.03
            let s = sample_risk_score(&mut rng, 120, 35.0, 10, SmokingStatus::Current);
            assert!((0.97..=1.0).contains(&s), "{s}");

            // newborn, normal bmi, healthy non-smoker: 0.1 ± 0.03
            let s = sample_risk_score(&mut rng, 0, 22.0, 0, SmokingStatus::Never);
            assert!((0.07..=0.13).contains(&s), "{s}");
        }
    }

    #[test]
    fn overweight_band_adds_smaller_increment() {
        let mut rng = rng(9);
        let s = sample_risk_score(&mut rng, 0, 27.0, 0, SmokingStatus::Former);
        // 0.1 + 0.07 + 0.05 = 0.22 ± 0.03
        assert!((0.19..=0.25).contains(&s), "{s}");
    }

    #[test]
    fn bmi_matches_reference_values() {
        assert_eq!(compute_bmi(180, 81), 25.0);
        assert_eq!(compute_bmi(170, 75), 26.0);
        assert_eq!(compute_bmi(140, 180), 91.8);
    }

    #[test]
    fn weighted_choice_respects_zero_weights() {
        let mut rng = rng(10);
        let choice = WeightedChoice::new(vec!["a", "b", "c"], &[0.0, 1.0, 0.0]).unwrap();
        for _ in 0..100 {
            assert_eq!(*choice.sample(&mut rng), "b");
        }
    }

    #[test]
    fn weighted_choice_accepts_unnormalized_weights() {
        let mut rng = rng(11);
        let choice = WeightedChoice::new(vec!["x", "y"], &[3.0, 1.0]).unwrap();
        let xs = (0..4_000).filter(|_| *choice.sample(&mut rng) == "x").count();
        assert!((2_800..3_200).contains(&xs), "x drawn {xs} times");
    }

    #[test]
    fn weighted_draw_rejects_bad_weights() {
        let mut rng = rng(12);
        assert!(sample_weighted_category(&mut rng, &["a", "b"], &[0.0, 0.0]).is_err());
        assert!(sample_weighted_category(&mut rng, &["a", "b"], &[-1.0, 2.0]).is_err());
        assert!(sample_weighted_category(&mut rng, &["a", "b"], &[1.0]).is_err());
        assert_eq!(
            *sample_weighted_category(&mut rng, &["a", "b"], &[0.0, 5.0]).unwrap(),
            "b"
        );
    }

    #[test]
    fn subsets_have_no_duplicates_and_respect_max() {
        let mut rng = rng(13);
        let vocab = ["a", "b", "c", "d", "e", "f", "g"];
        let mut sizes = HashSet::new();
        for _ in 0..2_000 {
            let subset = sample_subset(&mut rng, &vocab, 3);
            assert!(subset.len() <= 3);
            let unique: HashSet<_> = subset.iter().collect();
            assert_eq!(unique.len(), subset.len());
            sizes.insert(subset.len());
        }
        assert_eq!(sizes, HashSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn subset_size_is_capped_by_vocabulary() {
        let mut rng = rng(14);
        let vocab = ["only", "two"];
        for _ in 0..200 {
            assert!(sample_subset(&mut rng, &vocab, 10).len() <= 2);
        }
    }
}
