use crate::error::{GenError, GenResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for any look-back or look-ahead window, in days.
pub const MAX_WINDOW_DAYS: i64 = 200 * 366;

pub const MAX_AGE_SPAN_YEARS: i64 = 200;

// ── Customer model ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerModel {
    pub birth_date_start: NaiveDate,
    pub birth_date_end: NaiveDate,
    pub signup_lookback_days: i64,
    pub active_probability: f64,
    pub inactive_login_max_hours: i64,
    pub lifetime_value_shape: f64,
    pub lifetime_value_scale: f64,
    pub segments: Vec<String>,
    pub segment_weights: Vec<f64>,
    pub referral_sources: Vec<String>,
    pub marketing_opt_in_probability: f64,
    pub credit_score: ClippedNormalParams,
}

impl Default for CustomerModel {
    fn default() -> Self {
        Self {
            birth_date_start: ymd(1940, 1, 1),
            birth_date_end: ymd(2005, 12, 31),
            signup_lookback_days: 5 * 365,
            active_probability: 0.8,
            inactive_login_max_hours: 72,
            lifetime_value_shape: 2.5,
            lifetime_value_scale: 120.0,
            segments: strings(&["Enterprise", "SMB", "Consumer", "Non-Profit", "Education"]),
            segment_weights: vec![0.15, 0.25, 0.45, 0.05, 0.10],
            referral_sources: strings(&[
                "Organic Search",
                "Paid Search",
                "Social Media",
                "Referral",
                "Email Campaign",
                "Event",
                "Direct",
                "Affiliate",
            ]),
            marketing_opt_in_probability: 0.6,
            credit_score: ClippedNormalParams {
                mean: 690.0,
                std_dev: 60.0,
                min: 300.0,
                max: 850.0,
            },
        }
    }
}

impl CustomerModel {
    pub fn validate(&self) -> GenResult<()> {
        if self.birth_date_start > self.birth_date_end {
            return Err(GenError::invalid(
                "customer.birth_date_start must not be after birth_date_end",
            ));
        }
        window("customer.signup_lookback_days", self.signup_lookback_days, MAX_WINDOW_DAYS)?;
        window(
            "customer.inactive_login_max_hours",
            self.inactive_login_max_hours,
            MAX_WINDOW_DAYS * 24,
        )?;
        probability("customer.active_probability", self.active_probability)?;
        probability(
            "customer.marketing_opt_in_probability",
            self.marketing_opt_in_probability,
        )?;
        if self.lifetime_value_shape.is_nan()
            || self.lifetime_value_scale.is_nan()
            || self.lifetime_value_shape <= 0.0
            || self.lifetime_value_scale <= 0.0
        {
            return Err(GenError::invalid(
                "customer.lifetime_value_shape and lifetime_value_scale must be > 0",
            ));
        }
        weights("customer.segments", &self.segments, &self.segment_weights)?;
        non_empty("customer.referral_sources", &self.referral_sources)?;
        self.credit_score.validate("customer.credit_score")
    }
}

// ── Patient model ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientModel {
    /// Birth dates span this many 365-day years back from today.
    pub age_span_years: i64,
    pub genders: Vec<String>,
    pub mrn_digits: u32,
    pub insurance_providers: Vec<String>,
    pub insurance_plans: Vec<String>,
    pub blood_types: Vec<String>,
    pub height_cm: ClippedNormalParams,
    pub weight_kg: ClippedNormalParams,
    /// Weights for Never / Former / Current, in that order.
    pub smoking_weights: [f64; 3],
    pub chronic_conditions: Vec<String>,
    pub max_chronic_conditions: usize,
    pub allergies: Vec<String>,
    pub max_allergies: usize,
    pub medications: Vec<String>,
    pub max_medications: usize,
    pub last_visit_lookback_days: i64,
    pub next_appointment_probability: f64,
    pub next_appointment_horizon_days: i64,
}

impl Default for PatientModel {
    fn default() -> Self {
        Self {
            age_span_years: 100,
            genders: strings(&["Male", "Female", "Other"]),
            mrn_digits: 8,
            insurance_providers: strings(&[
                "Aetna",
                "Blue Cross",
                "United Healthcare",
                "Cigna",
                "Kaiser",
                "Medicare",
                "Medicaid",
            ]),
            insurance_plans: strings(&["Bronze", "Silver", "Gold", "Platinum", "HMO", "PPO"]),
            blood_types: strings(&["O+", "O-", "A+", "A-", "B+", "B-", "AB+", "AB-"]),
            height_cm: ClippedNormalParams {
                mean: 170.0,
                std_dev: 10.0,
                min: 140.0,
                max: 205.0,
            },
            weight_kg: ClippedNormalParams {
                mean: 75.0,
                std_dev: 15.0,
                min: 40.0,
                max: 180.0,
            },
            smoking_weights: [0.6, 0.25, 0.15],
            chronic_conditions: strings(&[
                "Hypertension",
                "Diabetes Type 2",
                "Asthma",
                "Hyperlipidemia",
                "Depression",
                "Coronary Artery Disease",
                "COPD",
                "Arthritis",
                "CKD Stage 2",
                "Obesity",
            ]),
            max_chronic_conditions: 4,
            allergies: strings(&[
                "Penicillin",
                "Latex",
                "Peanuts",
                "Shellfish",
                "NSAIDs",
                "Pollen",
                "Dust",
            ]),
            max_allergies: 3,
            medications: strings(&[
                "Metformin",
                "Lisinopril",
                "Atorvastatin",
                "Albuterol",
                "Levothyroxine",
                "Omeprazole",
                "Amlodipine",
            ]),
            max_medications: 4,
            last_visit_lookback_days: 365,
            next_appointment_probability: 0.7,
            next_appointment_horizon_days: 180,
        }
    }
}

impl PatientModel {
    pub fn validate(&self) -> GenResult<()> {
        window("patient.age_span_years", self.age_span_years, MAX_AGE_SPAN_YEARS)?;
        window(
            "patient.last_visit_lookback_days",
            self.last_visit_lookback_days,
            MAX_WINDOW_DAYS,
        )?;
        window(
            "patient.next_appointment_horizon_days",
            self.next_appointment_horizon_days,
            MAX_WINDOW_DAYS,
        )?;
        if !(1..=18).contains(&self.mrn_digits) {
            return Err(GenError::invalid("patient.mrn_digits must be in 1..=18"));
        }
        non_empty("patient.genders", &self.genders)?;
        non_empty("patient.insurance_providers", &self.insurance_providers)?;
        non_empty("patient.insurance_plans", &self.insurance_plans)?;
        non_empty("patient.blood_types", &self.blood_types)?;
        self.height_cm.validate("patient.height_cm")?;
        self.weight_kg.validate("patient.weight_kg")?;
        if self.height_cm.min <= 0.0 {
            return Err(GenError::invalid("patient.height_cm.min must be > 0"));
        }
        let smoking = ["Never", "Former", "Current"].map(String::from);
        weights("patient.smoking_weights", &smoking, &self.smoking_weights)?;
        probability(
            "patient.next_appointment_probability",
            self.next_appointment_probability,
        )
    }
}

// ── Shared parameter blocks ────────────────────────────────────────

/// Normal(mean, std_dev), clipped to [min, max] and truncated to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClippedNormalParams {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ClippedNormalParams {
    fn validate(&self, field: &str) -> GenResult<()> {
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(GenError::invalid(format!("{field}.std_dev must be finite and >= 0")));
        }
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(GenError::invalid(format!("{field}.min must be <= max")));
        }
        Ok(())
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub customer: CustomerModel,
    pub patient: PatientModel,
}

impl ModelConfig {
    /// Load a JSON model file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: ModelConfig =
            serde_json::from_str(&content).map_err(|source| GenError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!("loaded model config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> GenResult<()> {
        self.customer.validate()?;
        self.patient.validate()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn window(field: &str, value: i64, max: i64) -> GenResult<()> {
    if !(0..=max).contains(&value) {
        return Err(GenError::invalid(format!(
            "{field} must be in [0, {max}], got {value}"
        )));
    }
    Ok(())
}

fn probability(field: &str, p: f64) -> GenResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(GenError::invalid(format!("{field} must be in [0, 1], got {p}")));
    }
    Ok(())
}

fn non_empty(field: &str, items: &[String]) -> GenResult<()> {
    if items.is_empty() {
        return Err(GenError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn weights(field: &str, items: &[String], weights: &[f64]) -> GenResult<()> {
    non_empty(field, items)?;
    if items.len() != weights.len() {
        return Err(GenError::invalid(format!(
            "{field}: {} categories but {} weights",
            items.len(),
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(GenError::invalid(format!("{field}: weights must be finite and >= 0")));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(GenError::invalid(format!("{field}: weights must sum to > 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        ModelConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "customer": {{ "active_probability": 0.5 }},
                 "patient": {{ "max_allergies": 1 }} }}"#
        )
        .unwrap();

        let config = ModelConfig::load(file.path()).unwrap();
        assert_eq!(config.customer.active_probability, 0.5);
        assert_eq!(config.customer.segments, CustomerModel::default().segments);
        assert_eq!(config.patient.max_allergies, 1);
        assert_eq!(config.patient.mrn_digits, 8);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = ModelConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, GenError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let mut config = ModelConfig::default();
        config.customer.segment_weights.pop();
        assert!(matches!(
            config.validate(),
            Err(GenError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn zero_weight_sum_is_rejected() {
        let mut config = ModelConfig::default();
        config.patient.smoking_weights = [0.0, 0.0, 0.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_windows_are_rejected() {
        let mut config = ModelConfig::default();
        config.patient.last_visit_lookback_days = 200_000_000;
        assert!(matches!(
            config.validate(),
            Err(GenError::InvalidArgument { .. })
        ));

        let mut config = ModelConfig::default();
        config.customer.signup_lookback_days = 200_000_000;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.customer.inactive_login_max_hours = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.patient.age_span_years = i64::MAX / 365 + 1;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.patient.next_appointment_horizon_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn widest_allowed_windows_still_generate() {
        let mut config = ModelConfig::default();
        config.customer.signup_lookback_days = MAX_WINDOW_DAYS;
        config.customer.inactive_login_max_hours = MAX_WINDOW_DAYS * 24;
        config.patient.age_span_years = MAX_AGE_SPAN_YEARS;
        config.patient.last_visit_lookback_days = MAX_WINDOW_DAYS;
        config.patient.next_appointment_horizon_days = MAX_WINDOW_DAYS;
        config.validate().unwrap();

        let options = crate::batch::GenerateOptions::new(50).with_seed(1);
        let customers = crate::customer::generate_customers_with(config.customer, &options);
        assert_eq!(customers.unwrap().count(), 50);
        let patients = crate::patient::generate_patients_with(config.patient, &options);
        assert_eq!(patients.unwrap().count(), 50);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut config = ModelConfig::default();
        config.customer.credit_score.min = 900.0;
        assert!(config.validate().is_err());
    }
}
