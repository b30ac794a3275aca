//! Patient profiles (synthetic, non-PHI).
//!
//! Draw order: identity and contact, demographics, insurance, body
//! measurements, smoking and the three clinical lists, visit dates, then
//! the derived risk score, then the emergency contact.

use crate::{
    batch::{GenerateOptions, RecordBatch, RecordBuilder},
    clock::ReferenceClock,
    config::PatientModel,
    error::GenResult,
    provider::{compose_email, ProfileProvider},
    record::{join_semicolon, TabularRecord},
    rng::{SampleRng, StreamSlot},
    sampler::{
        compute_bmi, sample_date_between, sample_datetime_between, sample_risk_score,
        sample_subset, ClippedNormal, WeightedChoice,
    },
    types::SmokingStatus,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub medical_record_number: String,
    pub insurance_provider: String,
    pub insurance_plan: String,
    pub primary_physician: String,
    pub blood_type: String,
    pub height_cm: i64,
    pub weight_kg: i64,
    pub bmi: f64,
    pub smoking_status: SmokingStatus,
    #[serde(serialize_with = "join_semicolon", deserialize_with = "split_semicolon")]
    pub chronic_conditions: Vec<String>,
    #[serde(serialize_with = "join_semicolon", deserialize_with = "split_semicolon")]
    pub allergies: Vec<String>,
    #[serde(serialize_with = "join_semicolon", deserialize_with = "split_semicolon")]
    pub medications_current: Vec<String>,
    pub last_visit_date: NaiveDateTime,
    /// Empty cell when no appointment is booked.
    pub next_appointment_date: Option<NaiveDateTime>,
    pub risk_score: f64,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
}

impl PatientRecord {
    /// Whole 365-day years between birth and `today`.
    pub fn age_on(&self, today: NaiveDate) -> i64 {
        age_in_years(self.date_of_birth, today)
    }
}

impl TabularRecord for PatientRecord {
    const FIELDS: &'static [&'static str] = &[
        "patient_id",
        "first_name",
        "last_name",
        "gender",
        "date_of_birth",
        "email",
        "phone",
        "street_address",
        "city",
        "state",
        "postal_code",
        "country",
        "medical_record_number",
        "insurance_provider",
        "insurance_plan",
        "primary_physician",
        "blood_type",
        "height_cm",
        "weight_kg",
        "bmi",
        "smoking_status",
        "chronic_conditions",
        "allergies",
        "medications_current",
        "last_visit_date",
        "next_appointment_date",
        "risk_score",
        "emergency_contact_name",
        "emergency_contact_phone",
    ];

    fn record_id(&self) -> Uuid {
        self.patient_id
    }
}

fn split_semicolon<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let cell = String::deserialize(deserializer)?;
    Ok(cell
        .split(';')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    (today - date_of_birth).num_days().div_euclid(365)
}

pub struct PatientBuilder {
    model: PatientModel,
    height_cm: ClippedNormal,
    weight_kg: ClippedNormal,
    smoking: WeightedChoice<SmokingStatus>,
}

impl PatientBuilder {
    pub fn new(model: PatientModel) -> GenResult<Self> {
        model.validate()?;
        let height_cm = ClippedNormal::new(&model.height_cm)?;
        let weight_kg = ClippedNormal::new(&model.weight_kg)?;
        let smoking = WeightedChoice::new(SmokingStatus::ALL.to_vec(), &model.smoking_weights)?;
        Ok(Self {
            model,
            height_cm,
            weight_kg,
            smoking,
        })
    }

    fn medical_record_number(&self, rng: &mut SampleRng) -> String {
        let digits = self.model.mrn_digits as usize;
        let upper = 10i64.pow(self.model.mrn_digits) - 1;
        format!("MRN{:0digits$}", rng.int_inclusive(0, upper))
    }
}

fn pick_owned(rng: &mut SampleRng, items: &[String]) -> String {
    rng.pick(items).clone()
}

fn owned(items: Vec<&String>) -> Vec<String> {
    items.into_iter().cloned().collect()
}

impl RecordBuilder for PatientBuilder {
    type Record = PatientRecord;

    const ENTITY: &'static str = "patient";
    const STREAM: StreamSlot = StreamSlot::Patient;

    fn build<P: ProfileProvider>(
        &self,
        id: Uuid,
        provider: &P,
        rng: &mut SampleRng,
        clock: &ReferenceClock,
    ) -> PatientRecord {
        let m = &self.model;
        let now = clock.now();
        let today = clock.today();

        let first_name = provider.first_name(rng);
        let last_name = provider.last_name(rng);
        let gender = pick_owned(rng, &m.genders);
        let date_of_birth =
            sample_date_between(rng, today - Duration::days(365 * m.age_span_years), today);
        let age = age_in_years(date_of_birth, today);
        let domain = provider.free_email_domain(rng);
        let email = compose_email(&first_name, &last_name, &domain);
        let phone = provider.phone_number(rng);
        let street_address = provider.street_address(rng);
        let city = provider.city(rng);
        let state = provider.state_abbr(rng);
        let postal_code = provider.postal_code(rng);
        let country = provider.country();

        let medical_record_number = self.medical_record_number(rng);
        let insurance_provider = pick_owned(rng, &m.insurance_providers);
        let insurance_plan = pick_owned(rng, &m.insurance_plans);
        let primary_physician = format!("Dr. {}", provider.full_name(rng));
        let blood_type = pick_owned(rng, &m.blood_types);

        let height_cm = self.height_cm.sample(rng);
        let weight_kg = self.weight_kg.sample(rng);
        let bmi = compute_bmi(height_cm, weight_kg);
        let smoking_status = *self.smoking.sample(rng);

        let chronic_conditions = owned(sample_subset(
            rng,
            &m.chronic_conditions,
            m.max_chronic_conditions,
        ));
        let allergies = owned(sample_subset(rng, &m.allergies, m.max_allergies));
        let medications_current = owned(sample_subset(rng, &m.medications, m.max_medications));

        let last_visit_date = sample_datetime_between(
            rng,
            now - Duration::days(m.last_visit_lookback_days),
            now,
        );
        let next_appointment_date = if rng.chance(m.next_appointment_probability) {
            Some(sample_datetime_between(
                rng,
                now,
                now + Duration::days(m.next_appointment_horizon_days),
            ))
        } else {
            None
        };

        let risk_score = sample_risk_score(
            rng,
            age,
            bmi,
            chronic_conditions.len(),
            smoking_status,
        );

        PatientRecord {
            patient_id: id,
            first_name,
            last_name,
            gender,
            date_of_birth,
            email,
            phone,
            street_address,
            city,
            state,
            postal_code,
            country,
            medical_record_number,
            insurance_provider,
            insurance_plan,
            primary_physician,
            blood_type,
            height_cm,
            weight_kg,
            bmi,
            smoking_status,
            chronic_conditions,
            allergies,
            medications_current,
            last_visit_date,
            next_appointment_date,
            risk_score,
            emergency_contact_name: provider.full_name(rng),
            emergency_contact_phone: provider.phone_number(rng),
        }
    }
}

/// Patient batch with the default model.
pub fn generate_patients(options: &GenerateOptions) -> GenResult<RecordBatch<PatientBuilder>> {
    generate_patients_with(PatientModel::default(), options)
}

pub fn generate_patients_with(
    model: PatientModel,
    options: &GenerateOptions,
) -> GenResult<RecordBatch<PatientBuilder>> {
    RecordBatch::new(PatientBuilder::new(model)?, options)
}
