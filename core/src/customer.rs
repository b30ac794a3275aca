//! Customer profiles.
//!
//! Fields are drawn in dependency order: later fields may read earlier
//! ones, never the reverse.
//!   1. date of birth
//!   2. signup, then last login and the activity flag it implies
//!   3. lifetime value, segment, referral source, credit score
//!   4. churn risk (from activity, segment and lifetime value)
//!   5. identity and contact details from the provider
//!   6. marketing opt-in

use crate::{
    batch::{GenerateOptions, RecordBatch, RecordBuilder},
    clock::ReferenceClock,
    config::CustomerModel,
    error::GenResult,
    provider::{compose_email, ProfileProvider},
    record::TabularRecord,
    rng::{SampleRng, StreamSlot},
    sampler::{
        lifetime_value_distribution, sample_churn_risk, sample_credit_score,
        sample_date_between, sample_datetime_between, sample_lifetime_value, ClippedNormal,
        WeightedChoice,
    },
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand_distr::Gamma;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub date_of_birth: NaiveDate,
    pub signup_date: NaiveDateTime,
    pub last_login: NaiveDateTime,
    pub is_active: bool,
    pub lifetime_value: f64,
    pub segment: String,
    pub marketing_opt_in: bool,
    pub referral_source: String,
    pub credit_score: i64,
    pub churn_risk_score: f64,
}

impl TabularRecord for CustomerRecord {
    const FIELDS: &'static [&'static str] = &[
        "customer_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "street_address",
        "city",
        "state",
        "postal_code",
        "country",
        "date_of_birth",
        "signup_date",
        "last_login",
        "is_active",
        "lifetime_value",
        "segment",
        "marketing_opt_in",
        "referral_source",
        "credit_score",
        "churn_risk_score",
    ];

    fn record_id(&self) -> Uuid {
        self.customer_id
    }
}

pub struct CustomerBuilder {
    model: CustomerModel,
    segments: WeightedChoice<String>,
    lifetime_value: Gamma<f64>,
    credit_score: ClippedNormal,
}

impl CustomerBuilder {
    pub fn new(model: CustomerModel) -> GenResult<Self> {
        model.validate()?;
        let segments = WeightedChoice::new(model.segments.clone(), &model.segment_weights)?;
        let lifetime_value =
            lifetime_value_distribution(model.lifetime_value_shape, model.lifetime_value_scale)?;
        let credit_score = ClippedNormal::new(&model.credit_score)?;
        Ok(Self {
            model,
            segments,
            lifetime_value,
            credit_score,
        })
    }
}

impl RecordBuilder for CustomerBuilder {
    type Record = CustomerRecord;

    const ENTITY: &'static str = "customer";
    const STREAM: StreamSlot = StreamSlot::Customer;

    fn build<P: ProfileProvider>(
        &self,
        id: Uuid,
        provider: &P,
        rng: &mut SampleRng,
        clock: &ReferenceClock,
    ) -> CustomerRecord {
        let m = &self.model;
        let now = clock.now();

        let date_of_birth = sample_date_between(rng, m.birth_date_start, m.birth_date_end);

        let signup_start = now - Duration::days(m.signup_lookback_days);
        let signup_date = sample_datetime_between(rng, signup_start, now);
        // Active customers log in any time after signup; inactive ones
        // stopped within a few hours of signing up.
        let (last_login, is_active) = if rng.chance(m.active_probability) {
            (sample_datetime_between(rng, signup_date, now), true)
        } else {
            let hours = rng.int_inclusive(0, m.inactive_login_max_hours);
            (signup_date + Duration::hours(hours), false)
        };

        let lifetime_value = sample_lifetime_value(rng, &self.lifetime_value);
        let segment = self.segments.sample(rng).clone();
        let referral_source = rng.pick(&m.referral_sources).clone();
        let credit_score = sample_credit_score(rng, &self.credit_score);
        let churn_risk_score = sample_churn_risk(rng, is_active, &segment, lifetime_value);

        let first_name = provider.first_name(rng);
        let last_name = provider.last_name(rng);
        let domain = provider.free_email_domain(rng);
        let email = compose_email(&first_name, &last_name, &domain);

        CustomerRecord {
            customer_id: id,
            email,
            phone: provider.phone_number(rng),
            street_address: provider.street_address(rng),
            city: provider.city(rng),
            state: provider.state_abbr(rng),
            postal_code: provider.postal_code(rng),
            country: provider.country(),
            first_name,
            last_name,
            date_of_birth,
            signup_date,
            last_login,
            is_active,
            lifetime_value,
            segment,
            marketing_opt_in: rng.chance(m.marketing_opt_in_probability),
            referral_source,
            credit_score,
            churn_risk_score,
        }
    }
}

/// Customer batch with the default model.
pub fn generate_customers(options: &GenerateOptions) -> GenResult<RecordBatch<CustomerBuilder>> {
    generate_customers_with(CustomerModel::default(), options)
}

pub fn generate_customers_with(
    model: CustomerModel,
    options: &GenerateOptions,
) -> GenResult<RecordBatch<CustomerBuilder>> {
    RecordBatch::new(CustomerBuilder::new(model)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FakeProvider;
    use crate::rng::RngBank;
    use crate::types::Locale;
    use chrono::{TimeZone, Utc};

    fn clock() -> ReferenceClock {
        ReferenceClock::fixed(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn serialized_header_matches_declared_fields() {
        let builder = CustomerBuilder::new(CustomerModel::default()).unwrap();
        let mut rng = RngBank::new(1).for_stream(StreamSlot::Customer);
        let record = builder.build(
            Uuid::nil(),
            &FakeProvider::new(Locale::EnUs),
            &mut rng,
            &clock(),
        );

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, CustomerRecord::FIELDS.join(","));
        assert_eq!(CustomerRecord::FIELDS.len(), 20);
    }

    #[test]
    fn record_fields_are_consistent() {
        let builder = CustomerBuilder::new(CustomerModel::default()).unwrap();
        let provider = FakeProvider::new(Locale::EnUs);
        let mut rng = RngBank::new(2).for_stream(StreamSlot::Customer);
        let clock = clock();
        let model = CustomerModel::default();

        for i in 0..500 {
            let c = builder.build(Uuid::from_u128(i), &provider, &mut rng, &clock);
            assert!(c.date_of_birth >= model.birth_date_start);
            assert!(c.date_of_birth <= model.birth_date_end);
            assert!(c.signup_date <= clock.now());
            assert!(c.signup_date >= clock.now() - Duration::days(5 * 365));
            assert!(c.last_login >= c.signup_date);
            if c.is_active {
                assert!(c.last_login <= clock.now());
            } else {
                assert!(c.last_login <= c.signup_date + Duration::hours(72));
            }
            assert!(model.segments.contains(&c.segment));
            assert!(model.referral_sources.contains(&c.referral_source));
            let local = format!("{}.{}@", c.first_name, c.last_name)
                .to_lowercase()
                .replace('\'', "");
            assert!(c.email.starts_with(&local), "{} vs {local}", c.email);
            assert!(!c.email.contains('\''));
            assert_eq!(c.email, c.email.to_lowercase());
            assert_eq!(c.country, "United States");
        }
    }

    #[test]
    fn invalid_model_is_rejected_up_front() {
        let mut model = CustomerModel::default();
        model.lifetime_value_shape = -1.0;
        assert!(CustomerBuilder::new(model).is_err());
    }
}
