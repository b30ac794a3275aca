//! Locale-aware names, addresses and contact details.
//!
//! All draws come from the caller's SampleRng, so a seeded batch gets the
//! same names back on every run.

use crate::{rng::SampleRng, types::Locale};
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StateAbbr, StreetName};
use fake::faker::internet::raw::FreeEmailProvider;
use fake::faker::name::raw::{FirstName, LastName};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{EN, FR_FR, ZH_CN, ZH_TW};
use fake::Fake;

/// Source of the opaque identity strings on a record.
pub trait ProfileProvider {
    fn first_name(&self, rng: &mut SampleRng) -> String;
    fn last_name(&self, rng: &mut SampleRng) -> String;
    fn street_address(&self, rng: &mut SampleRng) -> String;
    fn city(&self, rng: &mut SampleRng) -> String;
    fn state_abbr(&self, rng: &mut SampleRng) -> String;
    fn postal_code(&self, rng: &mut SampleRng) -> String;
    fn country(&self) -> String;
    fn phone_number(&self, rng: &mut SampleRng) -> String;
    fn free_email_domain(&self, rng: &mut SampleRng) -> String;

    /// "First Last", two independent draws.
    fn full_name(&self, rng: &mut SampleRng) -> String {
        let first = self.first_name(rng);
        let last = self.last_name(rng);
        format!("{first} {last}")
    }
}

/// Run one raw `fake` faker in the data set of `locale`.
macro_rules! fake_in {
    ($locale:expr, $faker:ident, $rng:expr) => {
        match $locale {
            Locale::EnUs => $faker(EN).fake_with_rng::<String, _>($rng),
            Locale::FrFr => $faker(FR_FR).fake_with_rng::<String, _>($rng),
            Locale::ZhCn => $faker(ZH_CN).fake_with_rng::<String, _>($rng),
            Locale::ZhTw => $faker(ZH_TW).fake_with_rng::<String, _>($rng),
        }
    };
}

/// ProfileProvider backed by the `fake` crate's locale tables.
#[derive(Debug, Clone, Copy)]
pub struct FakeProvider {
    locale: Locale,
}

impl FakeProvider {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl ProfileProvider for FakeProvider {
    fn first_name(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, FirstName, rng)
    }

    fn last_name(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, LastName, rng)
    }

    fn street_address(&self, rng: &mut SampleRng) -> String {
        let number = fake_in!(self.locale, BuildingNumber, rng);
        let street = fake_in!(self.locale, StreetName, rng);
        format!("{number} {street}").replace('\n', ", ")
    }

    fn city(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, CityName, rng)
    }

    fn state_abbr(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, StateAbbr, rng)
    }

    fn postal_code(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, PostCode, rng)
    }

    fn country(&self) -> String {
        self.locale.country().to_string()
    }

    fn phone_number(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, PhoneNumber, rng)
    }

    fn free_email_domain(&self, rng: &mut SampleRng) -> String {
        fake_in!(self.locale, FreeEmailProvider, rng)
    }
}

/// `first.last@domain`, lowercased, apostrophes stripped.
pub fn compose_email(first: &str, last: &str, domain: &str) -> String {
    format!(
        "{}.{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        domain
    )
    .replace('\'', "")
}
