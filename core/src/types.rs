//! Shared primitive types used across generation.

use crate::error::GenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A generation seed. Same seed, same batch.
pub type Seed = i64;

/// Zero-based position of a record inside its batch.
pub type RecordIndex = u64;

/// Locales the fake-data provider carries data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    EnUs,
    FrFr,
    ZhCn,
    ZhTw,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::EnUs, Locale::FrFr, Locale::ZhCn, Locale::ZhTw];

    pub fn code(&self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::FrFr => "fr_FR",
            Self::ZhCn => "zh_CN",
            Self::ZhTw => "zh_TW",
        }
    }

    /// The locale's own country, used for the `country` column.
    pub fn country(&self) -> &'static str {
        match self {
            Self::EnUs => "United States",
            Self::FrFr => "France",
            Self::ZhCn => "China",
            Self::ZhTw => "Taiwan",
        }
    }

    pub fn supported_codes() -> String {
        Self::ALL
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Locale {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "en" | "en_us" => Ok(Self::EnUs),
            "fr" | "fr_fr" => Ok(Self::FrFr),
            "zh_cn" => Ok(Self::ZhCn),
            "zh_tw" => Ok(Self::ZhTw),
            _ => Err(GenError::UnsupportedLocale {
                locale: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Patient smoking history. Order matches `PatientModel::smoking_weights`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingStatus {
    Never,
    Former,
    Current,
}

impl SmokingStatus {
    pub const ALL: [SmokingStatus; 3] = [Self::Never, Self::Former, Self::Current];
}
