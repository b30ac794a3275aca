//! Synthetic customer and patient records with correlated, distribution-shaped
//! attributes, written to CSV.
//!
//! A batch is `count` records built in index order from one random stream.
//! With a seed (and a pinned ReferenceClock) a batch is bit-identical
//! across runs; without one, identifiers are random v4 UUIDs and nothing is
//! reproducible.

pub mod batch;
pub mod clock;
pub mod config;
pub mod customer;
pub mod error;
pub mod export;
pub mod identity;
pub mod patient;
pub mod provider;
pub mod record;
pub mod rng;
pub mod sampler;
pub mod sink;
pub mod types;

pub use batch::{GenerateOptions, RecordBatch, RecordBuilder};
pub use clock::ReferenceClock;
pub use config::ModelConfig;
pub use customer::{generate_customers, CustomerBuilder, CustomerRecord};
pub use error::{GenError, GenResult};
pub use export::{export_both, export_customers, export_patients, ExportSummary};
pub use patient::{generate_patients, PatientBuilder, PatientRecord};
pub use record::TabularRecord;
pub use sink::write_csv;
pub use types::{Locale, SmokingStatus};
