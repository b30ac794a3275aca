//! File-level operations: one entity to one CSV, or both entities into a
//! directory.

use crate::{
    batch::GenerateOptions,
    config::ModelConfig,
    customer::generate_customers_with,
    error::GenResult,
    patient::generate_patients_with,
    sink::write_csv,
};
use std::path::{Path, PathBuf};

pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const PATIENTS_FILE: &str = "patients.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub entity: &'static str,
    pub path: PathBuf,
    pub rows: u64,
}

/// Generate customers into `path`. Nothing is created on disk if the
/// request or the model is invalid.
pub fn export_customers(
    path: impl AsRef<Path>,
    options: &GenerateOptions,
    model: &ModelConfig,
) -> GenResult<ExportSummary> {
    let path = path.as_ref();
    let batch = generate_customers_with(model.customer.clone(), options)?;
    let entity = batch.entity();
    let rows = write_csv(batch, path)?;
    log::info!(
        "customer export: {rows} rows, seeded={}, locale={}",
        options.seed.is_some(),
        options.locale
    );
    Ok(ExportSummary {
        entity,
        path: path.to_path_buf(),
        rows,
    })
}

/// Generate patients into `path`. Nothing is created on disk if the
/// request or the model is invalid.
pub fn export_patients(
    path: impl AsRef<Path>,
    options: &GenerateOptions,
    model: &ModelConfig,
) -> GenResult<ExportSummary> {
    let path = path.as_ref();
    let batch = generate_patients_with(model.patient.clone(), options)?;
    let entity = batch.entity();
    let rows = write_csv(batch, path)?;
    log::info!(
        "patient export: {rows} rows, seeded={}, locale={}",
        options.seed.is_some(),
        options.locale
    );
    Ok(ExportSummary {
        entity,
        path: path.to_path_buf(),
        rows,
    })
}

/// `<dir>/<prefix>customers.csv` and `<dir>/<prefix>patients.csv`, same
/// count, seed, locale and clock for both.
pub fn export_both(
    dir: impl AsRef<Path>,
    prefix: &str,
    options: &GenerateOptions,
    model: &ModelConfig,
) -> GenResult<[ExportSummary; 2]> {
    let dir = dir.as_ref();
    options.validated_count()?;
    model.validate()?;
    std::fs::create_dir_all(dir)?;

    let customers_path = dir.join(format!("{prefix}{CUSTOMERS_FILE}"));
    let patients_path = dir.join(format!("{prefix}{PATIENTS_FILE}"));
    let customers = export_customers(customers_path, options, model)?;
    let patients = export_patients(patients_path, options, model)?;
    Ok([customers, patients])
}
