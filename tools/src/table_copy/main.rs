//! pg-table-copy: copy PostgreSQL tables from one database to another.
//!
//! Usage:
//!   pg-table-copy --src-host a --src-db crm --dst-host b --dst-db crm_copy
//!   SRC_PGHOST=a DST_PGHOST=b pg-table-copy --include public.customers --truncate

mod catalog;
mod dsn;
mod transfer;

use anyhow::{Context, Result};
use catalog::{TableFilter, TableName};
use clap::Parser;
use dsn::{DestinationArgs, Endpoint, SourceArgs};
use std::process::ExitCode;
use tokio_postgres::{Client, NoTls};
use transfer::{run_copy, CopyOptions};

#[derive(Parser, Debug)]
#[command(name = "pg-table-copy")]
#[command(version)]
#[command(about = "Copy PostgreSQL tables from one DB to another", long_about = None)]
struct Cli {
    #[command(flatten)]
    src: SourceArgs,

    #[command(flatten)]
    dst: DestinationArgs,

    /// Comma-separated list of schema.table names to copy
    #[arg(long)]
    include: Option<String>,

    /// Comma-separated list of schema.table names to skip
    #[arg(long)]
    exclude: Option<String>,

    /// Do not create destination tables if missing
    #[arg(long)]
    no_create: bool,

    /// Truncate destination tables before copy
    #[arg(long)]
    truncate: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(copied) => {
            print!("{}", report(&copied));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<Vec<TableName>> {
    let src = Endpoint::from(cli.src);
    let dst = Endpoint::from(cli.dst);
    let filter = TableFilter::new(cli.include.as_deref(), cli.exclude.as_deref());
    let options = CopyOptions {
        create: !cli.no_create,
        truncate: cli.truncate,
    };

    let src_client = connect(&src).await.context("connecting to source")?;
    let mut dst_client = connect(&dst).await.context("connecting to destination")?;
    run_copy(&src_client, &mut dst_client, &filter, options).await
}

async fn connect(endpoint: &Endpoint) -> Result<Client> {
    log::info!("connecting to {}", endpoint.describe());
    let (client, connection) = tokio_postgres::connect(&endpoint.conn_string(), NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("PostgreSQL connection error: {e}");
        }
    });
    Ok(client)
}

fn report(copied: &[TableName]) -> String {
    if copied.is_empty() {
        return "No tables matched the criteria.\n".to_string();
    }
    let mut out = String::from("Copied tables:\n");
    for table in copied {
        out.push_str(&format!(" - {table}\n"));
    }
    out
}
