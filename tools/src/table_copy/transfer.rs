//! Binary COPY from source to destination.

use crate::catalog::{ensure_table, list_tables, TableFilter, TableName};
use anyhow::Result;
use futures::{pin_mut, SinkExt, TryStreamExt};
use tokio_postgres::{Client, Transaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    pub create: bool,
    pub truncate: bool,
}

pub fn copy_out_sql(table: &TableName) -> String {
    format!("COPY {} TO STDOUT WITH (FORMAT binary)", table.quoted())
}

pub fn copy_in_sql(table: &TableName) -> String {
    format!("COPY {} FROM STDIN WITH (FORMAT binary)", table.quoted())
}

/// Stream one table. Returns the number of rows the destination accepted.
pub async fn copy_table(
    src: &Client,
    dst: &Transaction<'_>,
    table: &TableName,
    options: CopyOptions,
) -> Result<u64> {
    if options.create {
        ensure_table(src, dst, table).await?;
    }
    if options.truncate {
        dst.batch_execute(&format!("TRUNCATE TABLE {}", table.quoted()))
            .await?;
    }

    let stream = src.copy_out(copy_out_sql(table).as_str()).await?;
    let sink = dst.copy_in(copy_in_sql(table).as_str()).await?;
    pin_mut!(stream);
    pin_mut!(sink);

    let mut bytes = 0usize;
    while let Some(chunk) = stream.try_next().await? {
        bytes += chunk.len();
        sink.send(chunk).await?;
    }
    let rows = sink.as_mut().finish().await?;
    log::info!("copied {table}: {rows} rows, {bytes} bytes");
    Ok(rows)
}

/// Copy every admitted table inside one destination transaction, committed
/// after the last table. Returns the tables copied, in catalog order.
pub async fn run_copy(
    src: &Client,
    dst: &mut Client,
    filter: &TableFilter,
    options: CopyOptions,
) -> Result<Vec<TableName>> {
    let tables = list_tables(src).await?;
    log::debug!("source has {} base tables", tables.len());

    let tx = dst.transaction().await?;
    let mut copied = Vec::new();
    for table in tables.into_iter().filter(|t| filter.admits(t)) {
        copy_table(src, &tx, &table, options).await?;
        copied.push(table);
    }
    tx.commit().await?;
    Ok(copied)
}
