//! Table discovery and destination DDL.

use anyhow::{bail, Result};
use std::fmt;
use tokio_postgres::GenericClient;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// `"schema"."table"`, safe to splice into SQL.
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Exact `schema.table` include/exclude lists. An absent or empty include
/// list admits everything.
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TableFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include: split_list(include),
            exclude: split_list(exclude),
        }
    }

    pub fn admits(&self, name: &TableName) -> bool {
        let qualified = name.to_string();
        if !self.include.is_empty() && !self.include.contains(&qualified) {
            return false;
        }
        !self.exclude.contains(&qualified)
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_sql: String,
    pub not_null: bool,
}

/// Columns in attribute order, then the primary key in key order. Defaults,
/// indexes and foreign keys are not carried over.
pub fn render_create_table(
    table: &TableName,
    columns: &[ColumnDef],
    primary_key: &[String],
) -> Result<String> {
    if columns.is_empty() {
        bail!("Source table not found or has no columns: {table}");
    }
    let mut defs: Vec<String> = columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quote_ident(&c.name), c.type_sql);
            if c.not_null {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();
    if !primary_key.is_empty() {
        let keys: Vec<String> = primary_key.iter().map(|k| quote_ident(k)).collect();
        defs.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }
    Ok(format!(
        "CREATE TABLE {} (\n  {}\n)",
        table.quoted(),
        defs.join(",\n  ")
    ))
}

const LIST_TABLES: &str = "
    SELECT table_schema::text, table_name::text
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
      AND table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY table_schema, table_name";

const TABLE_EXISTS: &str = "
    SELECT 1
    FROM information_schema.tables
    WHERE table_schema = $1 AND table_name = $2 AND table_type = 'BASE TABLE'";

const COLUMNS: &str = "
    SELECT a.attname::text,
           pg_catalog.format_type(a.atttypid, a.atttypmod),
           a.attnotnull
    FROM pg_attribute a
    JOIN pg_class c ON a.attrelid = c.oid
    JOIN pg_namespace n ON c.relnamespace = n.oid
    WHERE c.relkind = 'r'
      AND n.nspname = $1
      AND c.relname = $2
      AND a.attnum > 0
      AND NOT a.attisdropped
    ORDER BY a.attnum";

const PRIMARY_KEY: &str = "
    SELECT a.attname::text
    FROM pg_index i
    JOIN pg_class c ON c.oid = i.indrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    JOIN LATERAL unnest(i.indkey) WITH ORDINALITY AS u(attnum, ord) ON TRUE
    JOIN pg_attribute a ON a.attrelid = c.oid AND a.attnum = u.attnum
    WHERE i.indisprimary AND n.nspname = $1 AND c.relname = $2
    ORDER BY u.ord";

pub async fn list_tables<C: GenericClient>(client: &C) -> Result<Vec<TableName>> {
    let rows = client.query(LIST_TABLES, &[]).await?;
    Ok(rows
        .iter()
        .map(|row| TableName::new(row.get::<_, String>(0), row.get::<_, String>(1)))
        .collect())
}

pub async fn table_exists<C: GenericClient>(client: &C, table: &TableName) -> Result<bool> {
    let row = client
        .query_opt(TABLE_EXISTS, &[&table.schema, &table.table])
        .await?;
    Ok(row.is_some())
}

pub async fn columns<C: GenericClient>(client: &C, table: &TableName) -> Result<Vec<ColumnDef>> {
    let rows = client.query(COLUMNS, &[&table.schema, &table.table]).await?;
    Ok(rows
        .iter()
        .map(|row| ColumnDef {
            name: row.get(0),
            type_sql: row.get(1),
            not_null: row.get(2),
        })
        .collect())
}

pub async fn primary_key<C: GenericClient>(client: &C, table: &TableName) -> Result<Vec<String>> {
    let rows = client
        .query(PRIMARY_KEY, &[&table.schema, &table.table])
        .await?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Create the destination schema, and the table if it is missing, from the
/// source definition.
pub async fn ensure_table<S, D>(src: &S, dst: &D, table: &TableName) -> Result<()>
where
    S: GenericClient,
    D: GenericClient,
{
    dst.batch_execute(&format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        quote_ident(&table.schema)
    ))
    .await?;
    if table_exists(dst, table).await? {
        return Ok(());
    }

    let cols = columns(src, table).await?;
    let pk = primary_key(src, table).await?;
    let ddl = render_create_table(table, &cols, &pk)?;
    log::debug!("creating {table}:\n{ddl}");
    dst.batch_execute(&ddl).await?;
    Ok(())
}
