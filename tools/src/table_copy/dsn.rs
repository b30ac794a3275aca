//! Connection-string rendering for one endpoint.

use clap::Args;

/// One side of the copy. Empty fields are left out of the rendered string
/// so libpq-style defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
}

impl Endpoint {
    /// `key=value` pairs separated by spaces.
    pub fn conn_string(&self) -> String {
        [
            ("host", &self.host),
            ("port", &self.port),
            ("user", &self.user),
            ("password", &self.password),
            ("dbname", &self.dbname),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", quote_value(v)))
        })
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// For logs: everything but the password.
    pub fn describe(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user.as_deref().unwrap_or("-"),
            self.host.as_deref().unwrap_or("localhost"),
            self.port.as_deref().unwrap_or("5432"),
            self.dbname.as_deref().unwrap_or("-"),
        )
    }
}

fn quote_value(value: &str) -> String {
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '\'' || c == '\\')
    {
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        format!("'{escaped}'")
    } else {
        value.to_string()
    }
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    #[arg(long = "src-host", env = "SRC_PGHOST")]
    src_host: Option<String>,
    #[arg(long = "src-port", env = "SRC_PGPORT", default_value = "5432")]
    src_port: String,
    #[arg(long = "src-user", env = "SRC_PGUSER")]
    src_user: Option<String>,
    #[arg(long = "src-password", env = "SRC_PGPASSWORD", hide_env_values = true)]
    src_password: Option<String>,
    #[arg(long = "src-db", env = "SRC_PGDATABASE")]
    src_dbname: Option<String>,
}

#[derive(Args, Debug)]
pub struct DestinationArgs {
    #[arg(long = "dst-host", env = "DST_PGHOST")]
    dst_host: Option<String>,
    #[arg(long = "dst-port", env = "DST_PGPORT", default_value = "5432")]
    dst_port: String,
    #[arg(long = "dst-user", env = "DST_PGUSER")]
    dst_user: Option<String>,
    #[arg(long = "dst-password", env = "DST_PGPASSWORD", hide_env_values = true)]
    dst_password: Option<String>,
    #[arg(long = "dst-db", env = "DST_PGDATABASE")]
    dst_dbname: Option<String>,
}

impl From<SourceArgs> for Endpoint {
    fn from(a: SourceArgs) -> Self {
        Endpoint {
            host: a.src_host,
            port: Some(a.src_port),
            user: a.src_user,
            password: a.src_password,
            dbname: a.src_dbname,
        }
    }
}

impl From<DestinationArgs> for Endpoint {
    fn from(a: DestinationArgs) -> Self {
        Endpoint {
            host: a.dst_host,
            port: Some(a.dst_port),
            user: a.dst_user,
            password: a.dst_password,
            dbname: a.dst_dbname,
        }
    }
}
