//! Configuration for the listings service
//!
//! Layered with figment: built-in defaults, then an optional YAML file, then
//! `HBNB_*` environment variables.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `HBNB_TYPE_STORAGE=db`
pub const ENV_PREFIX: &str = "HBNB_";

/// Keys whose environment values are taken verbatim. The generic env provider
/// would read a password such as `007` as the integer 7.
const VERBATIM_ENV_KEYS: &[&str] = &["database_url", "mysql_user", "mysql_pwd", "mysql_db"];

const DEFAULT_DATABASE_URL: &str = "sqlite://hbnb.db?mode=rwc";

/// Which storage engine to open
///
/// `"db"` selects the relational engine; any other value selects the file engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageType {
    #[default]
    File,
    Db,
}

impl From<String> for StorageType {
    fn from(value: String) -> Self {
        if value == "db" {
            Self::Db
        } else {
            Self::File
        }
    }
}

impl From<StorageType> for String {
    fn from(value: StorageType) -> Self {
        match value {
            StorageType::File => "file".to_string(),
            StorageType::Db => "db".to_string(),
        }
    }
}

/// Listings service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub type_storage: StorageType,

    /// JSON document used by the file engine
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Full database URL. Takes precedence over the `mysql_*` parts.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub database_url: Option<String>,

    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub mysql_user: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub mysql_pwd: Option<String>,
    #[serde(default = "default_mysql_host")]
    pub mysql_host: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub mysql_db: Option<String>,

    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            type_storage: StorageType::default(),
            file_path: default_file_path(),
            database_url: None,
            mysql_user: None,
            mysql_pwd: None,
            mysql_host: default_mysql_host(),
            mysql_db: None,
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}

impl Config {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(VERBATIM_ENV_KEYS))
            .merge(Serialized::defaults(verbatim_env()))
            .extract()
    }

    /// URL of the relational database.
    ///
    /// An explicit `database_url` wins; otherwise a MySQL URL is assembled when
    /// `mysql_db` is set; otherwise a local SQLite file is used.
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        match &self.mysql_db {
            Some(db) => format!(
                "mysql://{}:{}@{}/{}",
                urlencoding::encode(self.mysql_user.as_deref().unwrap_or_default()),
                urlencoding::encode(self.mysql_pwd.as_deref().unwrap_or_default()),
                self.mysql_host,
                urlencoding::encode(db)
            ),
            None => DEFAULT_DATABASE_URL.to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn verbatim_env() -> BTreeMap<&'static str, String> {
    VERBATIM_ENV_KEYS
        .iter()
        .filter_map(|key| {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            std::env::var(var).ok().map(|value| (*key, value))
        })
        .collect()
}

/// Accept bare numbers for string settings, e.g. `mysql_pwd: 12345` in YAML.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

fn default_file_path() -> PathBuf {
    PathBuf::from("file.json")
}

fn default_mysql_host() -> String {
    "localhost".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5000
}
