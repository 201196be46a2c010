use std::path::PathBuf;

use chrono::NaiveDate;

use crate::engine::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreKind,
    pub data_dir: PathBuf,
    pub storage_key: String,
    /// Overrides the local date used for "not in the past" checks.
    pub today: Option<NaiveDate>,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::File,
            data_dir: PathBuf::from("./data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            today: None,
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Unparsable optional values
    /// are ignored; an unknown store kind is an error.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();

        let store = match var("PLAYSLOT_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("file") => StoreKind::File,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(format!("unknown PLAYSLOT_STORE: {other} (expected file or memory)")),
        };
        let data_dir = var("PLAYSLOT_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);
        let storage_key = var("PLAYSLOT_STORAGE_KEY")
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(defaults.storage_key);
        let today = var("PLAYSLOT_TODAY")
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
        let metrics_port: Option<u16> = var("PLAYSLOT_METRICS_PORT").and_then(|s| s.parse().ok());

        Ok(Self {
            store,
            data_dir,
            storage_key,
            today,
            metrics_port,
        })
    }
}
