//! Optional YAML settings file.
//!
//! Resolution order for every value is CLI flag, then settings file, then the
//! built-in default.

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{cli::CompatMode, fetch::ECS_CSV_URL};

pub const DEFAULT_CACHE: &str = "data/Elastic/ecs.csv";
pub const DEFAULT_SCRATCH: &str = "data/Elastic/ecs-tempfile.csv";
pub const DEFAULT_OUTPUT: &str = "data/Elastic/DDL-ecs.sql";
pub const DEFAULT_SCHEMA_NAME: &str = "ecs";
pub const DEFAULT_TABLE_NAME: &str = "elastic_log_schema";
pub const DEFAULT_TABLE_OWNER: &str = "postgres";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub url: Option<String>,
    pub cache: Option<PathBuf>,
    pub scratch: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub owner: Option<String>,
    pub compat: Option<CompatMode>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader).context("Parsing settings YAML")?;
        Ok(settings)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn url(&self, flag: Option<&str>) -> String {
        pick(flag, self.url.as_deref(), ECS_CSV_URL)
    }

    pub fn cache(&self, flag: Option<&Path>) -> PathBuf {
        pick_path(flag, self.cache.as_deref(), DEFAULT_CACHE)
    }

    pub fn scratch(&self, flag: Option<&Path>) -> PathBuf {
        pick_path(flag, self.scratch.as_deref(), DEFAULT_SCRATCH)
    }

    pub fn output(&self, flag: Option<&Path>) -> PathBuf {
        pick_path(flag, self.output.as_deref(), DEFAULT_OUTPUT)
    }

    pub fn schema(&self, flag: Option<&str>) -> String {
        pick(flag, self.schema.as_deref(), DEFAULT_SCHEMA_NAME)
    }

    pub fn table(&self, flag: Option<&str>) -> String {
        pick(flag, self.table.as_deref(), DEFAULT_TABLE_NAME)
    }

    pub fn owner(&self, flag: Option<&str>) -> String {
        pick(flag, self.owner.as_deref(), DEFAULT_TABLE_OWNER)
    }

    pub fn compat(&self, flag: Option<CompatMode>) -> CompatMode {
        flag.or(self.compat).unwrap_or_default()
    }
}

fn pick(flag: Option<&str>, file: Option<&str>, default: &str) -> String {
    flag.or(file).unwrap_or(default).to_string()
}

fn pick_path(flag: Option<&Path>, file: Option<&Path>, default: &str) -> PathBuf {
    flag.or(file)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values_which_override_defaults() {
        let settings: Settings =
            serde_yaml::from_str("table: from_file\ncompat: legacy\n").expect("parse settings");
        assert_eq!(settings.table(Some("from_flag")), "from_flag");
        assert_eq!(settings.table(None), "from_file");
        assert_eq!(settings.schema(None), DEFAULT_SCHEMA_NAME);
        assert_eq!(settings.compat(None), CompatMode::Legacy);
        assert_eq!(settings.compat(Some(CompatMode::Strict)), CompatMode::Strict);
        assert_eq!(settings.cache(None), PathBuf::from(DEFAULT_CACHE));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_yaml::from_str::<Settings>("tabel: typo\n").unwrap_err();
        assert!(err.to_string().contains("tabel"));
    }
}
