use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::query::{MatchMode, Mode};
use crate::records::DateFormat;

/// User preferences, loaded from an optional YAML file. Everything here is
/// a default the command line can override per invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Combination mode when the query carries no `&`/`&&` prefix.
    #[serde(default)]
    pub logic_mode: Mode,

    /// Per-word match behavior: contains, starts or exact.
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Locale used when rendering date values in table output.
    #[serde(default)]
    pub date_format: DateFormat,

    /// Columns excluded from the default active set.
    #[serde(default)]
    pub hidden_columns: Vec<String>,
}

impl Config {
    /// Missing path means defaults; a named file must parse.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_yml::from_str(&raw)
            .with_context(|| format!("config {} is malformed", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.logic_mode, Mode::Or);
        assert_eq!(config.match_mode, MatchMode::Contains);
        assert_eq!(config.date_format, DateFormat::Fr);
        assert!(config.hidden_columns.is_empty());
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "logic_mode: and").unwrap();
        writeln!(f, "match_mode: starts").unwrap();
        writeln!(f, "date_format: iso").unwrap();
        writeln!(f, "hidden_columns: [Interne]").unwrap();
        drop(f);

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.logic_mode, Mode::And);
        assert_eq!(config.match_mode, MatchMode::Starts);
        assert_eq!(config.date_format, DateFormat::Iso);
        assert_eq!(config.hidden_columns, vec!["Interne".to_string()]);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logic_mode: and-per-column\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.logic_mode, Mode::AndPerColumn);
        assert_eq!(config.match_mode, MatchMode::Contains);
    }

    #[test]
    fn test_malformed_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logic_mode: [nonsense\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
