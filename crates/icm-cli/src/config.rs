//! Configuration loading.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use icm_core::MinerConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub miner: MinerConfig,
}

impl Config {
    /// Loads configuration from the default location, then `config_path`, then
    /// `ICM_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ICM_MINER__LAMBDA -> miner.lambda
        figment = figment.merge(Env::prefixed("ICM_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for icm.
///
/// On Linux: `~/.config/icm`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("icm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_icm() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "icm");
    }

    #[test]
    fn test_default_config_matches_miner_defaults() {
        let config = Config::default();
        assert_eq!(config.miner, MinerConfig::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("icm.toml");
        std::fs::write(
            &path,
            "[miner]\ncontext_prefix_size = 42\nsequence_threshold = 0.3\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.miner.context_prefix_size, 42);
        assert!((config.miner.sequence_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.miner.max_traces, MinerConfig::default().max_traces);
    }
}
