//! Runtime configuration.
//!
//! Sources are merged in order, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file: the explicit path if given, else `./churn.toml`, else
//!    `<config dir>/churn/churn.toml`
//! 3. `CHURN_*` environment variables
//!
//! Command-line flags are applied on top by the binary.

use crate::error::{Error, Result};
use churn_scoring::DEFAULT_THRESHOLD;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides, e.g. `CHURN_THRESHOLD=0.4`.
pub const ENV_PREFIX: &str = "CHURN_";

/// File name searched in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "churn.toml";

/// Paths to the fitted artifacts and the decision threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// Encoder registry JSON
    pub registry_path: PathBuf,
    /// Classifier artifact JSON
    pub model_path: PathBuf,
    /// Probability at or above which a record is labelled churn
    pub threshold: f64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("registry.json"),
            model_path: PathBuf::from("model.json"),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ChurnConfig {
    /// Load and validate configuration from all sources.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit
            && !path.is_file()
        {
            return Err(Error::InvalidConfig(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// The merged provider chain, exposed for callers that layer more sources.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = explicit.map(Path::to_path_buf).or_else(Self::discover) {
            debug!(path = %path.display(), "Reading config file");
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// First existing config file among the implicit locations.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        Self::user_config_path().filter(|path| path.is_file())
    }

    /// `<config dir>/churn/churn.toml` for the current user.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("churn").join(CONFIG_FILE_NAME))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = ChurnConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
                registry_path = "artifacts/registry.json"
                threshold = 0.3
                "#,
            )?;
            let config = ChurnConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.registry_path, PathBuf::from("artifacts/registry.json"));
            assert_eq!(config.model_path, PathBuf::from("model.json"));
            assert_eq!(config.threshold, 0.3);

            jail.set_env("CHURN_THRESHOLD", "0.7");
            jail.set_env("CHURN_MODEL_PATH", "artifacts/model.json");
            let config = ChurnConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.threshold, 0.7);
            assert_eq!(config.model_path, PathBuf::from("artifacts/model.json"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "threshold = 0.2")?;
            jail.create_file("other.toml", "threshold = 0.9")?;
            let config =
                ChurnConfig::load(Some(Path::new("other.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.threshold, 0.9);

            let missing = ChurnConfig::load(Some(Path::new("missing.toml")));
            assert!(matches!(missing, Err(Error::InvalidConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn test_threshold_out_of_range() {
        Jail::expect_with(|jail| {
            jail.set_env("CHURN_THRESHOLD", "1.5");
            assert!(matches!(
                ChurnConfig::load(None),
                Err(Error::InvalidConfig(_))
            ));
            Ok(())
        });
    }
}
