//! Configuration loading from files.
//!
//! The YAML file is layered under environment overrides of the form
//! `LETTERPRESS__BUDGET__HARD_LIMIT=80000`.

use std::path::{Path, PathBuf};

use ::config::{Environment, File, FileFormat};

use super::{Config, ConfigError};

/// Config file name looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "letterpress.yaml";

const ENV_PREFIX: &str = "LETTERPRESS";

impl Config {
    /// Resolve the config file path from the command line argument,
    /// defaulting to `letterpress.yaml` in the current directory.
    pub fn path_from_arg(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        if config_file.is_relative() {
            Ok(std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file))
        } else {
            Ok(config_file.to_path_buf())
        }
    }

    /// Load the config from the command line argument, defaulting to `letterpress.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::path_from_arg(config_file)?;
        Self::load_from_file(&path)
    }

    /// Load the config from a file path, applying environment overrides.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = ::config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
