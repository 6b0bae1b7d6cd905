//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default location for the configuration file of `proximity`.
//! This is a configuration file/struct neutral loading engine, storing only the base directory
//! and with `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.inner_mut()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use eyre::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, trace};

use crate::makepath;

/// Config filename
const CONFIG: &str = "proximity.hcl";

/// Main name for the directory base
const TAG: &str = "proximity";

/// Custom error type for configuration loading.
///
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bad file version {found}, expected {expected}")]
    BadFileVersion { found: usize, expected: usize },
    #[error("Unknown config file {0:?} and no default in {1:?}")]
    MissingConfig(PathBuf, PathBuf),
    #[error("No HOME variable defined, can not continue")]
    NoHome,
}

/// Every configuration file carries a `version` field, this is checked at load time.
///
pub trait Versioned {
    /// Version this build understands
    const VERSION: usize;

    /// Version found in the file
    fn version(&self) -> usize;
}

/// Generic configuration file holder.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    /// Path of the loaded file
    fname: PathBuf,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned,
{
    /// Find the base directory for `tag`, `$HOME/.config/<tag>` on UNIX systems.
    ///
    #[tracing::instrument]
    pub fn basedir(tag: &str) -> Result<PathBuf> {
        let base = match BaseDirs::new() {
            Some(base) => {
                #[cfg(unix)]
                let base = base.home_dir().join(".config");

                #[cfg(windows)]
                let base = base.data_local_dir().to_path_buf();

                base
            }
            None => {
                let homedir = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
                makepath!(homedir, ".config")
            }
        };
        debug!("base = {base:?}");
        Ok(makepath!(base, tag))
    }

    /// Returns the path of the default config file
    ///
    #[tracing::instrument]
    pub fn default_file() -> Result<PathBuf> {
        let cfg = Self::basedir(TAG)?.join(CONFIG);
        debug!("default = {cfg:?}");
        Ok(cfg)
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (base on $HOME or $LOCALAPPDATA)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let default = Self::default_file()?;

        let fname = match fname {
            Some(fname) => fname.to_path_buf(),
            None => default.clone(),
        };

        // Use a full path
        //
        let fname = if fname.exists() {
            fname.canonicalize()?
        } else {
            return Err(ConfigError::MissingConfig(fname, default).into());
        };

        trace!("Loading config file {fname:?}");
        let data = fs::read_to_string(&fname)?;
        let inner = Self::parse(&data)?;

        Ok(ConfigFile {
            tag: TAG.to_string(),
            basedir: Self::basedir(TAG)?,
            fname,
            inner,
        })
    }

    /// Parse and check the configuration from an HCL string.
    ///
    pub fn parse(data: &str) -> Result<T> {
        let data: T = hcl::from_str(data)?;
        debug!("struct data = {data:?}");

        if data.version() != T::VERSION {
            return Err(ConfigError::BadFileVersion {
                found: data.version(),
                expected: T::VERSION,
            }
            .into());
        }
        Ok(data)
    }

    /// Returns the path of the default config directory
    ///
    pub fn config_path(&self) -> &Path {
        &self.basedir
    }

    /// Returns the file we loaded
    ///
    pub fn file(&self) -> &Path {
        &self.fname
    }

    /// Return the project tag
    ///
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Return the inner configuration file as putable
    ///
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the holder
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Deserialize a `humantime` string like "10s" or "24h" into a `Duration`.
///
/// Use as `#[serde(deserialize_with = "proximity_common::human_duration")]`.
///
pub fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}
