//! Configuration of the daemon, loaded through `ConfigFile`.
//!
//! Only `home` and `tracker.url` are mandatory, every other block has defaults.
//!
//! ```hcl
//! version = 1
//! home { lat = 44.117965  lon = 15.234143 }
//! tracker {
//!   url     = "https://api.example.net/tracking/lastLocation"
//!   timeout = "10s"
//!   auth { token_env = "PROXIMITY_TOKEN" }
//! }
//! ```
//!

use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use serde::Deserialize;
use tracing::trace;

use proximity_common::{human_duration, ConfigFile, Coordinate, Versioned};
use proximity_display::{Canvas, DumpPanel, Panel};
use proximity_sources::{Auth, Tracker, DEF_TIMEOUT};

use crate::{DedupPolicy, Layout, Status, DEF_INTERVAL};

/// Current version
const CVERSION: usize = 1;

/// Default session length
const DEF_MAX_DURATION: Duration = Duration::from_secs(24 * 3600);

/// Waveshare 2.13" panel, the one we run on
const DEF_WIDTH: u32 = 250;
const DEF_HEIGHT: u32 = 122;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Usual check for new/old version
    pub version: usize,
    /// Where is home
    pub home: Coordinate,
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub layout: Layout,
    /// Per-run log files go there
    pub log_dir: Option<PathBuf>,
}

impl Versioned for Config {
    const VERSION: usize = CVERSION;

    fn version(&self) -> usize {
        self.version
    }
}

fn def_timeout() -> Duration {
    DEF_TIMEOUT
}

fn def_interval() -> Duration {
    DEF_INTERVAL
}

fn def_max_duration() -> Duration {
    DEF_MAX_DURATION
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrackerConfig {
    pub url: String,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default = "def_timeout", deserialize_with = "human_duration")]
    pub timeout: Duration,
}

impl TrackerConfig {
    /// Resolve the token and get a client.
    ///
    pub fn tracker(&self) -> Result<Tracker> {
        Ok(Tracker::new(&self.url, &self.auth, self.timeout)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    /// Time between polls
    #[serde(default = "def_interval", deserialize_with = "human_duration")]
    pub interval: Duration,
    /// Stop after that
    #[serde(default = "def_max_duration", deserialize_with = "human_duration")]
    pub max_duration: Duration,
    #[serde(default)]
    pub dedup: DedupPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: DEF_INTERVAL,
            max_duration: DEF_MAX_DURATION,
            dedup: DedupPolicy::default(),
        }
    }
}

/// Available panel drivers
///
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PanelDriver {
    /// PNG files in `output`
    #[default]
    Dump,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub driver: PanelDriver,
    /// Background images
    pub assets: PathBuf,
    /// For the `dump` driver
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Panel mounted upside down
    pub rotate: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            driver: PanelDriver::default(),
            assets: PathBuf::from("assets"),
            output: PathBuf::from("frames"),
            width: DEF_WIDTH,
            height: DEF_HEIGHT,
            rotate: true,
        }
    }
}

impl DisplayConfig {
    /// Instantiate the configured driver.
    ///
    #[tracing::instrument]
    pub fn panel(&self) -> Result<Box<dyn Panel>> {
        trace!("panel driver {}", self.driver);
        let panel = match self.driver {
            PanelDriver::Dump => DumpPanel::new(&self.output, self.width, self.height)?,
        };
        Ok(Box::new(panel))
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(&self.assets, self.width, self.height, self.rotate)
    }
}

impl Config {
    /// Load and check the configuration, default file if `fname` is `None`.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<PathBuf>) -> Result<Config> {
        let cfg = ConfigFile::<Config>::load(fname.as_deref())?;
        trace!("loaded {:?}", cfg.file());
        let cfg = cfg.into_inner();
        cfg.check()?;
        Ok(cfg)
    }

    /// Parse from a string, mostly for tests and `check`.
    ///
    pub fn parse(data: &str) -> Result<Config> {
        let cfg = ConfigFile::<Config>::parse(data)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Things serde can not catch.
    ///
    pub fn check(&self) -> Result<(), Status> {
        if self.tracker.url.trim().is_empty() {
            return Err(Status::NoTrackerUrl);
        }
        let (lat, lon) = (self.home.lat, self.home.lon);
        if !(-90. ..=90.).contains(&lat) || !(-180. ..=180.).contains(&lon) {
            return Err(Status::BadHome(lat, lon));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Status::BadPanelSize(self.display.width, self.display.height));
        }
        if self.session.interval >= self.session.max_duration {
            return Err(Status::BadInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r##"
version = 1
home {
  lat = 44.117965
  lon = 15.234143
}
tracker {
  url = "http://localhost/tracking/lastLocation"
}
"##;

    const FULL: &str = r##"
version = 1
home {
  lat = 44.117965
  lon = 15.234143
}
tracker {
  url     = "http://localhost/tracking/lastLocation"
  timeout = "5s"
  auth {
    token_env = "MY_TOKEN"
  }
}
session {
  interval     = "30s"
  max_duration = "100s"
  dedup        = "place"
}
display {
  driver = "dump"
  assets = "/tmp/assets"
  output = "/tmp/frames"
  width  = 296
  height = 128
  rotate = false
}
layout {
  x               = 100
  y_first         = 10
  headline        = "Bob is"
  show_place_name = false
}
log_dir = "/tmp/log"
"##;

    #[test]
    fn test_config_minimal_defaults() -> Result<()> {
        let cfg = Config::parse(MINIMAL)?;

        assert_eq!(Coordinate::new(44.117965, 15.234143), cfg.home);
        assert_eq!(Auth::default(), cfg.tracker.auth);
        assert_eq!(DEF_TIMEOUT, cfg.tracker.timeout);
        assert_eq!(Duration::from_secs(10), cfg.session.interval);
        assert_eq!(Duration::from_secs(86_400), cfg.session.max_duration);
        assert_eq!(DedupPolicy::Position, cfg.session.dedup);
        assert_eq!(PanelDriver::Dump, cfg.display.driver);
        assert_eq!((250, 122), (cfg.display.width, cfg.display.height));
        assert!(cfg.display.rotate);
        assert_eq!(Layout::default(), cfg.layout);
        assert_eq!(None, cfg.log_dir);
        Ok(())
    }

    #[test]
    fn test_config_full() -> Result<()> {
        let cfg = Config::parse(FULL)?;

        assert_eq!(
            Auth::Env {
                token_env: "MY_TOKEN".to_string()
            },
            cfg.tracker.auth
        );
        assert_eq!(Duration::from_secs(5), cfg.tracker.timeout);
        assert_eq!(Duration::from_secs(30), cfg.session.interval);
        assert_eq!(Duration::from_secs(100), cfg.session.max_duration);
        assert_eq!(DedupPolicy::Place, cfg.session.dedup);
        assert_eq!(PathBuf::from("/tmp/assets"), cfg.display.assets);
        assert_eq!((296, 128), (cfg.display.width, cfg.display.height));
        assert!(!cfg.display.rotate);
        assert_eq!(100, cfg.layout.x);
        assert_eq!(10, cfg.layout.y_first);
        // Not given, default
        assert_eq!(50, cfg.layout.y_second);
        assert_eq!("Bob is", cfg.layout.headline);
        assert!(!cfg.layout.show_place_name);
        assert_eq!(Some(PathBuf::from("/tmp/log")), cfg.log_dir);
        Ok(())
    }

    #[test]
    fn test_config_api_key() -> Result<()> {
        let data = MINIMAL.replace(
            r#"url = "http://localhost/tracking/lastLocation""#,
            r#"url = "http://localhost/tracking/lastLocation"
  auth {
    api_key = "SECRET"
  }"#,
        );
        let cfg = Config::parse(&data)?;

        assert_eq!(
            Auth::Key {
                api_key: "SECRET".to_string()
            },
            cfg.tracker.auth
        );
        Ok(())
    }

    #[test]
    fn test_config_no_home() {
        let data = MINIMAL.replace("lat = 44.117965", "");

        assert!(Config::parse(&data).is_err());
    }

    #[test]
    fn test_config_bad_version() {
        let data = MINIMAL.replace("version = 1", "version = 0");

        assert!(Config::parse(&data).is_err());
    }

    #[test]
    fn test_config_unknown_driver() {
        let data = format!("{MINIMAL}\ndisplay {{\n  driver = \"spi\"\n}}\n");

        assert!(Config::parse(&data).is_err());
    }

    #[test]
    fn test_config_bad_dedup() {
        let data = format!("{MINIMAL}\nsession {{\n  dedup = \"fuzzy\"\n}}\n");

        assert!(Config::parse(&data).is_err());
    }

    #[test]
    fn test_config_bad_home() {
        let data = MINIMAL.replace("lat = 44.117965", "lat = 144.117965");

        let err = Config::parse(&data).unwrap_err();
        assert!(err.to_string().contains("Bad home"));
    }

    #[test]
    fn test_config_bad_interval() {
        let data = format!(
            "{MINIMAL}\nsession {{\n  interval = \"1m\"\n  max_duration = \"30s\"\n}}\n"
        );

        let err = Config::parse(&data).unwrap_err();
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn test_config_load_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(FULL.as_bytes())?;

        let cfg = Config::load(Some(file.path().to_path_buf()))?;
        assert_eq!(DedupPolicy::Place, cfg.session.dedup);
        Ok(())
    }

    #[test]
    fn test_config_dump_panel() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut cfg = Config::parse(MINIMAL)?;
        cfg.display.output = dir.path().join("frames");

        let panel = cfg.display.panel()?;
        assert_eq!("dump", panel.name());
        assert!(dir.path().join("frames").is_dir());
        Ok(())
    }
}
