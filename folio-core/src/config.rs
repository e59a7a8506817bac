use std::{
    env,
    env::VarError,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::CatalogBuilder,
    error::Error,
    share_link::{ImageHost, DEFAULT_THUMBNAIL_SIZE},
    slideshow::DEFAULT_SLIDE_INTERVAL,
    util::mkdir_if_not_exists,
};

const APP_NAME: &str = "Folio";
const CONFIG_FILENAME: &str = "config.json";
const MANIFEST_ENV_VAR: &str = "FOLIO_MANIFEST";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thumbnail_size: u32,
    pub image_host: ImageHost,
    pub grid_limit: Option<usize>,
    pub album_limit: Option<usize>,
    pub slide_interval_secs: u64,
    pub manifest: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            image_host: ImageHost::default(),
            grid_limit: None,
            album_limit: None,
            slide_interval_secs: DEFAULT_SLIDE_INTERVAL.as_secs(),
            manifest: None,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    /// Loads the user config. A missing or unreadable file yields `None`.
    pub fn load() -> Option<Config> {
        let path = Self::config_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                log::error!("failed to read config {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, Error> {
        log::info!("loading config: {:?}", path);
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self) -> Result<PathBuf, Error> {
        let path = Self::config_path().ok_or_else(|| {
            Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine config directory",
            ))
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            mkdir_if_not_exists(dir)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_secs(self.slide_interval_secs)
    }

    /// Manifest location, with `FOLIO_MANIFEST` taking precedence over the
    /// configured path.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        env::var(MANIFEST_ENV_VAR).map_or_else(
            |err| {
                if let VarError::NotUnicode(_) = err {
                    log::error!("{} is not valid unicode", MANIFEST_ENV_VAR);
                }
                self.manifest.clone()
            },
            |path| Some(PathBuf::from(path)),
        )
    }

    pub fn catalog_builder(&self) -> CatalogBuilder {
        CatalogBuilder::with_host(self.image_host, self.thumbnail_size)
    }
}
