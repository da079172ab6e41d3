use std::{fs, io, path::Path, path::PathBuf};

use gym_catalog_domain::{PageRequest, PageRequestError};
use log::LevelFilter;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub page_size: usize,
    pub token_file: PathBuf,
    pub token_ttl_seconds: u64,
}

impl Settings {
    /// Reads the settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        settings.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        PageRequest::new(None, Some(self.page_size), None, None)?;
        if self.token_ttl_seconds == 0 {
            return Err(SettingsError::TokenTtl);
        }
        Ok(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("gym-catalog.json"),
            log_file: None,
            log_level: LevelFilter::Info,
            page_size: PageRequest::DEFAULT_PAGE_SIZE,
            token_file: PathBuf::from("gym-catalog.token.json"),
            token_ttl_seconds: 3600,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    PageSize(#[from] PageRequestError),
    #[error("Token lifetime must be greater than zero")]
    TokenTtl,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
