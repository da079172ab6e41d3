use std::{
    collections::VecDeque,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

/// Number of entries kept by the repositories.
pub const CAPACITY: usize = 100;

pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Newest entries first, kept in memory.
#[derive(Debug, Default)]
pub struct Ring {
    entries: Mutex<VecDeque<Entry>>,
}

impl Repository for Ring {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        entries.push_front(entry);
        entries.truncate(CAPACITY);
        Ok(())
    }
}

/// Newest entries first, kept in a JSON file across runs.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
}

impl File {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Repository for File {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(VecDeque::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self.read_entries()?;
        entries.push_front(entry);
        entries.truncate(CAPACITY);
        fs::write(&self.path, serde_json::to_string(&entries)?)?;
        Ok(())
    }
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(
    storage: Arc<Mutex<dyn Repository>>,
    level: LevelFilter,
) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(storage);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = Entry {
            time: Utc::now().format("%b %d %H:%M:%S").to_string(),
            level: record.level(),
            message: record.args().to_string(),
        };

        eprintln!("{} {:<5} {}", entry.time, entry.level, entry.message);

        if let Ok(log) = LOG.lock() {
            if let Some(ref repository) = *log {
                if let Ok(repository) = repository.lock() {
                    let _ = repository.write_entry(entry);
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn entry(message: &str) -> Entry {
        Entry {
            time: "Mar 01 12:00:00".to_string(),
            level: Level::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_ring_newest_first() {
        let ring = Ring::default();
        ring.write_entry(entry("a")).unwrap();
        ring.write_entry(entry("b")).unwrap();
        assert_eq!(
            ring.read_entries().unwrap(),
            VecDeque::from([entry("b"), entry("a")])
        );
    }

    #[test]
    fn test_ring_truncated() {
        let ring = Ring::default();
        for i in 0..=CAPACITY {
            ring.write_entry(entry(&i.to_string())).unwrap();
        }
        let entries = ring.read_entries().unwrap();
        assert_eq!(entries.len(), CAPACITY);
        assert_eq!(entries.front(), Some(&entry(&CAPACITY.to_string())));
        assert_eq!(entries.back(), Some(&entry("1")));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::new(dir.path().join("log.json"));
        assert_eq!(file.read_entries().unwrap(), VecDeque::new());

        file.write_entry(entry("a")).unwrap();
        file.write_entry(entry("b")).unwrap();

        assert_eq!(
            File::new(dir.path().join("log.json")).read_entries().unwrap(),
            VecDeque::from([entry("b"), entry("a")])
        );
    }

    #[rstest]
    #[case(Level::Error, "Error")]
    #[case(Level::Warn, "Warn")]
    #[case(Level::Debug, "Debug")]
    fn test_entry_serialize(#[case] level: Level, #[case] expected: &str) {
        let serialized = serde_json::to_value(Entry {
            level,
            ..entry("a")
        })
        .unwrap();
        assert_eq!(serialized["level"], expected);
    }

    #[test]
    fn test_logger_writes_to_repository() {
        let ring = Arc::new(Mutex::new(Ring::default()));
        init(ring.clone(), LevelFilter::Info).unwrap();

        log::debug!("logger test: below level");
        log::info!("logger test: first");
        log::warn!("logger test: second");

        let entries = ring
            .lock()
            .unwrap()
            .read_entries()
            .unwrap()
            .into_iter()
            .filter(|entry| entry.message.starts_with("logger test:"))
            .map(|entry| (entry.level, entry.message))
            .collect::<Vec<_>>();
        assert_eq!(
            entries,
            vec![
                (Level::Warn, "logger test: second".to_string()),
                (Level::Info, "logger test: first".to_string()),
            ]
        );
    }
}
