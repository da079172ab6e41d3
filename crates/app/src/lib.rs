#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;
pub mod settings;
pub mod token;

pub use settings::{Settings, SettingsError};
