pub mod settings;

pub use settings::{AppConfig, LeagueSettings, SelectorSettings, StorageSettings};
