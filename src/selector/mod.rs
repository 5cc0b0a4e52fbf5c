pub mod catalog;
pub mod pick;

pub use catalog::{load_catalog, MapCatalog, MapConfig, MapModes};
pub use pick::{recent_picks, select_daily_challenge, DailyChallenge, RecentPick};
