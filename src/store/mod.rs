pub mod calendar;
pub mod models;
pub mod repository;
pub mod weekly;

pub use models::*;
pub use repository::{LeagueStore, RecordDay};
pub use weekly::{BestDaily, PodiumRow};
