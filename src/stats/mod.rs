pub mod queries;
pub mod range;
pub mod yearly;

pub use queries::{
    best_player_per_map, best_single_day, mode_stats, player_average_score, player_days_played,
    player_totals, top_improvements, top_maps, top_maps_by_average_score,
};
pub use range::{days_in_range, month_range, FlatDay};
pub use yearly::{build_yearly_table, yearly_full_attendance, yearly_stats};
