pub mod table;

pub use table::{group_thousands, pad_left, pad_right, simple_ranking_table, RenderedTable};
