pub mod country;

pub use country::{is_likely_geo_id, normalize_country_code};
