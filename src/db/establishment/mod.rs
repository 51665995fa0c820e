pub mod aggregate;
pub mod get;

pub use aggregate::{lock_establishment, recompute_aggregate};
pub use get::{get_establishment_status, get_rating_summary};
