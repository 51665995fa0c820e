pub mod aggregate;
pub mod lifecycle;
pub mod quota;
pub mod validation;

pub use lifecycle::{CreatedReview, ReviewService, UpdatedReview};
pub use quota::{QuotaPolicy, QuotaTracker};
