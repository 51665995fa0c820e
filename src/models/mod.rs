pub mod establishment;
pub mod quota;
pub mod redis;
pub mod response;
pub mod review;
pub mod user;

pub use establishment::{AggregateSummary, EstablishmentStatus};
pub use quota::{QuotaDecision, QuotaStatus};
pub use review::{
    NewReview, PageInfo, PageRequest, Review, ReviewChanges, ReviewEdit, ReviewPage,
    ReviewSort,
};
