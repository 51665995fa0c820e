pub mod establishment;
pub mod review;

pub use establishment::{get_rating_summary_handler, list_establishment_reviews_handler};
pub use review::{
    create_review_handler, delete_review_handler, get_quota_handler, get_review_handler,
    update_review_handler,
};
