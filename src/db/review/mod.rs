pub mod delete;
pub mod get;
pub mod patch;
pub mod post;

pub use delete::soft_delete_review;
pub use get::{count_active_reviews, get_active_review, get_review_by_id, list_active_reviews};
pub use patch::update_review;
pub use post::insert_review;
