//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod batch;
pub mod health;
pub mod redirect;
pub mod shorten;
pub mod stats;
pub mod user_urls;

pub use batch::shorten_batch_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::{shorten_handler, shorten_text_handler};
pub use stats::internal_stats_handler;
pub use user_urls::{delete_user_urls_handler, user_urls_handler};
