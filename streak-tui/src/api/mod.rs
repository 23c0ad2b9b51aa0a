mod client;
mod error;

pub use client::{normalize_error_body, ApiClient, RANK_SIZE, SEARCH_PAGE_SIZE, SUGGESTED_LIMIT};
pub use error::{ApiError, ApiResult};
