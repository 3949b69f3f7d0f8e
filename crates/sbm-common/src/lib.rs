pub mod error;
pub mod form;
pub mod listing;
pub mod models;
pub mod template;
pub mod view;

pub use error::ApiError;
pub use listing::ListResponse;
pub use models::*;
