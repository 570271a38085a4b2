//! Infrastructure services

mod reading_service;
mod user_service;

pub use reading_service::{AddReadingRequest, ReadingService};
pub use user_service::UserService;
