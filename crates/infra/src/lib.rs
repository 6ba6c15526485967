//! Infrastructure layer: configuration, storage and application services.

pub mod config;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use repository::{RepositoryError, Stores};
pub use services::{AccountService, BookingService, ServiceError, ServiceResult, TurfService};
