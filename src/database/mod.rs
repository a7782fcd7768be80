//! Database layer

pub mod connection;
pub mod repositories;
pub mod seed;
pub mod service;

pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use repositories::{
    PaymentExportRow, PaymentFilter, PaymentRepository, RegistrationExportRow, RegistrationFilter,
    RegistrationRepository, SchoolRepository, WorkshopExportRow, WorkshopRepository, WorkshopStats,
};
pub use service::DatabaseService;
