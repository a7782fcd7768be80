//! Repository layer for database operations

pub mod payment;
pub mod registration;
pub mod school;
pub mod workshop;

pub use payment::{PaymentExportRow, PaymentFilter, PaymentRepository};
pub use registration::{
    RegistrationExportRow, RegistrationFilter, RegistrationRepository, WorkshopStats,
};
pub use school::SchoolRepository;
pub use workshop::{WorkshopExportRow, WorkshopRepository};
