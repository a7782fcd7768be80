//! Domain models

pub mod payment;
pub mod registration;
pub mod school;
pub mod workshop;

pub use payment::{CreatePaymentRequest, Payment, PaymentMethod};
pub use registration::{
    CreateRegistrationRequest, PaymentStatus, Registration, GRADE_MAX, GRADE_MIN,
};
pub use school::School;
pub use workshop::{CreateWorkshopRequest, Workshop};
