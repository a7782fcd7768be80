//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, PaymentRepository, RegistrationRepository, SchoolRepository, WorkshopRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub workshops: WorkshopRepository,
    pub schools: SchoolRepository,
    pub registrations: RegistrationRepository,
    pub payments: PaymentRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            workshops: WorkshopRepository::new(pool.clone()),
            schools: SchoolRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool),
        }
    }
}
