//! Workshop model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workshop {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Display string, e.g. "10 & 11 December 2025"
    pub workshop_date: String,
    pub time_slot: String,
    pub duration: String,
    pub venue: String,
    pub organizer: String,
    pub fee: Decimal,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workshop {
    /// A workshop with a zero fee requires no payment
    pub fn is_free(&self) -> bool {
        self.fee.is_zero()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkshopRequest {
    pub name: String,
    pub description: String,
    pub workshop_date: String,
    pub time_slot: String,
    pub duration: String,
    pub venue: String,
    pub organizer: String,
    pub fee: Decimal,
    pub capacity: i32,
    pub is_active: bool,
}
