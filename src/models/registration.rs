//! Registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lowest grade accepted on a registration form
pub const GRADE_MIN: i32 = 2;
/// Highest grade accepted on a registration form
pub const GRADE_MAX: i32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub registration_number: String,
    pub workshop_id: i64,
    pub student_name: String,
    pub grade: i32,
    pub school_id: i64,
    pub contact_number: String,
    pub email: String,
    pub payment_status: String,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// A registration is confirmed once paid, or immediately for free workshops
    pub fn is_confirmed(&self) -> bool {
        matches!(
            PaymentStatus::parse(&self.payment_status),
            Some(PaymentStatus::Completed) | Some(PaymentStatus::Free)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub registration_number: String,
    pub workshop_id: i64,
    pub student_name: String,
    pub grade: i32,
    pub school_id: i64,
    pub contact_number: String,
    pub email: String,
    pub payment_status: PaymentStatus,
}

/// Registration payment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    /// Free workshop: confirmed without any payment
    Free,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Free => "free",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "free" => Some(PaymentStatus::Free),
            _ => None,
        }
    }

    /// Human-readable label for admin listings and receipts
    pub fn display(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Free => "Free Workshop",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration_with_status(status: &str) -> Registration {
        Registration {
            id: 1,
            registration_number: "REG-20251201-AB12C".to_string(),
            workshop_id: 1,
            student_name: "Test Student".to_string(),
            grade: 8,
            school_id: 1,
            contact_number: "01712345678".to_string(),
            email: "student@example.com".to_string(),
            payment_status: status.to_string(),
            registered_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
            PaymentStatus::Free,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::parse("unknown"), None);
    }

    #[test]
    fn test_confirmed_statuses() {
        assert!(registration_with_status("completed").is_confirmed());
        assert!(registration_with_status("free").is_confirmed());
        assert!(!registration_with_status("pending").is_confirmed());
        assert!(!registration_with_status("failed").is_confirmed());
        assert!(!registration_with_status("cancelled").is_confirmed());
    }
}
