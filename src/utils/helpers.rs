//! Shared helper functions

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Generate a unique human-readable registration number: `REG-YYYYMMDD-XXXXX`
pub fn generate_registration_number() -> String {
    let date_str = Utc::now().format("%Y%m%d");
    let unique_id = Uuid::new_v4().simple().to_string()[..5].to_uppercase();
    format!("REG-{}-{}", date_str, unique_id)
}

/// Generate a gateway transaction id tied to a registration number:
/// `TXN-<registration number>-XXXXXXXX`
pub fn generate_transaction_id(registration_number: &str) -> String {
    let unique_id = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("TXN-{}-{}", registration_number, unique_id)
}

/// Format an amount for display in BDT
pub fn format_fee(fee: Decimal) -> String {
    if fee.is_zero() {
        "FREE".to_string()
    } else {
        format!("\u{09F3}{}", fee)
    }
}
