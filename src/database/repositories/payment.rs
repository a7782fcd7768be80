//! Payment repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::payment::{CreatePaymentRequest, Payment};
use crate::models::registration::PaymentStatus;
use crate::utils::errors::WorkshopHubError;

const PAYMENT_COLUMNS: &str = "id, registration_id, transaction_id, amount, currency, payment_status, payment_method, gateway_data, initiated_at, completed_at";

/// Filters for the admin payment listing
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub payment_status: Option<PaymentStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Flattened payment row for admin listings and Excel export
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PaymentExportRow {
    pub transaction_id: String,
    pub registration_number: String,
    pub student_name: String,
    pub workshop_name: String,
    pub amount: rust_decimal::Decimal,
    pub currency: String,
    pub payment_status: String,
    pub payment_method: String,
    pub initiated_at: chrono::DateTime<Utc>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the payment record for a registration, or replace a previous
    /// unsuccessful attempt with the new transaction.
    ///
    /// A registration has at most one payment row; a retry after a failed or
    /// cancelled attempt reuses the row with a fresh transaction id. Returns
    /// `None` when the existing row is already completed, which the guard
    /// leaves untouched.
    pub async fn create_or_replace(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<Option<Payment>, WorkshopHubError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (registration_id, transaction_id, amount, currency, payment_status, payment_method, gateway_data, initiated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
            ON CONFLICT (registration_id) DO UPDATE
            SET transaction_id = EXCLUDED.transaction_id,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                payment_status = 'pending',
                payment_method = EXCLUDED.payment_method,
                gateway_data = EXCLUDED.gateway_data,
                initiated_at = EXCLUDED.initiated_at,
                completed_at = NULL
            WHERE payments.payment_status <> 'completed'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(request.registration_id)
        .bind(request.transaction_id)
        .bind(request.amount)
        .bind(request.currency)
        .bind(request.payment_method.as_str())
        .bind(request.gateway_data)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Find payment by gateway transaction id
    pub async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, WorkshopHubError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Find payment by registration
    pub async fn find_by_registration_id(
        &self,
        registration_id: i64,
    ) -> Result<Option<Payment>, WorkshopHubError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE registration_id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Mark a payment completed and confirm its registration, atomically
    pub async fn mark_completed(
        &self,
        payment_id: i64,
        gateway_data: serde_json::Value,
    ) -> Result<Payment, WorkshopHubError> {
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET payment_status = 'completed', completed_at = $2, gateway_data = $3
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(Utc::now())
        .bind(gateway_data)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE registrations SET payment_status = 'completed', updated_at = $2 WHERE id = $1")
            .bind(payment.registration_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(payment)
    }

    /// Mark a payment failed or cancelled along with its registration
    pub async fn mark_unsuccessful(
        &self,
        payment_id: i64,
        status: PaymentStatus,
    ) -> Result<Payment, WorkshopHubError> {
        debug_assert!(matches!(
            status,
            PaymentStatus::Failed | PaymentStatus::Cancelled
        ));

        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET payment_status = $2
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE registrations SET payment_status = $2, updated_at = $3 WHERE id = $1")
            .bind(payment.registration_id)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(payment)
    }

    /// List payments for the admin panel, newest first
    pub async fn list_filtered(
        &self,
        filter: &PaymentFilter,
    ) -> Result<Vec<PaymentExportRow>, WorkshopHubError> {
        let rows = sqlx::query_as::<_, PaymentExportRow>(
            r#"
            SELECT p.transaction_id, r.registration_number, r.student_name,
                   w.name AS workshop_name, p.amount, p.currency,
                   p.payment_status, p.payment_method, p.initiated_at, p.completed_at
            FROM payments p
            INNER JOIN registrations r ON r.id = p.registration_id
            INNER JOIN workshops w ON w.id = r.workshop_id
            WHERE ($1::text IS NULL OR p.payment_status = $1)
            ORDER BY p.initiated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.payment_status.map(|s| s.as_str()))
        .bind(if filter.limit > 0 { filter.limit } else { 100 })
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total revenue from completed payments
    pub async fn total_revenue(&self) -> Result<rust_decimal::Decimal, WorkshopHubError> {
        let total: (rust_decimal::Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE payment_status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total.0)
    }
}
