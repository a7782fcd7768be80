//! Registration repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::registration::{CreateRegistrationRequest, PaymentStatus, Registration};
use crate::utils::errors::WorkshopHubError;

const REGISTRATION_COLUMNS: &str = "id, registration_number, workshop_id, student_name, grade, school_id, contact_number, email, payment_status, registered_at, updated_at";

/// Filters for the admin registration listing
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub workshop_id: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
    /// Matches registration number, student name or email
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Flattened registration row for admin listings and Excel export
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct RegistrationExportRow {
    pub registration_number: String,
    pub workshop_name: String,
    pub workshop_date: String,
    pub student_name: String,
    pub grade: i32,
    pub school_name: String,
    pub contact_number: String,
    pub email: String,
    pub payment_status: String,
    pub fee: rust_decimal::Decimal,
    pub registered_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new registration
    ///
    /// The (email, workshop_id) unique constraint is the final guard against
    /// duplicate registrations racing past the form-level check.
    pub async fn create(
        &self,
        request: CreateRegistrationRequest,
    ) -> Result<Registration, WorkshopHubError> {
        let result = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (registration_number, workshop_id, student_name, grade, school_id, contact_number, email, payment_status, registered_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(request.registration_number)
        .bind(request.workshop_id)
        .bind(request.student_name)
        .bind(request.grade)
        .bind(request.school_id)
        .bind(request.contact_number)
        .bind(request.email)
        .bind(request.payment_status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(registration) => Ok(registration),
            Err(err) if WorkshopHubError::is_unique_violation(&err) => {
                Err(WorkshopHubError::DuplicateRegistration)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, WorkshopHubError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by its public registration number
    pub async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<Registration>, WorkshopHubError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_number = $1"
        ))
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Check whether this email is already registered for the workshop
    pub async fn exists_for_workshop(
        &self,
        email: &str,
        workshop_id: i64,
    ) -> Result<bool, WorkshopHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE email = $1 AND workshop_id = $2",
        )
        .bind(email)
        .bind(workshop_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Update the payment status of a registration
    pub async fn update_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<Registration, WorkshopHubError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET payment_status = $2, updated_at = $3
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    /// List registrations for the admin panel, with filters and search
    pub async fn list_filtered(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<RegistrationExportRow>, WorkshopHubError> {
        let search = filter
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query_as::<_, RegistrationExportRow>(
            r#"
            SELECT r.registration_number, w.name AS workshop_name, w.workshop_date,
                   r.student_name, r.grade, s.name AS school_name, r.contact_number,
                   r.email, r.payment_status, w.fee, r.registered_at
            FROM registrations r
            INNER JOIN workshops w ON w.id = r.workshop_id
            INNER JOIN schools s ON s.id = r.school_id
            WHERE ($1::bigint IS NULL OR r.workshop_id = $1)
              AND ($2::text IS NULL OR r.payment_status = $2)
              AND ($3::text IS NULL OR r.registration_number ILIKE $3
                   OR r.student_name ILIKE $3 OR r.email ILIKE $3)
            ORDER BY r.registered_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.workshop_id)
        .bind(filter.payment_status.map(|s| s.as_str()))
        .bind(search)
        .bind(if filter.limit > 0 { filter.limit } else { 100 })
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recent registrations for the dashboard
    pub async fn recent(&self, limit: i64) -> Result<Vec<Registration>, WorkshopHubError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations ORDER BY registered_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Count all registrations
    pub async fn count(&self) -> Result<i64, WorkshopHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count registrations in a given payment status
    pub async fn count_by_status(&self, status: PaymentStatus) -> Result<i64, WorkshopHubError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE payment_status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Per-workshop participant and payment breakdown for the dashboard
    pub async fn workshop_stats(&self) -> Result<Vec<WorkshopStats>, WorkshopHubError> {
        let stats = sqlx::query_as::<_, WorkshopStats>(
            r#"
            SELECT w.id AS workshop_id, w.name AS workshop_name, w.workshop_date,
                   COUNT(r.id) AS total_participants,
                   COUNT(r.id) FILTER (WHERE r.payment_status = 'completed') AS completed_payments,
                   COUNT(r.id) FILTER (WHERE r.payment_status = 'pending') AS pending_payments,
                   COUNT(r.id) FILTER (WHERE r.payment_status = 'free') AS free_registrations,
                   COALESCE(SUM(p.amount) FILTER (WHERE p.payment_status = 'completed'), 0) AS revenue
            FROM workshops w
            LEFT JOIN registrations r ON r.workshop_id = w.id
            LEFT JOIN payments p ON p.registration_id = r.id
            GROUP BY w.id, w.name, w.workshop_date
            ORDER BY w.workshop_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}

/// Per-workshop aggregate used by the admin dashboard
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct WorkshopStats {
    pub workshop_id: i64,
    pub workshop_name: String,
    pub workshop_date: String,
    pub total_participants: i64,
    pub completed_payments: i64,
    pub pending_payments: i64,
    pub free_registrations: i64,
    pub revenue: rust_decimal::Decimal,
}
