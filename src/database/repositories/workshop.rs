//! Workshop repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::workshop::{CreateWorkshopRequest, Workshop};
use crate::utils::errors::WorkshopHubError;

const WORKSHOP_COLUMNS: &str = "id, name, description, workshop_date, time_slot, duration, venue, organizer, fee, capacity, is_active, created_at, updated_at";

/// Workshop row with registration counts for admin listings and Excel export
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct WorkshopExportRow {
    pub id: i64,
    pub name: String,
    pub workshop_date: String,
    pub time_slot: String,
    pub duration: String,
    pub venue: String,
    pub organizer: String,
    pub fee: rust_decimal::Decimal,
    pub capacity: i32,
    pub is_active: bool,
    pub total_registrations: i64,
    pub confirmed_registrations: i64,
}

#[derive(Debug, Clone)]
pub struct WorkshopRepository {
    pool: PgPool,
}

impl WorkshopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new workshop
    pub async fn create(&self, request: CreateWorkshopRequest) -> Result<Workshop, WorkshopHubError> {
        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            r#"
            INSERT INTO workshops (name, description, workshop_date, time_slot, duration, venue, organizer, fee, capacity, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {WORKSHOP_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.description)
        .bind(request.workshop_date)
        .bind(request.time_slot)
        .bind(request.duration)
        .bind(request.venue)
        .bind(request.organizer)
        .bind(request.fee)
        .bind(request.capacity)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(workshop)
    }

    /// Find workshop by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Workshop>, WorkshopHubError> {
        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            "SELECT {WORKSHOP_COLUMNS} FROM workshops WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workshop)
    }

    /// Find a workshop that is still accepting registrations
    pub async fn find_active_by_id(&self, id: i64) -> Result<Option<Workshop>, WorkshopHubError> {
        let workshop = sqlx::query_as::<_, Workshop>(&format!(
            "SELECT {WORKSHOP_COLUMNS} FROM workshops WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workshop)
    }

    /// Check if a workshop with this name already exists (used by seeding)
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, WorkshopHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workshops WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }

    /// List active workshops ordered for the public listing page
    pub async fn list_active(&self) -> Result<Vec<Workshop>, WorkshopHubError> {
        let workshops = sqlx::query_as::<_, Workshop>(&format!(
            "SELECT {WORKSHOP_COLUMNS} FROM workshops WHERE is_active = true ORDER BY workshop_date ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(workshops)
    }

    /// List all workshops with registration counts for the admin panel
    pub async fn list_with_counts(&self) -> Result<Vec<WorkshopExportRow>, WorkshopHubError> {
        let rows = sqlx::query_as::<_, WorkshopExportRow>(
            r#"
            SELECT w.id, w.name, w.workshop_date, w.time_slot, w.duration, w.venue,
                   w.organizer, w.fee, w.capacity, w.is_active,
                   COUNT(r.id) AS total_registrations,
                   COUNT(r.id) FILTER (WHERE r.payment_status IN ('completed', 'free'))
                       AS confirmed_registrations
            FROM workshops w
            LEFT JOIN registrations r ON r.workshop_id = w.id
            GROUP BY w.id
            ORDER BY w.workshop_date ASC, w.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count confirmed registrations (completed or free) for capacity checks
    pub async fn count_confirmed_registrations(&self, workshop_id: i64) -> Result<i64, WorkshopHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE workshop_id = $1 AND payment_status IN ('completed', 'free')",
        )
        .bind(workshop_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count active workshops
    pub async fn count_active(&self) -> Result<i64, WorkshopHubError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workshops WHERE is_active = true")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }
}
