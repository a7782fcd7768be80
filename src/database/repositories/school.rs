//! School repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::school::School;
use crate::utils::errors::WorkshopHubError;

#[derive(Debug, Clone)]
pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a school, returning the existing row if the name is already taken
    pub async fn create_or_get(&self, name: &str) -> Result<School, WorkshopHubError> {
        let school = sqlx::query_as::<_, School>(
            r#"
            INSERT INTO schools (name, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (name) DO UPDATE SET updated_at = schools.updated_at
            RETURNING id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(school)
    }

    /// Find school by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<School>, WorkshopHubError> {
        let school = sqlx::query_as::<_, School>(
            "SELECT id, name, is_active, created_at, updated_at FROM schools WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(school)
    }

    /// Find an active school by ID (registration forms only accept active schools)
    pub async fn find_active_by_id(&self, id: i64) -> Result<Option<School>, WorkshopHubError> {
        let school = sqlx::query_as::<_, School>(
            "SELECT id, name, is_active, created_at, updated_at FROM schools WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(school)
    }

    /// List active schools for the registration form dropdown
    pub async fn list_active(&self) -> Result<Vec<School>, WorkshopHubError> {
        let schools = sqlx::query_as::<_, School>(
            "SELECT id, name, is_active, created_at, updated_at FROM schools WHERE is_active = true ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(schools)
    }
}
