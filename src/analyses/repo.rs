use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Allowed workflow states for an analysis.
pub const ANALYSIS_STATUSES: [&str; 3] = ["new", "reviewed", "finalized"];

/// Analysis record in the database. Owned by exactly one user; the
/// row cascades away when the owner is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Analysis {
    pub id: String,
    pub patient_id: String,
    pub ap_image_path: Option<String>,
    pub lat_image_path: Option<String>,
    pub result_path: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub user_id: i64,
}

/// Filters for history listings. `owner_id` is None for elevated
/// callers (see everything) and Some for NORMAL users (own rows only).
#[derive(Debug, Default)]
pub struct HistoryFilter {
    pub patient_id: Option<String>,
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
    pub owner_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl Analysis {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        db: &PgPool,
        id: &str,
        patient_id: &str,
        ap_image_path: Option<&str>,
        lat_image_path: Option<&str>,
        result_path: &str,
        notes: Option<&str>,
        user_id: i64,
    ) -> anyhow::Result<Analysis> {
        let analysis = sqlx::query_as::<_, Analysis>(
            r#"
            INSERT INTO analyses (id, patient_id, ap_image_path, lat_image_path, result_path, notes, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, patient_id, ap_image_path, lat_image_path, result_path, notes, status, created_at, user_id
            "#,
        )
        .bind(id)
        .bind(patient_id)
        .bind(ap_image_path)
        .bind(lat_image_path)
        .bind(result_path)
        .bind(notes)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(analysis)
    }

    pub async fn find_by_id(db: &PgPool, id: &str) -> anyhow::Result<Option<Analysis>> {
        let analysis = sqlx::query_as::<_, Analysis>(
            r#"
            SELECT id, patient_id, ap_image_path, lat_image_path, result_path, notes, status, created_at, user_id
            FROM analyses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(analysis)
    }

    /// Patch notes/status; omitted fields keep their stored value.
    pub async fn update(
        db: &PgPool,
        id: &str,
        notes: Option<&str>,
        status: Option<&str>,
    ) -> anyhow::Result<Option<Analysis>> {
        let analysis = sqlx::query_as::<_, Analysis>(
            r#"
            UPDATE analyses
            SET notes = COALESCE($2, notes),
                status = COALESCE($3, status)
            WHERE id = $1
            RETURNING id, patient_id, ap_image_path, lat_image_path, result_path, notes, status, created_at, user_id
            "#,
        )
        .bind(id)
        .bind(notes)
        .bind(status)
        .fetch_optional(db)
        .await?;
        Ok(analysis)
    }

    pub async fn delete(db: &PgPool, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM analyses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// History listing, newest first. All filters are optional and
    /// expressed in one static query.
    pub async fn list(db: &PgPool, filter: &HistoryFilter) -> anyhow::Result<Vec<Analysis>> {
        let rows = sqlx::query_as::<_, Analysis>(
            r#"
            SELECT id, patient_id, ap_image_path, lat_image_path, result_path, notes, status, created_at, user_id
            FROM analyses
            WHERE ($1::text IS NULL OR patient_id = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
              AND ($4::bigint IS NULL OR user_id = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.patient_id.as_deref())
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.owner_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
