use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::query_builder::{PageRequest, RequestFilter, SortSpec};
use crate::state_machine::{RequestStatus, WorkflowKind};

use super::store::{CasOutcome, RequestStore, StatusChange, StoreError};

/// A submitted, stateful workflow record: an approval request or a warranty
/// claim. Maps to one row of `approval_requests` / `warranty_claims`, which
/// share this column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub id: Uuid,
    pub subject_type: String,
    pub subject_id: String,
    pub requested_by: String,
    pub reviewed_by: Option<String>,
    pub status: RequestStatus,
    pub decision_date: Option<DateTime<Utc>>,
    pub comments: Option<String>,
    /// Domain-specific fields, e.g. `actionType` / `requestReason`
    pub payload: serde_json::Value,
    /// Append-only; adding documents never changes `status`
    pub supporting_docs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New request for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReviewRequest {
    pub subject_type: String,
    pub subject_id: String,
    pub requested_by: String,
    pub status: RequestStatus,
    pub payload: serde_json::Value,
    pub supporting_docs: Vec<String>,
}

/// Raw row with the status column still as text; the status is parsed on
/// the way out so a bad value surfaces as a corrupt-record error instead of
/// a decode panic.
#[derive(Debug, FromRow)]
struct RequestRow {
    id: Uuid,
    subject_type: String,
    subject_id: String,
    requested_by: String,
    reviewed_by: Option<String>,
    status: String,
    decision_date: Option<DateTime<Utc>>,
    comments: Option<String>,
    payload: serde_json::Value,
    supporting_docs: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for ReviewRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<RequestStatus>().map_err(|detail| {
            StoreError::Corrupt {
                id: row.id,
                detail,
            }
        })?;
        Ok(ReviewRequest {
            id: row.id,
            subject_type: row.subject_type,
            subject_id: row.subject_id,
            requested_by: row.requested_by,
            reviewed_by: row.reviewed_by,
            status,
            decision_date: row.decision_date,
            comments: row.comments,
            payload: row.payload,
            supporting_docs: row.supporting_docs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, subject_type, subject_id, requested_by, reviewed_by, status, \
                       decision_date, comments, payload, supporting_docs, created_at, updated_at";

/// Postgres-backed request store. One instance per workflow kind; the table
/// name comes from the kind and is never caller-supplied.
#[derive(Debug, Clone)]
pub struct PgRequestStore {
    pool: PgPool,
    table: &'static str,
}

impl PgRequestStore {
    pub fn for_kind(pool: PgPool, kind: WorkflowKind) -> Self {
        Self {
            pool,
            table: kind.table_name(),
        }
    }

    fn rows_to_requests(rows: Vec<RequestRow>) -> Result<Vec<ReviewRequest>, StoreError> {
        rows.into_iter().map(ReviewRequest::try_from).collect()
    }

    async fn fetch_all_where(
        &self,
        clause: &str,
        binds: &[&str],
    ) -> Result<Vec<ReviewRequest>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} {clause}", self.table);
        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Self::rows_to_requests(rows)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", self.table);
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn create(&self, new_request: NewReviewRequest) -> Result<ReviewRequest, StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, subject_type, subject_id, requested_by, status, payload, \
             supporting_docs, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {COLUMNS}",
            self.table
        );
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_request.subject_type)
            .bind(&new_request.subject_id)
            .bind(&new_request.requested_by)
            .bind(new_request.status.to_string())
            .bind(&new_request.payload)
            .bind(&new_request.supporting_docs)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRequest>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.table);
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ReviewRequest::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RequestFilter,
        page: &PageRequest,
        sort: &SortSpec,
    ) -> Result<(Vec<ReviewRequest>, u64), StoreError> {
        let (where_clause, binds) = filter.to_sql(1);

        let count_sql = format!("SELECT COUNT(*) FROM {}{where_clause}", self.table);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let sql = format!(
            "SELECT {COLUMNS} FROM {}{where_clause}{}{}",
            self.table,
            sort.to_sql(),
            page.to_sql()
        );
        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok((Self::rows_to_requests(rows)?, total.max(0) as u64))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<CasOutcome, StoreError> {
        let sql = format!(
            "UPDATE {} SET status = $3, reviewed_by = $4, comments = COALESCE($5, comments), \
             decision_date = COALESCE($6, decision_date), updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}",
            self.table
        );
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .bind(expected.to_string())
            .bind(change.target.to_string())
            .bind(&change.reviewed_by)
            .bind(&change.comments)
            .bind(change.decision_date)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(CasOutcome::Updated(row.try_into()?)),
            None if self.exists(id).await? => Ok(CasOutcome::StatusChanged),
            None => Ok(CasOutcome::Missing),
        }
    }

    async fn append_documents(
        &self,
        id: Uuid,
        allowed_statuses: &[RequestStatus],
        documents: &[String],
    ) -> Result<CasOutcome, StoreError> {
        let statuses: Vec<String> = allowed_statuses.iter().map(|s| s.to_string()).collect();
        let sql = format!(
            "UPDATE {} SET supporting_docs = supporting_docs || $2, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING {COLUMNS}",
            self.table
        );
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .bind(documents)
            .bind(&statuses)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(CasOutcome::Updated(row.try_into()?)),
            None if self.exists(id).await? => Ok(CasOutcome::StatusChanged),
            None => Ok(CasOutcome::Missing),
        }
    }

    async fn count_by_status(&self) -> Result<HashMap<RequestStatus, u64>, StoreError> {
        let sql = format!(
            "SELECT status, COUNT(*) AS count FROM {} GROUP BY status",
            self.table
        );
        let rows = sqlx::query_as::<_, (String, i64)>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut counts = HashMap::new();
        for (status, count) in rows {
            let status = status.parse::<RequestStatus>().map_err(|detail| {
                StoreError::Corrupt {
                    id: Uuid::nil(),
                    detail,
                }
            })?;
            counts.insert(status, count.max(0) as u64);
        }
        Ok(counts)
    }

    async fn for_subject(
        &self,
        subject_type: &str,
        subject_id: &str,
    ) -> Result<Vec<ReviewRequest>, StoreError> {
        self.fetch_all_where(
            "WHERE subject_type = $1 AND subject_id = $2 ORDER BY created_at DESC",
            &[subject_type, subject_id],
        )
        .await
    }

    async fn with_status(
        &self,
        status: RequestStatus,
        oldest_first: bool,
    ) -> Result<Vec<ReviewRequest>, StoreError> {
        let clause = if oldest_first {
            "WHERE status = $1 ORDER BY created_at ASC"
        } else {
            "WHERE status = $1 ORDER BY created_at DESC"
        };
        self.fetch_all_where(clause, &[&status.to_string()]).await
    }

    async fn by_requester(&self, requested_by: &str) -> Result<Vec<ReviewRequest>, StoreError> {
        self.fetch_all_where(
            "WHERE requested_by = $1 ORDER BY created_at DESC",
            &[requested_by],
        )
        .await
    }

    async fn by_reviewer(&self, reviewed_by: &str) -> Result<Vec<ReviewRequest>, StoreError> {
        self.fetch_all_where(
            "WHERE reviewed_by = $1 ORDER BY decision_date DESC",
            &[reviewed_by],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(status: &str) -> RequestRow {
        RequestRow {
            id: Uuid::new_v4(),
            subject_type: "asset".to_string(),
            subject_id: "ASSET-123".to_string(),
            requested_by: "alice".to_string(),
            reviewed_by: None,
            status: status.to_string(),
            decision_date: None,
            comments: None,
            payload: serde_json::json!({"actionType": "disposal"}),
            supporting_docs: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_status_parsing() {
        let request = ReviewRequest::try_from(sample_row("in_review")).unwrap();
        assert_eq!(request.status, RequestStatus::InReview);
    }

    #[test]
    fn test_corrupt_status_is_reported_not_panicked() {
        let result = ReviewRequest::try_from(sample_row("garbage"));
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_table_name_comes_from_kind() {
        // the table name is a whitelisted constant, never caller input
        assert_eq!(WorkflowKind::Approval.table_name(), "approval_requests");
        assert_eq!(WorkflowKind::WarrantyClaim.table_name(), "warranty_claims");
    }
}
