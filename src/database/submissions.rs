//! Submission Repository - submissions and the payments they produce

use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::{PgExecutor, Row};

use crate::database::{parse_column, to_u32};
use crate::error::GigletResult;
use crate::models::{AiEvaluation, Payment, PaymentStatus, Submission, SubmissionStatus};

const SUBMISSION_COLUMNS: &str =
    "id, gig_id, creator_id, content_url, status, evaluation, created_at, updated_at";

pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> GigletResult<Option<Submission>> {
        fetch_submission(&self.pool, id, false).await
    }

    pub async fn list_for_gig(&self, gig_id: &str) -> GigletResult<Vec<Submission>> {
        list_for_gig(&self.pool, gig_id).await
    }

    pub async fn count_live(&self, gig_id: &str) -> GigletResult<u32> {
        count_live(&self.pool, gig_id, None).await
    }

    pub async fn list_payments_for_creator(&self, creator_id: &str) -> GigletResult<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, submission_id, gig_id, creator_id, brand_id, amount_cents, status, created_at
            FROM giglet.payments
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(payment_from_row).collect()
    }
}

fn live_statuses() -> Vec<&'static str> {
    SubmissionStatus::LIVE.iter().map(|s| s.as_str()).collect()
}

pub(crate) async fn fetch_submission<'e, E: PgExecutor<'e>>(
    executor: E,
    id: &str,
    for_update: bool,
) -> GigletResult<Option<Submission>> {
    let sql = format!(
        "SELECT {} FROM giglet.submissions WHERE id = $1{}",
        SUBMISSION_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(submission_from_row).transpose()
}

pub(crate) async fn list_for_gig<'e, E: PgExecutor<'e>>(
    executor: E,
    gig_id: &str,
) -> GigletResult<Vec<Submission>> {
    let sql = format!(
        "SELECT {} FROM giglet.submissions WHERE gig_id = $1 ORDER BY created_at",
        SUBMISSION_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(gig_id).fetch_all(executor).await?;
    rows.iter().map(submission_from_row).collect()
}

/// Live submissions on the gig, optionally excluding one creator's.
pub(crate) async fn count_live<'e, E: PgExecutor<'e>>(
    executor: E,
    gig_id: &str,
    excluding_creator: Option<&str>,
) -> GigletResult<u32> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM giglet.submissions
        WHERE gig_id = $1 AND status = ANY($2)
          AND ($3::TEXT IS NULL OR creator_id <> $3)
        "#,
    )
    .bind(gig_id)
    .bind(live_statuses())
    .bind(excluding_creator)
    .fetch_one(executor)
    .await?;

    to_u32(count, "count")
}

pub(crate) async fn count_approved<'e, E: PgExecutor<'e>>(
    executor: E,
    gig_id: &str,
) -> GigletResult<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM giglet.submissions WHERE gig_id = $1 AND status = $2",
    )
    .bind(gig_id)
    .bind(SubmissionStatus::Approved.as_str())
    .fetch_one(executor)
    .await?;

    to_u32(count, "count")
}

pub(crate) async fn insert_submission<'e, E: PgExecutor<'e>>(
    executor: E,
    submission: &Submission,
) -> GigletResult<()> {
    sqlx::query(
        r#"
        INSERT INTO giglet.submissions
            (id, gig_id, creator_id, content_url, status, evaluation, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&submission.id)
    .bind(&submission.gig_id)
    .bind(&submission.creator_id)
    .bind(&submission.content_url)
    .bind(submission.status.as_str())
    .bind(submission.evaluation.clone().map(Json))
    .bind(submission.created_at)
    .bind(submission.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Write back the mutable fields of a submission.
pub(crate) async fn update_submission<'e, E: PgExecutor<'e>>(
    executor: E,
    submission: &Submission,
) -> GigletResult<()> {
    sqlx::query(
        r#"
        UPDATE giglet.submissions
        SET content_url = $2, status = $3, evaluation = $4, updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(&submission.id)
    .bind(&submission.content_url)
    .bind(submission.status.as_str())
    .bind(submission.evaluation.clone().map(Json))
    .bind(submission.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn insert_payment<'e, E: PgExecutor<'e>>(
    executor: E,
    payment: &Payment,
) -> GigletResult<()> {
    sqlx::query(
        r#"
        INSERT INTO giglet.payments
            (id, submission_id, gig_id, creator_id, brand_id, amount_cents, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.submission_id)
    .bind(&payment.gig_id)
    .bind(&payment.creator_id)
    .bind(&payment.brand_id)
    .bind(payment.amount_cents)
    .bind(payment.status.as_str())
    .bind(payment.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) fn submission_from_row(row: &PgRow) -> GigletResult<Submission> {
    let status: String = row.try_get("status")?;
    let evaluation: Option<Json<AiEvaluation>> = row.try_get("evaluation")?;

    Ok(Submission {
        id: row.try_get("id")?,
        gig_id: row.try_get("gig_id")?,
        creator_id: row.try_get("creator_id")?,
        content_url: row.try_get("content_url")?,
        status: parse_column(&status, "submission status", SubmissionStatus::parse)?,
        evaluation: evaluation.map(|e| e.0),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn payment_from_row(row: &PgRow) -> GigletResult<Payment> {
    let status: String = row.try_get("status")?;
    Ok(Payment {
        id: row.try_get("id")?,
        submission_id: row.try_get("submission_id")?,
        gig_id: row.try_get("gig_id")?,
        creator_id: row.try_get("creator_id")?,
        brand_id: row.try_get("brand_id")?,
        amount_cents: row.try_get("amount_cents")?,
        status: parse_column(&status, "payment status", PaymentStatus::parse)?,
        created_at: row.try_get("created_at")?,
    })
}
