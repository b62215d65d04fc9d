//! Gig Repository

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::{PgExecutor, Row};

use crate::database::{parse_column, to_u32};
use crate::error::{GigletError, GigletResult};
use crate::models::{Gig, GigRequirements, GigStatus, GigVisibility, PayoutStructure};

const GIG_COLUMNS: &str = "id, brand_id, title, description, payout, visibility, deadline, \
     accepted_submissions_limit, requirements, reimbursement, premium, compliance_required, \
     status, accepted_by, accepted_at, acceptances, created_at";

pub struct GigRepository {
    pool: PgPool,
}

impl GigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, gig: &Gig) -> GigletResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO giglet.gigs
                (id, brand_id, title, description, payout, visibility, deadline,
                 accepted_submissions_limit, requirements, reimbursement, premium,
                 compliance_required, status, accepted_by, accepted_at, acceptances, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&gig.id)
        .bind(&gig.brand_id)
        .bind(&gig.title)
        .bind(&gig.description)
        .bind(Json(gig.payout.clone()))
        .bind(Json(gig.visibility.clone()))
        .bind(gig.deadline)
        .bind(i64::from(gig.accepted_submissions_limit))
        .bind(Json(gig.requirements))
        .bind(gig.reimbursement)
        .bind(gig.premium)
        .bind(gig.compliance_required)
        .bind(gig.status.as_str())
        .bind(&gig.accepted_by)
        .bind(gig.accepted_at)
        .bind(&gig.acceptances)
        .bind(gig.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GigletError::Conflict(format!("Gig {} already exists", gig.id)));
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> GigletResult<Option<Gig>> {
        fetch_gig(&self.pool, id, false).await
    }

    /// Gigs not yet closed whose deadline is still ahead, newest first.
    pub async fn list_active(&self, now: DateTime<Utc>) -> GigletResult<Vec<Gig>> {
        let sql = format!(
            "SELECT {} FROM giglet.gigs WHERE status <> $1 AND deadline > $2 \
             ORDER BY created_at DESC",
            GIG_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(GigStatus::Closed.as_str())
            .bind(now)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(gig_from_row).collect()
    }
}

pub(crate) async fn fetch_gig<'e, E: PgExecutor<'e>>(
    executor: E,
    id: &str,
    for_update: bool,
) -> GigletResult<Option<Gig>> {
    let sql = format!(
        "SELECT {} FROM giglet.gigs WHERE id = $1{}",
        GIG_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(gig_from_row).transpose()
}

/// Persist the acceptance fields after `apply_acceptance` or a close.
pub(crate) async fn write_gig_state<'e, E: PgExecutor<'e>>(
    executor: E,
    gig: &Gig,
) -> GigletResult<()> {
    sqlx::query(
        r#"
        UPDATE giglet.gigs
        SET status = $2, accepted_by = $3, accepted_at = $4, acceptances = $5
        WHERE id = $1
        "#,
    )
    .bind(&gig.id)
    .bind(gig.status.as_str())
    .bind(&gig.accepted_by)
    .bind(gig.accepted_at)
    .bind(&gig.acceptances)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) fn gig_from_row(row: &PgRow) -> GigletResult<Gig> {
    let payout: Json<PayoutStructure> = row.try_get("payout")?;
    let visibility: Json<GigVisibility> = row.try_get("visibility")?;
    let requirements: Json<GigRequirements> = row.try_get("requirements")?;
    let status: String = row.try_get("status")?;

    Ok(Gig {
        id: row.try_get("id")?,
        brand_id: row.try_get("brand_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        payout: payout.0,
        visibility: visibility.0,
        deadline: row.try_get("deadline")?,
        accepted_submissions_limit: to_u32(
            row.try_get("accepted_submissions_limit")?,
            "accepted_submissions_limit",
        )?,
        requirements: requirements.0,
        reimbursement: row.try_get("reimbursement")?,
        premium: row.try_get("premium")?,
        compliance_required: row.try_get("compliance_required")?,
        status: parse_column(&status, "gig status", GigStatus::parse)?,
        accepted_by: row.try_get("accepted_by")?,
        accepted_at: row.try_get("accepted_at")?,
        acceptances: row.try_get("acceptances")?,
        created_at: row.try_get("created_at")?,
    })
}
