//! Squad Repository

use sqlx::postgres::{PgPool, PgRow};
use sqlx::{PgExecutor, Row};

use crate::database::to_u32;
use crate::error::{GigletError, GigletResult};
use crate::models::{Squad, SquadStats};

const SQUAD_COLUMNS: &str =
    "id, name, owner_id, member_ids, gigs_completed, total_earned_cents, created_at";

pub struct SquadRepository {
    pool: PgPool,
}

impl SquadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> GigletResult<Option<Squad>> {
        fetch_squad(&self.pool, id, false).await
    }
}

pub(crate) async fn insert_squad<'e, E: PgExecutor<'e>>(
    executor: E,
    squad: &Squad,
) -> GigletResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO giglet.squads
            (id, name, owner_id, member_ids, gigs_completed, total_earned_cents, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&squad.id)
    .bind(&squad.name)
    .bind(&squad.owner_id)
    .bind(&squad.member_ids)
    .bind(i64::from(squad.stats.gigs_completed))
    .bind(squad.stats.total_earned_cents)
    .bind(squad.created_at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(GigletError::Conflict(format!("Squad {} already exists", squad.id)));
    }
    Ok(())
}

pub(crate) async fn fetch_squad<'e, E: PgExecutor<'e>>(
    executor: E,
    id: &str,
    for_update: bool,
) -> GigletResult<Option<Squad>> {
    let sql = format!(
        "SELECT {} FROM giglet.squads WHERE id = $1{}",
        SQUAD_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(squad_from_row).transpose()
}

fn squad_from_row(row: &PgRow) -> GigletResult<Squad> {
    Ok(Squad {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner_id: row.try_get("owner_id")?,
        member_ids: row.try_get("member_ids")?,
        stats: SquadStats {
            gigs_completed: to_u32(row.try_get("gigs_completed")?, "gigs_completed")?,
            total_earned_cents: row.try_get("total_earned_cents")?,
        },
        created_at: row.try_get("created_at")?,
    })
}
