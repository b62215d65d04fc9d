//! Creator Repository - users and creator profiles

use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::{PgExecutor, Row};
use tracing::debug;

use crate::database::{parse_column, to_u32, to_u64};
use crate::error::{GigletError, GigletResult};
use crate::models::{Creator, SocialConnections, User, UserRole, VerificationFlags};

const CREATOR_COLUMNS: &str = "id, username, follower_count, rep, verification, socials, \
     balance_cents, squad_id, gigs_completed, created_at, updated_at";

pub struct CreatorRepository {
    pool: PgPool,
}

impl CreatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_user(&self, user: &User) -> GigletResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO giglet.users (id, email, role, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GigletError::Conflict(format!("User {} already exists", user.id)));
        }
        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> GigletResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, role, created_at FROM giglet.users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> GigletResult<User> {
            let role: String = row.try_get("role")?;
            Ok(User {
                id: row.try_get("id")?,
                email: row.try_get("email")?,
                role: parse_column(&role, "role", UserRole::parse)?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    pub async fn insert(&self, creator: &Creator) -> GigletResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO giglet.creators
                (id, username, follower_count, rep, verification, socials,
                 balance_cents, squad_id, gigs_completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&creator.id)
        .bind(&creator.username)
        .bind(creator.follower_count as i64)
        .bind(i64::from(creator.rep))
        .bind(Json(creator.verification))
        .bind(Json(creator.socials))
        .bind(creator.balance_cents)
        .bind(&creator.squad_id)
        .bind(i64::from(creator.gigs_completed))
        .bind(creator.created_at)
        .bind(creator.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GigletError::Conflict(format!(
                "Creator {} already exists",
                creator.id
            )));
        }
        debug!(creator_id = %creator.id, "Inserted creator");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> GigletResult<Option<Creator>> {
        fetch_creator(&self.pool, id, false).await
    }

    pub async fn update_profile(&self, creator: &Creator) -> GigletResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE giglet.creators
            SET username = $2, follower_count = $3, verification = $4, socials = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&creator.id)
        .bind(&creator.username)
        .bind(creator.follower_count as i64)
        .bind(Json(creator.verification))
        .bind(Json(creator.socials))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GigletError::not_found("creator", &creator.id));
        }
        Ok(())
    }
}

/// Load a creator, optionally taking its row lock.
pub(crate) async fn fetch_creator<'e, E: PgExecutor<'e>>(
    executor: E,
    id: &str,
    for_update: bool,
) -> GigletResult<Option<Creator>> {
    let sql = format!(
        "SELECT {} FROM giglet.creators WHERE id = $1{}",
        CREATOR_COLUMNS,
        if for_update { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(creator_from_row).transpose()
}

pub(crate) fn creator_from_row(row: &PgRow) -> GigletResult<Creator> {
    let verification: Json<VerificationFlags> = row.try_get("verification")?;
    let socials: Json<SocialConnections> = row.try_get("socials")?;
    Ok(Creator {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        follower_count: to_u64(row.try_get("follower_count")?, "follower_count")?,
        rep: to_u32(row.try_get("rep")?, "rep")?,
        verification: verification.0,
        socials: socials.0,
        balance_cents: row.try_get("balance_cents")?,
        squad_id: row.try_get("squad_id")?,
        gigs_completed: to_u32(row.try_get("gigs_completed")?, "gigs_completed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
