//! Database Connection Pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::database::creators::CreatorRepository;
use crate::database::gigs::GigRepository;
use crate::database::squads::SquadRepository;
use crate::database::submissions::SubmissionRepository;
use crate::error::{GigletError, GigletResult};

pub struct DatabasePool {
    pool: PgPool,
    creators: CreatorRepository,
    gigs: GigRepository,
    submissions: SubmissionRepository,
    squads: SquadRepository,
}

impl DatabasePool {
    pub async fn new(connection_string: &str, max_connections: u32) -> GigletResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| GigletError::Store(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!(max_connections = max_connections, "Connected to PostgreSQL");

        Ok(Self {
            creators: CreatorRepository::new(pool.clone()),
            gigs: GigRepository::new(pool.clone()),
            submissions: SubmissionRepository::new(pool.clone()),
            squads: SquadRepository::new(pool.clone()),
            pool,
        })
    }

    pub async fn init_schema(&self) -> GigletResult<()> {
        info!("Initializing database schema...");

        let statements: [(&str, &str); 9] = [
            ("schema", "CREATE SCHEMA IF NOT EXISTS giglet"),
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.users (
                    id VARCHAR(64) PRIMARY KEY,
                    email VARCHAR(255) NOT NULL,
                    role VARCHAR(16) NOT NULL,
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "creators table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.creators (
                    id VARCHAR(64) PRIMARY KEY,
                    username VARCHAR(255) NOT NULL,
                    follower_count BIGINT NOT NULL DEFAULT 0,
                    rep BIGINT NOT NULL DEFAULT 0 CHECK (rep >= 0),
                    verification JSONB NOT NULL,
                    socials JSONB NOT NULL,
                    balance_cents BIGINT NOT NULL DEFAULT 0,
                    squad_id VARCHAR(64),
                    gigs_completed BIGINT NOT NULL DEFAULT 0,
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "gigs table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.gigs (
                    id VARCHAR(64) PRIMARY KEY,
                    brand_id VARCHAR(64) NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    payout JSONB NOT NULL,
                    visibility JSONB NOT NULL,
                    deadline TIMESTAMP WITH TIME ZONE NOT NULL,
                    accepted_submissions_limit BIGINT NOT NULL CHECK (accepted_submissions_limit >= 1),
                    requirements JSONB NOT NULL,
                    reimbursement BOOLEAN NOT NULL DEFAULT FALSE,
                    premium BOOLEAN NOT NULL DEFAULT FALSE,
                    compliance_required BOOLEAN NOT NULL DEFAULT FALSE,
                    status VARCHAR(16) NOT NULL,
                    accepted_by VARCHAR(64),
                    accepted_at TIMESTAMP WITH TIME ZONE,
                    acceptances TEXT[] NOT NULL DEFAULT '{}',
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "submissions table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.submissions (
                    id VARCHAR(64) PRIMARY KEY,
                    gig_id VARCHAR(64) NOT NULL REFERENCES giglet.gigs(id),
                    creator_id VARCHAR(64) NOT NULL REFERENCES giglet.creators(id),
                    content_url TEXT NOT NULL,
                    status VARCHAR(16) NOT NULL,
                    evaluation JSONB,
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "payments table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.payments (
                    id VARCHAR(64) PRIMARY KEY,
                    submission_id VARCHAR(64) NOT NULL UNIQUE REFERENCES giglet.submissions(id),
                    gig_id VARCHAR(64) NOT NULL,
                    creator_id VARCHAR(64) NOT NULL,
                    brand_id VARCHAR(64) NOT NULL,
                    amount_cents BIGINT NOT NULL,
                    status VARCHAR(16) NOT NULL,
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "squads table",
                r#"
                CREATE TABLE IF NOT EXISTS giglet.squads (
                    id VARCHAR(64) PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    owner_id VARCHAR(64) NOT NULL,
                    member_ids TEXT[] NOT NULL DEFAULT '{}',
                    gigs_completed BIGINT NOT NULL DEFAULT 0,
                    total_earned_cents BIGINT NOT NULL DEFAULT 0,
                    created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "submissions index",
                "CREATE INDEX IF NOT EXISTS idx_submissions_gig ON giglet.submissions(gig_id, status)",
            ),
            (
                "gigs index",
                "CREATE INDEX IF NOT EXISTS idx_gigs_active ON giglet.gigs(status, deadline)",
            ),
        ];

        for (name, sql) in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| GigletError::Store(format!("Failed to create {}: {}", name, e)))?;
        }

        info!("Database schema initialized");
        Ok(())
    }

    pub fn creators(&self) -> &CreatorRepository {
        &self.creators
    }

    pub fn gigs(&self) -> &GigRepository {
        &self.gigs
    }

    pub fn submissions(&self) -> &SubmissionRepository {
        &self.submissions
    }

    pub fn squads(&self) -> &SquadRepository {
        &self.squads
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
