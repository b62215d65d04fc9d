//! Giglet Marketplace Core
//!
//! Backend for a user-generated-content marketplace: brands post paid gigs,
//! creators earn rep and trust that decide which gigs they see first and
//! which they may take, and a transactional acceptance gate keeps every gig
//! within its submission limit.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── error.rs       - Error type and HTTP mapping
//! ├── models/        - Persisted records (users, creators, gigs, ...)
//! ├── reputation/    - Rep levels, early access, trust score
//! │   ├── level.rs   - Level table
//! │   ├── events.rs  - Rep events and deltas
//! │   ├── access.rs  - Early-access delay
//! │   ├── trust.rs   - Trust score & gates
//! │   └── manager.rs - Reputation orchestrator
//! ├── gigs/          - Gig workflows
//! │   ├── acceptance.rs - Capacity rules run under lock
//! │   ├── visibility.rs - Audience and early-access gates
//! │   ├── eligibility.rs - Trust / follower / level requirements
//! │   ├── payout.rs     - Fixed and follower-tiered payouts
//! │   └── service.rs    - GigService
//! ├── accounts.rs    - Registration and profile updates
//! ├── squads.rs      - Squad service
//! ├── store/         - MarketplaceStore trait + in-memory backend
//! ├── database/      - PostgreSQL backend
//! └── api/           - HTTP API endpoints & middleware
//! ```

pub mod accounts;
pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod gigs;
pub mod models;
pub mod reputation;
pub mod squads;
pub mod store;

pub use accounts::{AccountService, ProfileUpdate, RegisterCreator};
pub use config::GigletConfig;
pub use database::DatabasePool;
pub use error::{ErrorCategory, GigletError, GigletResult};
pub use gigs::{GigService, NewGig, ReviewDecision, ReviewRequest};
pub use reputation::{RepEvent, ReputationManager, ReputationThresholds};
pub use squads::SquadService;
pub use store::{MarketplaceStore, MemoryStore};
