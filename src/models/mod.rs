//! Marketplace records
//!
//! Explicit record types for every persisted entity. Enum-valued fields are
//! stored as snake_case strings; `as_str`/`parse` are the mapping used at the
//! store boundary.

mod creator;
mod gig;
mod payment;
mod squad;
mod submission;
mod user;

pub use creator::{Creator, SocialConnections, VerificationFlags};
pub use gig::{Gig, GigRequirements, GigStatus, GigVisibility, PayoutStructure, PayoutTier};
pub use payment::{Payment, PaymentStatus};
pub use squad::{Squad, SquadStats};
pub use submission::{AiEvaluation, Submission, SubmissionStatus};
pub use user::{User, UserRole};

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
