//! Account registration and creator profile edits.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{GigletError, GigletResult};
use crate::models::{Creator, SocialConnections, User, UserRole, VerificationFlags, new_id};
use crate::store::MarketplaceStore;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCreator {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub verification: VerificationFlags,
    #[serde(default)]
    pub socials: SocialConnections,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub follower_count: Option<u64>,
    pub verification: Option<VerificationFlags>,
    pub socials: Option<SocialConnections>,
}

pub struct AccountService {
    store: Arc<dyn MarketplaceStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn register_user(&self, email: &str, role: UserRole) -> GigletResult<User> {
        validate_email(email)?;
        let user = User::new(new_id(), email.trim().to_lowercase(), role);
        self.store.insert_user(&user).await?;
        info!(user_id = %user.id, role = role.as_str(), "Registered user");
        Ok(user)
    }

    /// Create the user record and its creator profile.
    pub async fn register_creator(&self, request: RegisterCreator) -> GigletResult<Creator> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(GigletError::Validation("username is required".to_string()));
        }

        let user = self.register_user(&request.email, UserRole::Creator).await?;
        let creator = Creator::new(user.id, username.to_string())
            .with_followers(request.follower_count)
            .with_verification(request.verification)
            .with_socials(request.socials);
        self.store.insert_creator(&creator).await?;
        Ok(creator)
    }

    pub async fn update_profile(
        &self,
        creator_id: &str,
        update: ProfileUpdate,
    ) -> GigletResult<Creator> {
        let mut creator = self
            .store
            .get_creator(creator_id)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", creator_id))?;

        if let Some(username) = update.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(GigletError::Validation("username cannot be empty".to_string()));
            }
            creator.username = username.to_string();
        }
        if let Some(followers) = update.follower_count {
            creator.follower_count = followers;
        }
        if let Some(verification) = update.verification {
            creator.verification = verification;
        }
        if let Some(socials) = update.socials {
            creator.socials = socials;
        }

        self.store.update_creator_profile(&creator).await?;
        Ok(creator)
    }

    pub async fn get_user(&self, user_id: &str) -> GigletResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| GigletError::not_found("user", user_id))
    }
}

fn validate_email(email: &str) -> GigletResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(GigletError::Validation(format!("invalid email: {}", email))),
    }
}
