use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Creator,
    Brand,
    Admin,
    Recruiter,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Creator => "creator",
            UserRole::Brand => "brand",
            UserRole::Admin => "admin",
            UserRole::Recruiter => "recruiter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "creator" => Some(UserRole::Creator),
            "brand" => Some(UserRole::Brand),
            "admin" => Some(UserRole::Admin),
            "recruiter" => Some(UserRole::Recruiter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: String, role: UserRole) -> Self {
        Self {
            id,
            email,
            role,
            created_at: Utc::now(),
        }
    }
}
