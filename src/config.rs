use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::api::SecurityMiddlewareConfig;
use crate::reputation::{ReputationThresholds, TrustThresholds};

/// Service configuration, read from `GIGLET_*` environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigletConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub reputation: ReputationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_auth: bool,
    /// Keys accepted in `x-api-key` / `Authorization: Bearer`
    pub api_keys: Vec<String>,
    /// Key for admin endpoints; admin endpoints are off when unset
    pub admin_api_key: Option<String>,
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub postgres_url: String,
    /// In-memory store when false
    pub postgres_enabled: bool,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub level: String,
    pub log_requests: bool,
    pub sanitize_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    pub early_access_step_minutes: i64,
    pub instant_payout_trust: u8,
    pub high_payout_trust: u8,
    pub premium_trust: u8,
    pub high_payout_cents: i64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        let thresholds = ReputationThresholds::default();
        Self {
            early_access_step_minutes: thresholds.early_access_step_minutes,
            instant_payout_trust: thresholds.trust.instant_payout,
            high_payout_trust: thresholds.trust.high_payout,
            premium_trust: thresholds.trust.premium,
            high_payout_cents: thresholds.high_payout_cents,
        }
    }
}

impl ReputationConfig {
    pub fn to_thresholds(&self) -> ReputationThresholds {
        ReputationThresholds {
            early_access_step_minutes: self.early_access_step_minutes,
            trust: TrustThresholds {
                instant_payout: self.instant_payout_trust,
                high_payout: self.high_payout_trust,
                premium: self.premium_trust,
            },
            high_payout_cents: self.high_payout_cents,
        }
    }
}

impl Default for GigletConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                enable_auth: true,
                api_keys: Vec::new(),
                admin_api_key: None,
                rate_limit_per_minute: 120,
                max_request_size: 256 * 1024,
            },
            database: DatabaseConfig {
                postgres_url: "postgres://localhost:5432/giglet".to_string(),
                postgres_enabled: false,
                max_connections: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: true,
                sanitize_logs: true,
            },
            reputation: ReputationConfig::default(),
        }
    }
}

impl GigletConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from defaults overridden by `lookup`, then validate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("GIGLET_HOST") {
            config.server.host = host;
        }
        parse_into(&lookup, "GIGLET_PORT", &mut config.server.port)?;

        parse_into(&lookup, "GIGLET_ENABLE_AUTH", &mut config.security.enable_auth)?;
        if let Some(keys) = lookup("GIGLET_API_KEYS") {
            config.security.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.security.admin_api_key = lookup("GIGLET_ADMIN_API_KEY").filter(|k| !k.is_empty());
        parse_into(
            &lookup,
            "GIGLET_RATE_LIMIT_PER_MINUTE",
            &mut config.security.rate_limit_per_minute,
        )?;
        parse_into(
            &lookup,
            "GIGLET_MAX_REQUEST_SIZE",
            &mut config.security.max_request_size,
        )?;

        if let Some(url) = lookup("GIGLET_POSTGRES_URL") {
            config.database.postgres_url = url;
        }
        parse_into(
            &lookup,
            "GIGLET_POSTGRES_ENABLED",
            &mut config.database.postgres_enabled,
        )?;
        parse_into(
            &lookup,
            "GIGLET_POSTGRES_MAX_CONNECTIONS",
            &mut config.database.max_connections,
        )?;

        if let Some(level) = lookup("GIGLET_LOG_LEVEL") {
            config.logging.level = level;
        }
        parse_into(&lookup, "GIGLET_LOG_REQUESTS", &mut config.logging.log_requests)?;
        parse_into(&lookup, "GIGLET_SANITIZE_LOGS", &mut config.logging.sanitize_logs)?;

        let rep = &mut config.reputation;
        parse_into(
            &lookup,
            "GIGLET_EARLY_ACCESS_STEP_MINUTES",
            &mut rep.early_access_step_minutes,
        )?;
        parse_into(
            &lookup,
            "GIGLET_TRUST_INSTANT_PAYOUT",
            &mut rep.instant_payout_trust,
        )?;
        parse_into(&lookup, "GIGLET_TRUST_HIGH_PAYOUT", &mut rep.high_payout_trust)?;
        parse_into(&lookup, "GIGLET_TRUST_PREMIUM", &mut rep.premium_trust)?;
        parse_into(
            &lookup,
            "GIGLET_HIGH_PAYOUT_CENTS",
            &mut rep.high_payout_cents,
        )?;

        if config.security.admin_api_key.is_none() {
            warn!("GIGLET_ADMIN_API_KEY not set, admin endpoints are disabled");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.security.enable_auth && self.security.api_keys.is_empty() {
            return Err(anyhow::anyhow!(
                "Authentication is enabled but GIGLET_API_KEYS is empty"
            ));
        }
        if let Some(short) = self.security.api_keys.iter().find(|k| k.len() < 16) {
            return Err(anyhow::anyhow!(
                "API key {} is too short (minimum 16 characters)",
                sanitize_for_logging(short)
            ));
        }
        if matches!(&self.security.admin_api_key, Some(key) if key.len() < 32) {
            return Err(anyhow::anyhow!(
                "Admin API key is too short (minimum 32 characters)"
            ));
        }
        if self.security.rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!("Rate limit must be non-zero"));
        }

        if self.database.postgres_enabled && self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!(
                "PostgreSQL is enabled but GIGLET_POSTGRES_URL is empty"
            ));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("max_connections must be non-zero"));
        }

        let rep = &self.reputation;
        if rep.early_access_step_minutes < 0 {
            return Err(anyhow::anyhow!(
                "Early-access step cannot be negative: {}",
                rep.early_access_step_minutes
            ));
        }
        for (name, value) in [
            ("instant payout", rep.instant_payout_trust),
            ("high payout", rep.high_payout_trust),
            ("premium", rep.premium_trust),
        ] {
            if value > 100 {
                return Err(anyhow::anyhow!(
                    "{} trust threshold must be at most 100, got {}",
                    name,
                    value
                ));
            }
        }
        if rep.high_payout_cents <= 0 {
            return Err(anyhow::anyhow!("High-payout threshold must be positive"));
        }

        Ok(())
    }

    pub fn middleware_config(&self) -> SecurityMiddlewareConfig {
        SecurityMiddlewareConfig {
            enable_auth: self.security.enable_auth,
            api_keys: self.security.api_keys.clone(),
            rate_limit_per_minute: self.security.rate_limit_per_minute,
            max_request_size: self.security.max_request_size,
            log_requests: self.logging.log_requests,
            sanitize_logs: self.logging.sanitize_logs,
            ..SecurityMiddlewareConfig::default()
        }
    }
}

fn parse_into<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(name) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value", name))?;
    }
    Ok(())
}

/// Mask values that look like credentials before they reach the logs.
pub fn sanitize_for_logging(data: &str) -> String {
    let sensitive_patterns = ["auth", "key", "token", "password", "secret", "credential"];

    let data_lower = data.to_lowercase();
    let looks_sensitive = sensitive_patterns.iter().any(|p| data_lower.contains(p));
    let chars: Vec<char> = data.chars().collect();
    if !looks_sensitive && chars.len() < 16 {
        return data.to_string();
    }

    let keep = if chars.len() > 20 { 6 } else { 2.min(chars.len() / 2) };
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const KEY: &str = "giglet-test-key-0001";

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("api_key_secret"), "ap***et");
        assert_eq!(sanitize_for_logging("normal_data"), "normal_data");
        assert_eq!(
            sanitize_for_logging("0123456789abcdefghijklmnop"),
            "012345***klmnop"
        );
    }

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = GigletConfig::from_lookup(lookup(&[
            ("GIGLET_PORT", "9090"),
            ("GIGLET_API_KEYS", &format!("{}, other-test-key-0002", KEY)),
            ("GIGLET_EARLY_ACCESS_STEP_MINUTES", "5"),
            ("GIGLET_HIGH_PAYOUT_CENTS", "100000"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.api_keys.len(), 2);
        let thresholds = config.reputation.to_thresholds();
        assert_eq!(thresholds.early_access_step_minutes, 5);
        assert_eq!(thresholds.high_payout_cents, 100_000);
        assert_eq!(thresholds.trust, TrustThresholds::default());
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = GigletConfig::from_lookup(lookup(&[
            ("GIGLET_API_KEYS", KEY),
            ("GIGLET_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GIGLET_PORT"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = GigletConfig::default();
        assert!(config.validate().is_err(), "auth without keys");

        config.security.api_keys = vec![KEY.to_string()];
        assert!(config.validate().is_ok());

        config.security.admin_api_key = Some("short".to_string());
        assert!(config.validate().is_err());

        config.security.admin_api_key = None;
        config.reputation.premium_trust = 120;
        assert!(config.validate().is_err());
    }
}
