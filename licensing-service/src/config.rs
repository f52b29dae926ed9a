//! Configuration management for the licensing service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)
//!
//! Every policy threshold (rate limiter, circuit breaker, retry, bulkhead,
//! call timeout) and the fault-injection knobs are externally tunable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub organization: OrganizationServiceSettings,
    pub license: LicenseSettings,
    pub resilience: ResilienceSettings,
    pub fault: FaultSettings,
}

impl Settings {
    /// Load settings from environment variables (and a .env file in
    /// development builds).
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
            info!("Loaded .env file for development");
        }

        Ok(Settings {
            server: ServerSettings::from_env()?,
            organization: OrganizationServiceSettings::from_env()?,
            license: LicenseSettings::from_env(),
            resilience: ResilienceSettings::from_env()?,
            fault: FaultSettings::from_env()?,
        })
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("LICENSING_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("LICENSING_SERVICE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid LICENSING_SERVICE_PORT")?,
        })
    }
}

/// How to reach the organization service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationServiceSettings {
    /// Statically configured base URL (direct client, and what the static
    /// registry hands out for the logical name)
    pub url: String,
    /// Logical service name used by the discovery-backed clients
    pub service_name: String,
    /// Transport tag used when a request does not name one
    pub default_client_tag: String,
}

impl OrganizationServiceSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("ORGANIZATION_SERVICE_URL")
                .context("ORGANIZATION_SERVICE_URL must be set")?,
            service_name: env::var("ORGANIZATION_SERVICE_NAME")
                .unwrap_or_else(|_| "organization-service".to_string()),
            default_client_tag: env::var("ORGANIZATION_CLIENT_TYPE")
                .unwrap_or_else(|_| "rest".to_string()),
        })
    }
}

/// Service-level license settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSettings {
    /// Informational comment attached to every returned license
    pub comment: String,
}

impl LicenseSettings {
    fn from_env() -> Self {
        Self {
            comment: env::var("LICENSE_SERVICE_COMMENT")
                .unwrap_or_else(|_| "I am a property read from the licensing configuration".to_string()),
        }
    }
}

/// Thresholds for the policy stack guarding the license-list fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceSettings {
    pub rate_limiter_max_calls: u32,
    pub rate_limiter_window_ms: u64,
    pub breaker_failure_threshold: u32,
    pub breaker_success_threshold: u32,
    pub breaker_open_wait_ms: u64,
    pub breaker_error_rate_threshold: f64,
    pub breaker_slow_call_rate_threshold: f64,
    pub breaker_slow_call_duration_ms: u64,
    pub breaker_window_size: usize,
    pub retry_max_retries: u32,
    pub retry_initial_backoff_ms: u64,
    pub retry_max_backoff_ms: u64,
    pub bulkhead_max_concurrent_calls: usize,
    pub bulkhead_max_queue_depth: usize,
    pub call_timeout_ms: u64,
}

impl ResilienceSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            rate_limiter_max_calls: env::var("RATE_LIMITER_MAX_CALLS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("Invalid RATE_LIMITER_MAX_CALLS")?,
            rate_limiter_window_ms: env::var("RATE_LIMITER_WINDOW_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Invalid RATE_LIMITER_WINDOW_MS")?,
            breaker_failure_threshold: env::var("BREAKER_FAILURE_THRESHOLD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid BREAKER_FAILURE_THRESHOLD")?,
            breaker_success_threshold: env::var("BREAKER_SUCCESS_THRESHOLD")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("Invalid BREAKER_SUCCESS_THRESHOLD")?,
            breaker_open_wait_ms: env::var("BREAKER_OPEN_WAIT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .context("Invalid BREAKER_OPEN_WAIT_MS")?,
            breaker_error_rate_threshold: env::var("BREAKER_ERROR_RATE_THRESHOLD")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .context("Invalid BREAKER_ERROR_RATE_THRESHOLD")?,
            breaker_slow_call_rate_threshold: env::var("BREAKER_SLOW_CALL_RATE_THRESHOLD")
                .unwrap_or_else(|_| "0.6".to_string())
                .parse()
                .context("Invalid BREAKER_SLOW_CALL_RATE_THRESHOLD")?,
            breaker_slow_call_duration_ms: env::var("BREAKER_SLOW_CALL_DURATION_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("Invalid BREAKER_SLOW_CALL_DURATION_MS")?,
            breaker_window_size: env::var("BREAKER_WINDOW_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid BREAKER_WINDOW_SIZE")?,
            retry_max_retries: env::var("RETRY_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid RETRY_MAX_RETRIES")?,
            retry_initial_backoff_ms: env::var("RETRY_INITIAL_BACKOFF_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid RETRY_INITIAL_BACKOFF_MS")?,
            retry_max_backoff_ms: env::var("RETRY_MAX_BACKOFF_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("Invalid RETRY_MAX_BACKOFF_MS")?,
            bulkhead_max_concurrent_calls: env::var("BULKHEAD_MAX_CONCURRENT_CALLS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid BULKHEAD_MAX_CONCURRENT_CALLS")?,
            bulkhead_max_queue_depth: env::var("BULKHEAD_MAX_QUEUE_DEPTH")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid BULKHEAD_MAX_QUEUE_DEPTH")?,
            call_timeout_ms: env::var("LICENSE_LIST_TIMEOUT_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("Invalid LICENSE_LIST_TIMEOUT_MS")?,
        })
    }
}

/// Slow-call fault injection for exercising the policy stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultSettings {
    pub enabled: bool,
    /// The stall fires on roughly one call in this many
    pub one_in: u32,
    pub delay_ms: u64,
    /// Pin the RNG for deterministic behavior (tests, demos)
    pub seed: Option<u64>,
}

impl FaultSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            enabled: env::var("FAULT_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("Invalid FAULT_ENABLED")?,
            one_in: env::var("FAULT_ONE_IN")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid FAULT_ONE_IN")?,
            delay_ms: env::var("FAULT_DELAY_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid FAULT_DELAY_MS")?,
            seed: match env::var("FAULT_SEED") {
                Ok(raw) => Some(raw.parse().context("Invalid FAULT_SEED")?),
                Err(_) => None,
            },
        })
    }
}
