//! License lookup orchestration
//!
//! CRUD operations are thin store wrappers plus the configured comment. The
//! interesting path is `get_licenses_by_organization`: the fetch is guarded
//! by rate limiter → circuit breaker → retry → bulkhead (in that order, the
//! limiter first so shed load never skews breaker statistics), with a
//! timeout budget around the innermost operation. Any trip degrades to the
//! fallback list; the caller always gets a list.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use resilience::{
    with_retry_if, with_timeout, Bulkhead, BulkheadConfig, BulkheadError, CircuitBreaker,
    CircuitBreakerConfig, CircuitBreakerError, RateLimiter, RateLimiterConfig, RateLimiterError,
    RetryConfig, TimeoutElapsed,
};

use crate::clients::{ClientKind, OrganizationLookup};
use crate::config::ResilienceSettings;
use crate::context::RequestContext;
use crate::error::{AppError, Result};
use crate::models::License;
use crate::services::fault::SlowCallInjector;
use crate::store::LicenseStore;

pub const FALLBACK_LICENSE_ID: &str = "0000000-00-00000";
pub const FALLBACK_PRODUCT_NAME: &str = "Sorry no licensing information currently available";

/// The degraded response: one sentinel license for the requested
/// organization. Synchronous and infallible.
pub fn fallback_license_list(organization_id: &str) -> Vec<License> {
    vec![License {
        license_id: FALLBACK_LICENSE_ID.to_string(),
        organization_id: organization_id.to_string(),
        product_name: FALLBACK_PRODUCT_NAME.to_string(),
        ..License::default()
    }]
}

/// Policy stack for the license-list fetch. Process-wide: one instance
/// shared by every request.
pub struct LicenseListGuards {
    pub rate_limiter: RateLimiter,
    pub circuit_breaker: CircuitBreaker,
    pub retry: RetryConfig,
    pub bulkhead: Bulkhead,
    pub call_timeout: Duration,
}

impl LicenseListGuards {
    pub fn from_settings(settings: &ResilienceSettings) -> Self {
        Self {
            rate_limiter: RateLimiter::new(RateLimiterConfig {
                max_calls: settings.rate_limiter_max_calls,
                window: Duration::from_millis(settings.rate_limiter_window_ms),
            }),
            circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: settings.breaker_failure_threshold,
                success_threshold: settings.breaker_success_threshold,
                open_wait: Duration::from_millis(settings.breaker_open_wait_ms),
                error_rate_threshold: settings.breaker_error_rate_threshold,
                slow_call_rate_threshold: settings.breaker_slow_call_rate_threshold,
                slow_call_duration_threshold: Duration::from_millis(
                    settings.breaker_slow_call_duration_ms,
                ),
                window_size: settings.breaker_window_size,
            }),
            retry: RetryConfig {
                max_retries: settings.retry_max_retries,
                initial_backoff: Duration::from_millis(settings.retry_initial_backoff_ms),
                max_backoff: Duration::from_millis(settings.retry_max_backoff_ms),
                backoff_multiplier: 2.0,
                jitter: true,
            },
            bulkhead: Bulkhead::new(BulkheadConfig {
                max_concurrent_calls: settings.bulkhead_max_concurrent_calls,
                max_queue_depth: settings.bulkhead_max_queue_depth,
            }),
            call_timeout: Duration::from_millis(settings.call_timeout_ms),
        }
    }
}

/// One attempt at the isolated license-list fetch.
/// Only timeouts are retryable: a saturated bulkhead or a broken store will
/// not get better within a retry budget.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("License list fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Bulkhead(#[from] BulkheadError),

    #[error("License store failure: {0}")]
    Store(String),
}

impl FetchError {
    fn is_retryable(error: &FetchError) -> bool {
        matches!(error, FetchError::Timeout(_))
    }
}

/// Why the guarded path fell back
#[derive(Debug, thiserror::Error)]
enum GuardTrip {
    #[error(transparent)]
    RateLimited(#[from] RateLimiterError),

    #[error(transparent)]
    Breaker(#[from] CircuitBreakerError),
}

pub struct LicenseService {
    store: Arc<dyn LicenseStore>,
    organizations: OrganizationLookup,
    guards: LicenseListGuards,
    fault: Arc<SlowCallInjector>,
    comment: String,
}

impl LicenseService {
    pub fn new(
        store: Arc<dyn LicenseStore>,
        organizations: OrganizationLookup,
        guards: LicenseListGuards,
        fault: Arc<SlowCallInjector>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            store,
            organizations,
            guards,
            fault,
            comment: comment.into(),
        }
    }

    /// Fetch one license and enrich it with organization data.
    /// Enrichment is best-effort: a failed or empty lookup leaves the stored
    /// contact fields untouched and is never fatal.
    pub async fn get_license(
        &self,
        license_id: &str,
        organization_id: &str,
        kind: ClientKind,
        ctx: &RequestContext,
    ) -> Result<License> {
        let mut license = self
            .store
            .find_by_keys(organization_id, license_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Unable to retrieve license information. Searched license id {} and organization id {}.",
                    license_id, organization_id
                ))
            })?;

        match self
            .organizations
            .fetch(organization_id, kind, &ctx.auth_token)
            .await
        {
            Ok(Some(organization)) => {
                license.organization_name = organization.name;
                license.contact_name = organization.contact_name;
                license.contact_email = organization.contact_email;
                license.contact_phone = organization.contact_phone;
            }
            Ok(None) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    organization_id, "No organization data found; returning license unenriched"
                );
            }
            Err(e) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    organization_id, "Organization lookup failed, skipping enrichment: {}", e
                );
            }
        }

        Ok(license.with_comment(&self.comment))
    }

    /// Persist a new license. Any client-supplied id is ignored; the id is
    /// assigned exactly once, here.
    pub async fn create_license(&self, mut license: License) -> Result<License> {
        license.license_id = Uuid::new_v4().to_string();
        self.store.save(&license).await?;
        Ok(license.with_comment(&self.comment))
    }

    /// Full-overwrite update, no partial-field merge
    pub async fn update_license(&self, license: License) -> Result<License> {
        self.store.save(&license).await?;
        Ok(license.with_comment(&self.comment))
    }

    /// Delete by license id; the organization id only feeds the
    /// confirmation message (observed upstream contract, preserved as-is).
    pub async fn delete_license(&self, license_id: &str, organization_id: &str) -> Result<String> {
        self.store.delete_by_license_id(license_id).await?;
        Ok(format!(
            "Deleting license with id {} for the organization {}",
            license_id, organization_id
        ))
    }

    /// The guarded list fetch. Never errors: every trip in the policy stack
    /// degrades to the fallback list.
    pub async fn get_licenses_by_organization(
        &self,
        organization_id: &str,
        ctx: &RequestContext,
    ) -> Vec<License> {
        match self.guarded_license_list(organization_id, ctx).await {
            Ok(licenses) => licenses,
            Err(trip) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    organization_id, "Degrading license list to fallback: {}", trip
                );
                fallback_license_list(organization_id)
            }
        }
    }

    /// Current circuit state of the list path (for monitoring)
    pub fn list_circuit_state(&self) -> resilience::CircuitState {
        self.guards.circuit_breaker.state()
    }

    async fn guarded_license_list(
        &self,
        organization_id: &str,
        ctx: &RequestContext,
    ) -> std::result::Result<Vec<License>, GuardTrip> {
        self.guards.rate_limiter.try_acquire()?;

        let licenses = self
            .guards
            .circuit_breaker
            .call(|| async {
                with_retry_if(self.guards.retry.clone(), FetchError::is_retryable, || {
                    self.fetch_list_isolated(organization_id, ctx)
                })
                .await
            })
            .await?;

        Ok(licenses)
    }

    async fn fetch_list_isolated(
        &self,
        organization_id: &str,
        ctx: &RequestContext,
    ) -> std::result::Result<Vec<License>, FetchError> {
        let store = Arc::clone(&self.store);
        let fault = Arc::clone(&self.fault);
        let organization_id = organization_id.to_string();
        let budget = self.guards.call_timeout;
        // The bulkhead runs this on its own task, which inherits nothing
        // from the request task; the context rides along explicitly or the
        // correlation id is lost from the worker's logs.
        let ctx = ctx.clone();

        let outcome = self
            .guards
            .bulkhead
            .call(async move {
                debug!(
                    correlation_id = %ctx.correlation_id,
                    organization_id = %organization_id,
                    "Fetching license list on isolated worker"
                );
                with_timeout(budget, async move {
                    fault.maybe_stall().await;
                    store.find_all_by_organization(&organization_id).await
                })
                .await
            })
            .await?;

        match outcome {
            Ok(Ok(licenses)) => Ok(licenses),
            Ok(Err(e)) => Err(FetchError::Store(e.to_string())),
            Err(TimeoutElapsed(budget)) => Err(FetchError::Timeout(budget)),
        }
    }
}
