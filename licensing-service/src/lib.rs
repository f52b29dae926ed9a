/// Licensing Service Library
///
/// Manages software licenses per organization, enriching them with data
/// fetched from the organization service over one of three interchangeable
/// transports. The license-list path is guarded by a resilience policy
/// stack (rate limiter, circuit breaker, retry, bulkhead) that degrades to
/// a fixed fallback list instead of erroring.
///
/// # Modules
///
/// - `handlers`: License HTTP request handlers
/// - `models`: License and organization data structures
/// - `services`: Business logic layer, including the guarded list fetch
/// - `store`: License persistence seam and in-memory implementation
/// - `clients`: Organization service clients and transport dispatch
/// - `context`: Request-scoped context middleware and extractor
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

pub use config::Settings;
pub use error::{AppError, Result};
