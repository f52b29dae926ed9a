//! Business logic layer

pub mod fault;
pub mod licenses;

pub use fault::SlowCallInjector;
pub use licenses::{
    fallback_license_list, LicenseListGuards, LicenseService, FALLBACK_LICENSE_ID,
    FALLBACK_PRODUCT_NAME,
};
