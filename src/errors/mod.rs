//! Error types for the relationship service
//!
//! Every failure that reaches a caller is classified as one of three kinds:
//!
//! - **Validation**: malformed input (non-positive id, unknown relationship type)
//! - **NotFound**: the requested source entity does not exist
//! - **Internal**: storage access failed; the cause is logged, never returned
//!
//! # Examples
//!
//! ```rust
//! use fse::errors::ServiceError;
//!
//! let err = ServiceError::NotFound("Source entity not found".to_string());
//! assert!(err.is_not_found());
//! assert_eq!(err.error_code(), "NOT_FOUND");
//! ```

pub mod service;

pub use service::{ServiceError, UnknownVariant};

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
