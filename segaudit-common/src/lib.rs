//! # segaudit Common Library
//!
//! Shared code for the segment audit tooling including:
//! - Record model and field name configuration
//! - Integer coercion shared by count and index validation
//! - Configuration loading
//! - Common error type

pub mod coerce;
pub mod config;
pub mod error;
pub mod record;

pub use coerce::IntegerCoercion;
pub use config::FieldNames;
pub use error::{Error, Result};
pub use record::Record;
