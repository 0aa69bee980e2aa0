//! Intake Processing Library
//!
//! This crate runs the upload intake flow on top of the core types, storage and
//! services crates: validation (default and named custom validators) and the
//! `UploadIntake` pipeline that moves accepted files into place.

pub mod registry;
pub mod upload;
pub mod validator;

pub use registry::ValidatorRegistry;
pub use upload::{UploadIntake, UploadIntakeBuilder};
pub use validator::{DefaultValidator, Validation, Validator};
