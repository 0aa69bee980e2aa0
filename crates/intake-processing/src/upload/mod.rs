pub mod pipeline;

pub use pipeline::{UploadIntake, UploadIntakeBuilder};
