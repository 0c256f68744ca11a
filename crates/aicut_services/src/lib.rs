pub mod error;
pub mod image_gen;
pub mod probe;
pub mod transcription;

pub use error::{Result, ServiceError};
