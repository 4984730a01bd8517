pub mod error;
pub mod response;

pub use error::{AppError, FieldError};
