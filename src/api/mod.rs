pub mod client;
pub mod error;

pub use client::{HttpClient, PageRequest, ResourceApi};
pub use error::ApiError;
