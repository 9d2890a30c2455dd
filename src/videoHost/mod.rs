// Video hosting collaborator: upload endpoints and the asset list

pub mod mux;
pub mod types;

use std::future::Future;

pub use mux::MuxClient;
pub use types::*;

/// The video hosting service backing the library
pub trait VideoHost: Send + Sync {
    /// Create a direct-upload endpoint accepting browser uploads from
    /// `cors_origin`
    fn create_upload(
        &self,
        cors_origin: &str,
    ) -> impl Future<Output = Result<Upload, VideoHostError>> + Send;

    fn list_assets(&self) -> impl Future<Output = Result<Vec<Video>, VideoHostError>> + Send;
}
