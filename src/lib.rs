pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod stability;
pub mod storage;

pub use client::{ClientState, DownloadFile, Egress, GenerationClient, Outcome, ProxyClient};
pub use config::{Config, ServerConfig, StabilityConfig, StorageConfig};
pub use error::{Result, SdError};
pub use models::{
    build_multipart_body, AspectRatio, FormPayload, GenerationRequest, GenerationResponse, Model,
    ModelInfo,
};
pub use stability::{ImageClient, StabilityClient};
pub use storage::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
