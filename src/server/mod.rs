//! gRPC server and shared proto types.
//!
//! This module provides:
//! - Generated protobuf types (`proto`) used by both server and client
//! - Type conversions between native and proto types (`convert`)
//! - The gRPC service implementation (`service`, server-only)
//! - Configuration types (`config`, server-only)

#[cfg(feature = "server")]
pub mod config;
pub mod convert;
#[cfg(feature = "server")]
pub mod service;

/// Re-exported generated proto types.
pub mod proto {
    tonic::include_proto!("converter.v1");
}

#[cfg(feature = "server")]
pub use service::ConverterService;
