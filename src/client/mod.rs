//! Client library for connecting to converterd.
//!
//! Provides [`ServiceClient`], which implements [`UnitConverter`](crate::UnitConverter)
//! by forwarding calls to a remote converterd instance over gRPC, and the
//! [`driver`] that exercises every call shape.

pub mod driver;
mod service_client;

pub use driver::{CallOutcome, CallReport, DemoOptions, DemoReport, run_demo};
pub use service_client::ServiceClient;
