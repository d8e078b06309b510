//! Converter - unit conversions over unary, server-streaming and
//! bidirectional-streaming calls.
//!
//! The crate provides a [`UnitConverter`] trait with two implementations:
//! [`EmbeddedConverter`], which runs the call handlers in-process, and
//! `client::ServiceClient`, which forwards calls to a `converterd` server
//! over gRPC. The server (`server::ConverterService`) wraps any
//! implementation.
//!
//! # Unary Example
//!
//! ```rust
//! use converter::{Conversion, Converter, UnitConverter};
//!
//! # #[tokio::main]
//! # async fn main() -> converter::Result<()> {
//! let converter = Converter::builder().build()?;
//! let reply = converter.convert(Conversion::EuroToDollar, 10.0).await?;
//! assert_eq!(reply.description, "10.00 EUR = 10.80 USD");
//! # Ok(())
//! # }
//! ```
//!
//! # Streaming Example
//!
//! ```rust
//! use converter::{Conversion, Converter, ConverterError, UnitConverter, ValueStream};
//! use futures_util::{StreamExt, stream};
//!
//! # #[tokio::main]
//! # async fn main() -> converter::Result<()> {
//! let converter = Converter::builder().build()?;
//! let values: ValueStream =
//!     Box::pin(stream::iter([0.0, 100.0].map(Ok::<_, ConverterError>)));
//! let mut replies = converter
//!     .convert_stream(Conversion::CelsiusToFahrenheit, values)
//!     .await?;
//! while let Some(reply) = replies.next().await {
//!     println!("{}", reply?.description);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod harness;
pub mod telemetry;
pub mod traits;
pub mod types;
mod version;

#[cfg(any(feature = "server", feature = "client"))]
pub mod server;

#[cfg(feature = "client")]
pub mod client;

// Re-export main types at crate root
pub use error::{ConverterError, Result};
pub use gateway::{Converter, ConverterBuilder, EmbeddedConverter};
pub use harness::{ConvertedStream, DuplexMonitor, DuplexState};
pub use traits::{UnitConverter, ValueStream};
pub use types::{Conversion, Converted, SeriesRequest};
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, git_sha, version_string};
