//! Converter implementations

mod builder;
mod embedded;

pub use builder::{Converter, ConverterBuilder, DEFAULT_MAX_SERIES_LEN};
pub use embedded::EmbeddedConverter;
