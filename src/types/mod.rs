//! Public types for the converter API.

mod conversion;
mod response;

pub use conversion::{Conversion, EURO_TO_USD_RATE, KM_TO_MILES_RATE};
pub use response::{Converted, STREAMED_SUFFIX, SeriesRequest};
