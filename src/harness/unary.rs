//! Unary handler.

use std::time::Instant;

use tracing::{debug, warn};

use super::record_request;
use crate::{Conversion, Converted, Result};

/// Convert a single value.
pub fn unary(conversion: Conversion, value: f64) -> Result<Converted> {
    let start = Instant::now();
    debug!(%conversion, value, "converting");
    let result = Converted::compute(conversion, value);
    if let Err(ref e) = result {
        warn!(%conversion, error = %e, "rejected conversion request");
    }
    record_request("unary", conversion.name(), start, result.is_ok());
    result
}
