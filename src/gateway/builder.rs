//! Builder for configuring converter instances

use std::time::Duration;

use super::EmbeddedConverter;
use crate::harness::DEFAULT_STREAM_BUFFER;
use crate::{ConverterError, Result};

/// Default limit on the number of values one series call may request.
pub const DEFAULT_MAX_SERIES_LEN: u32 = 1000;

/// Main entry point for creating converter instances.
pub struct Converter;

impl Converter {
    /// Create a new builder for configuring the converter.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }
}

/// Builder for configuring converter instances.
#[derive(Debug, Clone)]
pub struct ConverterBuilder {
    series_pacing: Duration,
    stream_pacing: Duration,
    stream_buffer: usize,
    max_series_len: u32,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            series_pacing: Duration::ZERO,
            stream_pacing: Duration::ZERO,
            stream_buffer: DEFAULT_STREAM_BUFFER,
            max_series_len: DEFAULT_MAX_SERIES_LEN,
        }
    }

    /// Delay between responses of a series call (default: none).
    pub fn series_pacing(mut self, delay: Duration) -> Self {
        self.series_pacing = delay;
        self
    }

    /// Delay after each response of a duplex call (default: none).
    pub fn stream_pacing(mut self, delay: Duration) -> Self {
        self.stream_pacing = delay;
        self
    }

    /// Responses buffered per streaming call before the handler waits.
    pub fn stream_buffer(mut self, size: usize) -> Self {
        self.stream_buffer = size;
        self
    }

    /// Longest series a single call may request.
    pub fn max_series_len(mut self, len: u32) -> Self {
        self.max_series_len = len;
        self
    }

    /// Build the converter.
    pub fn build(self) -> Result<EmbeddedConverter> {
        if self.stream_buffer == 0 {
            return Err(ConverterError::Configuration(
                "stream buffer must hold at least one response".to_string(),
            ));
        }
        if self.max_series_len == 0 {
            return Err(ConverterError::Configuration(
                "max series length must be at least 1".to_string(),
            ));
        }
        Ok(EmbeddedConverter::new(
            self.series_pacing,
            self.stream_pacing,
            self.stream_buffer,
            self.max_series_len,
        ))
    }
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
