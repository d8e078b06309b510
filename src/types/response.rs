//! Request and response envelopes.

use serde::{Deserialize, Serialize};

use super::Conversion;
use crate::{ConverterError, Result};

/// Suffix appended to descriptions produced by the bidirectional stream.
pub const STREAMED_SUFFIX: &str = " (Streamed)";

/// The outcome of converting one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Converted {
    /// Converted value.
    pub result: f64,
    /// Both operands rendered with their units.
    pub description: String,
}

impl Converted {
    /// Convert `value`, rejecting NaN and infinities in either the input or
    /// the result.
    pub fn compute(conversion: Conversion, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ConverterError::InvalidInput(format!(
                "{conversion}: value must be finite, got {value}"
            )));
        }
        let result = conversion.apply(value);
        if !result.is_finite() {
            return Err(ConverterError::InvalidInput(format!(
                "{conversion}: {value} is out of range"
            )));
        }
        Ok(Self {
            result,
            description: conversion.describe(value, result),
        })
    }

    /// Mark the description as produced by a bidirectional stream.
    pub fn streamed(mut self) -> Self {
        self.description.push_str(STREAMED_SUFFIX);
        self
    }
}

/// A run of consecutive conversions: `start_value`, `start_value + 1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub start_value: f64,
    pub count: u32,
    pub conversion: Conversion,
}

impl SeriesRequest {
    pub fn new(conversion: Conversion, start_value: f64, count: u32) -> Self {
        Self {
            start_value,
            count,
            conversion,
        }
    }

    /// Input values in emission order.
    pub fn inputs(&self) -> impl Iterator<Item = f64> + use<> {
        let start = self.start_value;
        (0..self.count).map(move |i| start + f64::from(i))
    }

    /// Check the request against a length limit.
    pub fn validate(&self, max_len: u32) -> Result<()> {
        if !self.start_value.is_finite() {
            return Err(ConverterError::InvalidInput(format!(
                "start value must be finite, got {}",
                self.start_value
            )));
        }
        if self.count > max_len {
            return Err(ConverterError::SeriesTooLong {
                requested: self.count,
                limit: max_len,
            });
        }
        Ok(())
    }
}
