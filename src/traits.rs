//! Core UnitConverter trait

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::harness::ConvertedStream;
use crate::{Conversion, Converted, Result, SeriesRequest};

/// A stream of values to convert, one response per value.
///
/// An `Err` item (e.g. a transport failure on the request side) ends the
/// call and is forwarded to the response stream.
pub type ValueStream = Pin<Box<dyn Stream<Item = Result<f64>> + Send>>;

/// The conversion service method set.
///
/// Implemented in-process by [`EmbeddedConverter`](crate::EmbeddedConverter)
/// and over gRPC by `ServiceClient` (with the `client` feature). The gRPC
/// server wraps any implementation.
#[async_trait]
pub trait UnitConverter: Send + Sync {
    /// Convert a single value.
    async fn convert(&self, conversion: Conversion, value: f64) -> Result<Converted>;

    /// Convert `count` consecutive values starting at `start_value`.
    ///
    /// Invalid requests fail before the stream is returned.
    async fn convert_series(&self, request: SeriesRequest) -> Result<ConvertedStream>;

    /// Convert each value of `values` as it arrives.
    ///
    /// Responses come back in the order the values were sent and carry the
    /// streamed description suffix.
    async fn convert_stream(
        &self,
        conversion: Conversion,
        values: ValueStream,
    ) -> Result<ConvertedStream>;

    // ===== Convenience wrappers =====

    async fn euro_to_dollar(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::EuroToDollar, value).await
    }

    async fn dollar_to_euro(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::DollarToEuro, value).await
    }

    async fn km_to_miles(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::KmToMiles, value).await
    }

    async fn miles_to_km(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::MilesToKm, value).await
    }

    async fn celsius_to_fahrenheit(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::CelsiusToFahrenheit, value).await
    }

    async fn fahrenheit_to_celsius(&self, value: f64) -> Result<Converted> {
        self.convert(Conversion::FahrenheitToCelsius, value).await
    }
}
