//! Conversions between converter native types and protobuf types.
//!
//! Shared by the server (proto → native for requests, native → proto for
//! responses) and the client (the reverse direction), so both sides agree
//! on the wire mapping.

use crate::{Conversion, Converted, ConverterError, SeriesRequest};

use super::proto;
use super::proto::multi_convert_request::ConversionType;

// =============================================================================
// Conversion selector
// =============================================================================

impl From<Conversion> for ConversionType {
    fn from(c: Conversion) -> Self {
        match c {
            Conversion::CelsiusToFahrenheit => ConversionType::CelsiusToFahrenheit,
            Conversion::FahrenheitToCelsius => ConversionType::FahrenheitToCelsius,
            Conversion::EuroToDollar => ConversionType::EuroToDollar,
            Conversion::DollarToEuro => ConversionType::DollarToEuro,
            Conversion::KmToMiles => ConversionType::KmToMiles,
            Conversion::MilesToKm => ConversionType::MilesToKm,
        }
    }
}

impl From<ConversionType> for Conversion {
    fn from(p: ConversionType) -> Self {
        match p {
            ConversionType::CelsiusToFahrenheit => Conversion::CelsiusToFahrenheit,
            ConversionType::FahrenheitToCelsius => Conversion::FahrenheitToCelsius,
            ConversionType::EuroToDollar => Conversion::EuroToDollar,
            ConversionType::DollarToEuro => Conversion::DollarToEuro,
            ConversionType::KmToMiles => Conversion::KmToMiles,
            ConversionType::MilesToKm => Conversion::MilesToKm,
        }
    }
}

/// Decode a raw wire selector. Unknown values are rejected, never skipped.
pub fn conversion_from_wire(value: i32) -> Result<Conversion, ConverterError> {
    ConversionType::try_from(value)
        .map(Into::into)
        .map_err(|_| ConverterError::UnknownConversion(value))
}

// =============================================================================
// Messages
// =============================================================================

impl From<Converted> for proto::ConvertResponse {
    fn from(c: Converted) -> Self {
        proto::ConvertResponse {
            result: c.result,
            description: c.description,
        }
    }
}

impl From<proto::ConvertResponse> for Converted {
    fn from(p: proto::ConvertResponse) -> Self {
        Converted {
            result: p.result,
            description: p.description,
        }
    }
}

impl From<SeriesRequest> for proto::MultiConvertRequest {
    fn from(r: SeriesRequest) -> Self {
        proto::MultiConvertRequest {
            start_value: r.start_value,
            count: r.count,
            conversion_type: ConversionType::from(r.conversion) as i32,
        }
    }
}

impl TryFrom<proto::MultiConvertRequest> for SeriesRequest {
    type Error = ConverterError;

    fn try_from(p: proto::MultiConvertRequest) -> Result<Self, Self::Error> {
        Ok(SeriesRequest {
            start_value: p.start_value,
            count: p.count,
            conversion: conversion_from_wire(p.conversion_type)?,
        })
    }
}

// =============================================================================
// Errors
// =============================================================================

impl From<ConverterError> for tonic::Status {
    fn from(e: ConverterError) -> Self {
        let message = e.to_string();
        match e {
            ConverterError::InvalidInput(_)
            | ConverterError::UnknownConversion(_)
            | ConverterError::SeriesTooLong { .. } => tonic::Status::invalid_argument(message),
            ConverterError::Unsupported(_) => tonic::Status::unimplemented(message),
            ConverterError::Configuration(_) => tonic::Status::failed_precondition(message),
            ConverterError::Transport(_) => tonic::Status::unavailable(message),
            ConverterError::Stream(_) | ConverterError::Rpc { .. } => {
                tonic::Status::internal(message)
            }
        }
    }
}

/// Convert [`tonic::Status`] to [`ConverterError`].
pub fn from_status(status: tonic::Status) -> ConverterError {
    match status.code() {
        tonic::Code::InvalidArgument => ConverterError::InvalidInput(status.message().to_string()),
        tonic::Code::Unimplemented => ConverterError::Unsupported(status.message().to_string()),
        tonic::Code::Unavailable => ConverterError::Transport(status.message().to_string()),
        code => ConverterError::Rpc {
            code: format!("{code:?}"),
            message: status.message().to_string(),
        },
    }
}
