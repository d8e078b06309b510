//! gRPC service implementation.
//!
//! [`ConverterService`] adapts any [`UnitConverter`] to the generated
//! `Converter` service. Request validation happens before a stream is
//! returned, so invalid calls fail with `INVALID_ARGUMENT` instead of an
//! empty or truncated stream. Client cancellation reaches the handlers
//! through the dropped response stream.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, instrument};

use super::convert::from_status;
use super::proto;
use super::proto::converter_server::{Converter as ConverterRpc, ConverterServer};
use crate::harness::ConvertedStream;
use crate::{Conversion, ConverterError, SeriesRequest, UnitConverter};

/// Response stream type shared by both streaming methods.
pub type ProtoResponseStream =
    Pin<Box<dyn Stream<Item = Result<proto::ConvertResponse, Status>> + Send>>;

/// gRPC service that wraps a UnitConverter implementation.
pub struct ConverterService<G: UnitConverter> {
    converter: Arc<G>,
}

impl<G: UnitConverter + 'static> ConverterService<G> {
    /// Create a new service wrapping the given converter.
    pub fn new(converter: Arc<G>) -> Self {
        Self { converter }
    }

    /// Wrap the service in the generated tonic server.
    pub fn into_server(self) -> ConverterServer<Self> {
        ConverterServer::new(self)
    }

    async fn unary(
        &self,
        conversion: Conversion,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        let value = request.into_inner().value;
        let converted = self.converter.convert(conversion, value).await?;
        Ok(Response::new(converted.into()))
    }
}

fn to_proto_stream(stream: ConvertedStream) -> ProtoResponseStream {
    Box::pin(stream.map(|item| item.map(Into::into).map_err(Status::from)))
}

#[tonic::async_trait]
impl<G: UnitConverter + 'static> ConverterRpc for ConverterService<G> {
    #[instrument(skip_all, fields(rpc = "EuroToDollar"))]
    async fn euro_to_dollar(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::EuroToDollar, request).await
    }

    #[instrument(skip_all, fields(rpc = "DollarToEuro"))]
    async fn dollar_to_euro(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::DollarToEuro, request).await
    }

    #[instrument(skip_all, fields(rpc = "KmToMiles"))]
    async fn km_to_miles(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::KmToMiles, request).await
    }

    #[instrument(skip_all, fields(rpc = "MilesToKm"))]
    async fn miles_to_km(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::MilesToKm, request).await
    }

    #[instrument(skip_all, fields(rpc = "CelsiusToFahrenheit"))]
    async fn celsius_to_fahrenheit(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::CelsiusToFahrenheit, request).await
    }

    #[instrument(skip_all, fields(rpc = "FahrenheitToCelsius"))]
    async fn fahrenheit_to_celsius(
        &self,
        request: Request<proto::ConvertRequest>,
    ) -> Result<Response<proto::ConvertResponse>, Status> {
        self.unary(Conversion::FahrenheitToCelsius, request).await
    }

    type GetMultipleTemperatureConversionsStream = ProtoResponseStream;

    #[instrument(skip_all, fields(rpc = "GetMultipleTemperatureConversions"))]
    async fn get_multiple_temperature_conversions(
        &self,
        request: Request<proto::MultiConvertRequest>,
    ) -> Result<Response<Self::GetMultipleTemperatureConversionsStream>, Status> {
        let series = SeriesRequest::try_from(request.into_inner())?;
        let stream = self.converter.convert_series(series).await?;
        Ok(Response::new(to_proto_stream(stream)))
    }

    type CelsiusToFahrenheitStreamStream = ProtoResponseStream;

    #[instrument(skip_all, fields(rpc = "CelsiusToFahrenheitStream"))]
    async fn celsius_to_fahrenheit_stream(
        &self,
        request: Request<Streaming<proto::ConvertRequest>>,
    ) -> Result<Response<Self::CelsiusToFahrenheitStreamStream>, Status> {
        let inbound = request
            .into_inner()
            .map(|item| item.map(|r| r.value).map_err(from_status));
        let stream = self
            .converter
            .convert_stream(Conversion::CelsiusToFahrenheit, Box::pin(inbound))
            .await?;
        Ok(Response::new(to_proto_stream(stream)))
    }

    #[instrument(skip_all, fields(rpc = "Health"))]
    async fn health(
        &self,
        _request: Request<proto::HealthRequest>,
    ) -> Result<Response<proto::HealthResponse>, Status> {
        Ok(Response::new(proto::HealthResponse {
            healthy: true,
            version: crate::version_string(),
            git_sha: crate::git_sha().map(str::to_string),
        }))
    }
}

/// Serve `converter` on an already-bound listener until `shutdown` resolves.
pub async fn serve<G, F>(
    converter: Arc<G>,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ConverterError>
where
    G: UnitConverter + 'static,
    F: Future<Output = ()> + Send,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ConverterError::Transport(format!("listener has no address: {e}")))?;
    info!(%addr, "serving converter");

    Server::builder()
        .add_service(ConverterService::new(converter).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
        .map_err(|e| ConverterError::Transport(e.to_string()))
}
