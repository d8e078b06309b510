//! [`ServiceClient`]: [`UnitConverter`] implementation that connects to converterd over gRPC.
//!
//! All proto ↔ native type conversions are centralized in [`crate::server::convert`].

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, future};
use tonic::transport::Channel;
use tracing::warn;

use crate::harness::ConvertedStream;
use crate::server::convert::from_status;
use crate::server::proto;
use crate::server::proto::converter_client::ConverterClient;
use crate::traits::ValueStream;
use crate::{Conversion, Converted, ConverterError, Result, SeriesRequest, UnitConverter};

/// A [`UnitConverter`] client that connects to a remote converterd server.
///
/// The underlying channel is cheap to clone; each call uses its own clone,
/// so calls on one client may run concurrently.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    inner: ConverterClient<Channel>,
}

impl ServiceClient {
    /// Connect to a converterd server at the given address.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = ServiceClient::connect("http://127.0.0.1:5264").await?;
    /// ```
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        let inner = ConverterClient::connect(addr.clone())
            .await
            .map_err(|e| ConverterError::Transport(format!("failed to connect to {addr}: {e}")))?;
        Ok(Self { inner })
    }

    /// Query server health: `(healthy, version, git_sha)`.
    pub async fn health(&self) -> Result<(bool, String, Option<String>)> {
        let response = self
            .inner
            .clone()
            .health(proto::HealthRequest {})
            .await
            .map_err(from_status)?
            .into_inner();
        Ok((response.healthy, response.version, response.git_sha))
    }
}

#[async_trait]
impl UnitConverter for ServiceClient {
    async fn convert(&self, conversion: Conversion, value: f64) -> Result<Converted> {
        let mut client = self.inner.clone();
        let request = proto::ConvertRequest { value };
        let response = match conversion {
            Conversion::EuroToDollar => client.euro_to_dollar(request).await,
            Conversion::DollarToEuro => client.dollar_to_euro(request).await,
            Conversion::KmToMiles => client.km_to_miles(request).await,
            Conversion::MilesToKm => client.miles_to_km(request).await,
            Conversion::CelsiusToFahrenheit => client.celsius_to_fahrenheit(request).await,
            Conversion::FahrenheitToCelsius => client.fahrenheit_to_celsius(request).await,
        }
        .map_err(from_status)?;
        Ok(response.into_inner().into())
    }

    async fn convert_series(&self, request: SeriesRequest) -> Result<ConvertedStream> {
        let response = self
            .inner
            .clone()
            .get_multiple_temperature_conversions(proto::MultiConvertRequest::from(request))
            .await
            .map_err(from_status)?;
        let stream = response
            .into_inner()
            .map(|result| result.map(Into::into).map_err(from_status));
        Ok(Box::pin(stream))
    }

    async fn convert_stream(
        &self,
        conversion: Conversion,
        values: ValueStream,
    ) -> Result<ConvertedStream> {
        if conversion != Conversion::CelsiusToFahrenheit {
            return Err(ConverterError::Unsupported(format!(
                "{conversion} has no bidirectional stream"
            )));
        }

        // A local error cannot be sent to the server; it ends the request side.
        let outbound = values
            .take_while(|item| {
                if let Err(e) = item {
                    warn!(error = %e, "request stream failed, closing");
                }
                future::ready(item.is_ok())
            })
            .filter_map(|item| future::ready(item.ok().map(|value| proto::ConvertRequest { value })));

        let mut client = self.inner.clone();
        let response = celsius_to_fahrenheit_stream(&mut client, Box::pin(outbound))
            .await
            .map_err(from_status)?;
        let stream = response
            .into_inner()
            .map(|result| result.map(Into::into).map_err(from_status));
        Ok(Box::pin(stream))
    }
}

/// Issue the bidirectional call behind an opaque `Send` future; awaiting the
/// generated future directly inside an `#[async_trait]` body trips rustc's
/// higher-ranked auto-trait check.
fn celsius_to_fahrenheit_stream(
    client: &mut ConverterClient<Channel>,
    outbound: Pin<Box<dyn Stream<Item = proto::ConvertRequest> + Send>>,
) -> impl Future<
    Output = std::result::Result<
        tonic::Response<tonic::codec::Streaming<proto::ConvertResponse>>,
        tonic::Status,
    >,
> + Send
+ '_ {
    client.celsius_to_fahrenheit_stream(outbound)
}
