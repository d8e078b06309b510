//! Tests for the series and bidirectional call shapes.
//!
//! Run against the embedded converter so they exercise the handlers
//! without a transport. Pacing and cancellation tests use tokio's paused
//! clock so they don't depend on wall-clock timing.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use converter::{
    Conversion, Converted, Converter, ConverterError, DuplexState, Result, SeriesRequest,
    UnitConverter, ValueStream,
};

fn c_to_f(x: f64) -> f64 {
    x * 9.0 / 5.0 + 32.0
}

fn values(xs: &[f64]) -> ValueStream {
    Box::pin(stream::iter(xs.iter().copied().map(Ok).collect::<Vec<_>>()))
}

// ============================================================================
// Series
// ============================================================================

#[tokio::test]
async fn series_emits_count_ascending_results() {
    let converter = Converter::builder().build().unwrap();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 5);

    let items: Vec<Converted> = converter
        .convert_series(request)
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(items.len(), 5);
    for (i, item) in items.iter().enumerate() {
        let input = i as f64;
        assert_eq!(item.result, c_to_f(input));
        assert_eq!(item.description, Conversion::CelsiusToFahrenheit.describe(input, item.result));
    }
    assert!(items.windows(2).all(|w| w[0].result < w[1].result));
}

#[tokio::test]
async fn series_with_zero_count_is_empty() {
    let converter = Converter::builder().build().unwrap();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 0);
    let mut stream = converter.convert_series(request).await.unwrap();
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn series_supports_every_conversion() {
    let converter = Converter::builder().build().unwrap();
    for conversion in Conversion::ALL {
        let request = SeriesRequest::new(conversion, 10.0, 3);
        let items: Vec<Result<Converted>> =
            converter.convert_series(request).await.unwrap().collect().await;
        let results: Vec<f64> = items.into_iter().map(|r| r.unwrap().result).collect();
        let expected: Vec<f64> = [10.0, 11.0, 12.0].map(|x| conversion.apply(x)).to_vec();
        assert_eq!(results, expected, "{conversion}");
    }
}

#[tokio::test]
async fn series_over_limit_fails_before_streaming() {
    let converter = Converter::builder().max_series_len(3).build().unwrap();
    let request = SeriesRequest::new(Conversion::FahrenheitToCelsius, 0.0, 4);
    let result = converter.convert_series(request).await;
    assert!(matches!(
        result,
        Err(ConverterError::SeriesTooLong {
            requested: 4,
            limit: 3
        })
    ));
}

#[tokio::test]
async fn series_with_non_finite_start_fails_fast() {
    let converter = Converter::builder().build().unwrap();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, f64::NAN, 2);
    let result = converter.convert_series(request).await;
    assert!(matches!(result, Err(ConverterError::InvalidInput(_))));
}

#[tokio::test(start_paused = true)]
async fn cancelled_series_emits_a_strict_prefix() {
    let converter = Converter::builder()
        .series_pacing(Duration::from_millis(100))
        .build()
        .unwrap();
    let cancel = CancellationToken::new();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 5);
    let mut stream = converter.series_call(request, cancel.clone()).unwrap();

    let mut received = Vec::new();
    for _ in 0..2 {
        received.push(stream.next().await.unwrap().unwrap());
    }
    cancel.cancel();

    // Give a non-cancelling handler ample time to emit the rest.
    tokio::time::sleep(Duration::from_secs(5)).await;
    while let Some(item) = stream.next().await {
        received.push(item.unwrap());
    }

    assert!(received.len() <= 2, "got {} items", received.len());
    assert_eq!(received[0].result, 32.0);
    assert_eq!(received[1].result, c_to_f(1.0));
}

#[tokio::test(start_paused = true)]
async fn cancelled_series_without_pacing_drops_queued_items() {
    let converter = Converter::builder().build().unwrap();
    let cancel = CancellationToken::new();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 5);
    let mut stream = converter.series_call(request, cancel.clone()).unwrap();

    let mut received = Vec::new();
    for _ in 0..2 {
        received.push(stream.next().await.unwrap().unwrap());
    }
    // The producer has long since queued the remaining items.
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    while let Some(item) = stream.next().await {
        received.push(item.unwrap());
    }
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].result, c_to_f(1.0));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_running_series() {
    let converter = Converter::builder()
        .series_pacing(Duration::from_millis(100))
        .build()
        .unwrap();
    let request = SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 100);
    let mut stream = converter.convert_series(request).await.unwrap();

    assert!(stream.next().await.is_some());
    converter.shutdown();

    let rest = stream.count().await;
    assert!(rest < 99, "series kept running after shutdown: {rest} more items");
}

// ============================================================================
// Bidirectional stream
// ============================================================================

#[tokio::test]
async fn duplex_answers_each_value_in_order() {
    let converter = Converter::builder().build().unwrap();
    let inputs = [0.0, 10.0, 20.0, -5.0, 30.0];

    let items: Vec<Converted> = converter
        .convert_stream(Conversion::CelsiusToFahrenheit, values(&inputs))
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(items.len(), inputs.len());
    for (item, input) in items.iter().zip(inputs) {
        assert_eq!(item.result, c_to_f(input));
        assert!(item.description.ends_with(" (Streamed)"));
    }
    assert_eq!(items[3].description, "-5.0°C = 23.0°F (Streamed)");
}

#[tokio::test]
async fn duplex_reaches_closed_after_inbound_ends() {
    let converter = Converter::builder().build().unwrap();
    let (tx, rx) = mpsc::channel(1);
    let (mut responses, mut monitor) = converter.stream_call(
        Conversion::CelsiusToFahrenheit,
        ReceiverStream::new(rx),
        CancellationToken::new(),
    );
    assert_eq!(monitor.state(), DuplexState::Open);

    // Strict alternation: each send is answered before the next one.
    for value in [0.0, 10.0, 20.0, -5.0, 30.0] {
        tx.send(Ok(value)).await.unwrap();
        let reply = responses.next().await.unwrap().unwrap();
        assert_eq!(reply.result, c_to_f(value));
    }
    assert_eq!(monitor.state(), DuplexState::Open);

    drop(tx);
    assert!(responses.next().await.is_none());
    monitor.closed().await;
    assert_eq!(monitor.state(), DuplexState::Closed);
}

#[tokio::test]
async fn duplex_waits_for_each_request() {
    let converter = Converter::builder().build().unwrap();
    let (tx, rx) = mpsc::channel(1);
    let (mut responses, monitor) = converter.stream_call(
        Conversion::CelsiusToFahrenheit,
        ReceiverStream::new(rx),
        CancellationToken::new(),
    );

    {
        let mut next = tokio_test::task::spawn(responses.next());
        tokio_test::assert_pending!(next.poll());
    }

    tx.send(Ok(100.0)).await.unwrap();
    let reply = responses.next().await.unwrap().unwrap();
    assert_eq!(reply.description, "100.0°C = 212.0°F (Streamed)");
    assert_eq!(monitor.state(), DuplexState::Open);
}

#[tokio::test]
async fn duplex_does_not_need_all_requests_up_front() {
    // Capacity-1 channels on both sides: if the handler buffered every
    // request before answering, this would deadlock.
    let converter = Converter::builder().stream_buffer(1).build().unwrap();
    let (tx, rx) = mpsc::channel(1);
    let mut responses = converter
        .convert_stream(
            Conversion::CelsiusToFahrenheit,
            Box::pin(ReceiverStream::new(rx)),
        )
        .await
        .unwrap();

    let writer = tokio::spawn(async move {
        for i in 0..100 {
            tx.send(Ok(f64::from(i))).await.unwrap();
        }
    });

    let mut count = 0;
    while let Some(item) = responses.next().await {
        assert_eq!(item.unwrap().result, c_to_f(f64::from(count)));
        count += 1;
    }
    writer.await.unwrap();
    assert_eq!(count, 100);
}

#[tokio::test]
async fn duplex_rejects_non_finite_value_and_closes() {
    let converter = Converter::builder().build().unwrap();
    let inputs = [1.0, f64::NAN, 2.0];
    let items: Vec<Result<Converted>> = converter
        .convert_stream(Conversion::CelsiusToFahrenheit, values(&inputs))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(ConverterError::InvalidInput(_))));
}

#[tokio::test]
async fn duplex_forwards_inbound_failure() {
    let converter = Converter::builder().build().unwrap();
    let inbound: ValueStream = Box::pin(stream::iter(vec![
        Ok(5.0),
        Err(ConverterError::Transport("connection reset".into())),
        Ok(6.0),
    ]));
    let items: Vec<Result<Converted>> = converter
        .convert_stream(Conversion::CelsiusToFahrenheit, inbound)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert!(matches!(items[1], Err(ConverterError::Transport(_))));
}

#[tokio::test]
async fn cancelled_duplex_abandons_unread_requests() {
    let converter = Converter::builder().build().unwrap();
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(8);
    let (mut responses, mut monitor) = converter.stream_call(
        Conversion::CelsiusToFahrenheit,
        ReceiverStream::new(rx),
        cancel.clone(),
    );

    tx.send(Ok(1.0)).await.unwrap();
    assert!(responses.next().await.unwrap().is_ok());

    cancel.cancel();
    monitor.closed().await;

    // Requests sent after cancellation are never answered.
    let _ = tx.send(Ok(2.0)).await;
    assert!(responses.next().await.is_none());
}

#[tokio::test]
async fn cancelled_duplex_drops_responses_already_written() {
    let converter = Converter::builder().build().unwrap();
    let cancel = CancellationToken::new();
    let inbound = stream::iter([0.0, 10.0, 20.0, -5.0, 30.0].map(Ok::<_, ConverterError>));
    let (mut responses, mut monitor) =
        converter.stream_call(Conversion::CelsiusToFahrenheit, inbound, cancel.clone());

    let first = responses.next().await.unwrap().unwrap();
    assert_eq!(first.result, 32.0);

    // Every response is queued once the call has closed.
    monitor.closed().await;
    cancel.cancel();
    assert!(responses.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn duplex_pacing_does_not_reorder() {
    let converter = Converter::builder()
        .stream_pacing(Duration::from_millis(200))
        .build()
        .unwrap();
    let inputs = [3.0, 1.0, 2.0];
    let results: Vec<f64> = converter
        .convert_stream(Conversion::CelsiusToFahrenheit, values(&inputs))
        .await
        .unwrap()
        .map(|r| r.unwrap().result)
        .collect()
        .await;
    assert_eq!(results, inputs.map(c_to_f).to_vec());
}
