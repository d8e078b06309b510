use converter::types::{EURO_TO_USD_RATE, KM_TO_MILES_RATE};
use converter::{Conversion, Converted, Converter, ConverterError, UnitConverter};

const SAMPLES: [f64; 9] = [0.0, 1.0, -1.0, 10.0, -40.0, 37.5, 100.0, 1e-6, 123456.789];

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_euro_to_dollar_is_exact_multiple() {
    for x in SAMPLES {
        assert_eq!(Conversion::EuroToDollar.apply(x), x * 1.08);
    }
    assert_eq!(EURO_TO_USD_RATE, 1.08);
}

#[test]
fn test_km_to_miles_uses_fixed_rate() {
    for x in SAMPLES {
        assert_eq!(Conversion::KmToMiles.apply(x), x * KM_TO_MILES_RATE);
    }
}

#[test]
fn test_every_conversion_round_trips_through_its_inverse() {
    for conversion in Conversion::ALL {
        for x in SAMPLES {
            let there = conversion.apply(x);
            let back = conversion.inverse().apply(there);
            assert!(
                approx_eq(back, x),
                "{conversion}: {x} -> {there} -> {back}"
            );
        }
    }
}

#[test]
fn test_temperature_round_trip_both_directions() {
    for x in SAMPLES {
        let c = Conversion::FahrenheitToCelsius.apply(x);
        assert!(approx_eq(Conversion::CelsiusToFahrenheit.apply(c), x));
        let f = Conversion::CelsiusToFahrenheit.apply(x);
        assert!(approx_eq(Conversion::FahrenheitToCelsius.apply(f), x));
    }
}

#[test]
fn test_descriptions_match_the_wire_format() {
    let cases = [
        (Conversion::EuroToDollar, 10.0, "10.00 EUR = 10.80 USD"),
        (Conversion::DollarToEuro, 10.8, "10.80 USD = 10.00 EUR"),
        (Conversion::KmToMiles, 100.0, "100.00 Km = 62.14 Miles"),
        (Conversion::MilesToKm, 62.14, "62.14 Miles = 100.00 Km"),
        (Conversion::CelsiusToFahrenheit, 20.0, "20.0°C = 68.0°F"),
        (Conversion::FahrenheitToCelsius, 68.0, "68.0°F = 20.0°C"),
    ];
    for (conversion, value, expected) in cases {
        let converted = Converted::compute(conversion, value).unwrap();
        assert_eq!(converted.description, expected);
    }
}

#[test]
fn test_description_is_deterministic() {
    for conversion in Conversion::ALL {
        let a = Converted::compute(conversion, -12.345).unwrap();
        let b = Converted::compute(conversion, -12.345).unwrap();
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn test_embedded_unary_wrappers() {
    let converter = Converter::builder().build().unwrap();

    let reply = converter.euro_to_dollar(10.0).await.unwrap();
    assert_eq!(reply.description, "10.00 EUR = 10.80 USD");

    let reply = converter.fahrenheit_to_celsius(-40.0).await.unwrap();
    assert_eq!(reply.result, -40.0);
    assert_eq!(reply.description, "-40.0°F = -40.0°C");

    let reply = converter.km_to_miles(0.0).await.unwrap();
    assert_eq!(reply.result, 0.0);
}

#[tokio::test]
async fn test_embedded_unary_rejects_non_finite() {
    let converter = Converter::builder().build().unwrap();
    let err = converter
        .convert(Conversion::DollarToEuro, f64::INFINITY)
        .await
        .unwrap_err();
    assert!(matches!(err, ConverterError::InvalidInput(_)));
}
