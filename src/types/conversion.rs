//! The conversion set.
//!
//! Every conversion is a fixed-coefficient linear transform. Rates are
//! process-wide constants; there is no live-rate lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConverterError;

/// Dollars per euro.
pub const EURO_TO_USD_RATE: f64 = 1.08;

/// Miles per kilometre.
pub const KM_TO_MILES_RATE: f64 = 0.621371;

/// A single unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    EuroToDollar,
    DollarToEuro,
    KmToMiles,
    MilesToKm,
    CelsiusToFahrenheit,
    FahrenheitToCelsius,
}

impl Conversion {
    /// All conversions, in the order the service declares them.
    pub const ALL: [Conversion; 6] = [
        Conversion::EuroToDollar,
        Conversion::DollarToEuro,
        Conversion::KmToMiles,
        Conversion::MilesToKm,
        Conversion::CelsiusToFahrenheit,
        Conversion::FahrenheitToCelsius,
    ];

    /// Apply the conversion to `value`.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Conversion::EuroToDollar => value * EURO_TO_USD_RATE,
            Conversion::DollarToEuro => value / EURO_TO_USD_RATE,
            Conversion::KmToMiles => value * KM_TO_MILES_RATE,
            Conversion::MilesToKm => value / KM_TO_MILES_RATE,
            Conversion::CelsiusToFahrenheit => value * 9.0 / 5.0 + 32.0,
            Conversion::FahrenheitToCelsius => (value - 32.0) * 5.0 / 9.0,
        }
    }

    /// The conversion that undoes this one.
    pub fn inverse(self) -> Conversion {
        match self {
            Conversion::EuroToDollar => Conversion::DollarToEuro,
            Conversion::DollarToEuro => Conversion::EuroToDollar,
            Conversion::KmToMiles => Conversion::MilesToKm,
            Conversion::MilesToKm => Conversion::KmToMiles,
            Conversion::CelsiusToFahrenheit => Conversion::FahrenheitToCelsius,
            Conversion::FahrenheitToCelsius => Conversion::CelsiusToFahrenheit,
        }
    }

    /// Source and target unit labels as they appear in descriptions.
    pub fn units(self) -> (&'static str, &'static str) {
        match self {
            Conversion::EuroToDollar => ("EUR", "USD"),
            Conversion::DollarToEuro => ("USD", "EUR"),
            Conversion::KmToMiles => ("Km", "Miles"),
            Conversion::MilesToKm => ("Miles", "Km"),
            Conversion::CelsiusToFahrenheit => ("°C", "°F"),
            Conversion::FahrenheitToCelsius => ("°F", "°C"),
        }
    }

    /// Decimal places used when rendering both operands.
    pub fn precision(self) -> usize {
        if self.is_temperature() { 1 } else { 2 }
    }

    /// Whether this is one of the temperature conversions.
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            Conversion::CelsiusToFahrenheit | Conversion::FahrenheitToCelsius
        )
    }

    /// Render `value` and `result` as a human-readable line.
    ///
    /// Temperatures attach the degree unit directly (`20.0°C = 68.0°F`);
    /// other units are separated by a space (`10.00 EUR = 10.80 USD`).
    pub fn describe(self, value: f64, result: f64) -> String {
        let (from, to) = self.units();
        let p = self.precision();
        if self.is_temperature() {
            format!("{value:.p$}{from} = {result:.p$}{to}")
        } else {
            format!("{value:.p$} {from} = {result:.p$} {to}")
        }
    }

    /// Stable snake_case name, used for metric labels and logs.
    pub fn name(self) -> &'static str {
        match self {
            Conversion::EuroToDollar => "euro_to_dollar",
            Conversion::DollarToEuro => "dollar_to_euro",
            Conversion::KmToMiles => "km_to_miles",
            Conversion::MilesToKm => "miles_to_km",
            Conversion::CelsiusToFahrenheit => "celsius_to_fahrenheit",
            Conversion::FahrenheitToCelsius => "fahrenheit_to_celsius",
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Conversion {
    type Err = ConverterError;

    /// Accepts the snake_case name, its kebab-case form, or a short alias
    /// such as `c2f` or `eur-usd`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let conversion = match normalized.as_str() {
            "euro_to_dollar" | "eur_usd" | "eur2usd" => Conversion::EuroToDollar,
            "dollar_to_euro" | "usd_eur" | "usd2eur" => Conversion::DollarToEuro,
            "km_to_miles" | "km_mi" | "km2mi" => Conversion::KmToMiles,
            "miles_to_km" | "mi_km" | "mi2km" => Conversion::MilesToKm,
            "celsius_to_fahrenheit" | "c_f" | "c2f" => Conversion::CelsiusToFahrenheit,
            "fahrenheit_to_celsius" | "f_c" | "f2c" => Conversion::FahrenheitToCelsius,
            _ => {
                return Err(ConverterError::InvalidInput(format!(
                    "unknown conversion '{s}'"
                )));
            }
        };
        Ok(conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euro_to_dollar_uses_fixed_rate() {
        assert_eq!(Conversion::EuroToDollar.apply(10.0), 10.0 * 1.08);
        assert_eq!(Conversion::EuroToDollar.apply(0.0), 0.0);
    }

    #[test]
    fn freezing_and_boiling_points() {
        assert_eq!(Conversion::CelsiusToFahrenheit.apply(0.0), 32.0);
        assert_eq!(Conversion::CelsiusToFahrenheit.apply(100.0), 212.0);
        assert_eq!(Conversion::FahrenheitToCelsius.apply(212.0), 100.0);
        assert_eq!(Conversion::CelsiusToFahrenheit.apply(-40.0), -40.0);
    }

    #[test]
    fn inverse_is_an_involution() {
        for conversion in Conversion::ALL {
            assert_eq!(conversion.inverse().inverse(), conversion);
            assert_ne!(conversion.inverse(), conversion);
        }
    }

    #[test]
    fn describe_currency_uses_two_decimals() {
        let d = Conversion::EuroToDollar.describe(10.0, 10.8);
        assert_eq!(d, "10.00 EUR = 10.80 USD");
    }

    #[test]
    fn describe_distance_uses_two_decimals() {
        let d = Conversion::KmToMiles.describe(100.0, 62.1371);
        assert_eq!(d, "100.00 Km = 62.14 Miles");
    }

    #[test]
    fn describe_temperature_uses_one_decimal() {
        let d = Conversion::CelsiusToFahrenheit.describe(-5.0, 23.0);
        assert_eq!(d, "-5.0°C = 23.0°F");
        let d = Conversion::FahrenheitToCelsius.describe(68.0, 20.0);
        assert_eq!(d, "68.0°F = 20.0°C");
    }

    #[test]
    fn parse_accepts_names_and_aliases() {
        assert_eq!(
            "celsius-to-fahrenheit".parse::<Conversion>().unwrap(),
            Conversion::CelsiusToFahrenheit
        );
        assert_eq!("c2f".parse::<Conversion>().unwrap(), Conversion::CelsiusToFahrenheit);
        assert_eq!("EUR-USD".parse::<Conversion>().unwrap(), Conversion::EuroToDollar);
        assert_eq!("miles_to_km".parse::<Conversion>().unwrap(), Conversion::MilesToKm);
        assert!("kelvin".parse::<Conversion>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for conversion in Conversion::ALL {
            assert_eq!(conversion.to_string().parse::<Conversion>().unwrap(), conversion);
        }
    }
}
