//! Ambient conditions: weather text and imperial units.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::quote::Scalar;
use crate::snapshot::RawEnvironment;

const CELSIUS_MARKER: &str = "°C";
const METERS_PER_SECOND_MARKER: &str = "m/s";
const MPS_TO_MPH: f64 = 2.237;

/// Environment block of a summary. Same shape whether or not data exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentSummary {
    /// Raw weather code as received (`null` when absent).
    pub weather: Scalar,
    pub weather_description: String,
    pub temperature: String,
    pub temperature_fahrenheit: String,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_speed_mph: String,
    pub pressure: String,
}

/// Weather code to text.
///
/// Absent, blank or numeric-zero codes describe as `""`; codes outside the
/// table as `Unknown weather ID: {code}`; non-integer codes as
/// `Invalid weather ID: {code}`.
pub fn describe_weather(code: &Scalar, table: &BTreeMap<i64, String>) -> String {
    let unset = match code {
        Scalar::Int(0) | Scalar::Bool(false) => true,
        Scalar::Float(f) => *f == 0.0,
        other => other.is_blank(),
    };
    if unset {
        return String::new();
    }
    match code.as_integer() {
        Some(id) => table
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Unknown weather ID: {}", code)),
        None => format!("Invalid weather ID: {}", code),
    }
}

/// `"30°C"` -> `"86.0°F"`; anything without a Celsius reading -> `""`.
pub fn celsius_to_fahrenheit(reading: &str) -> String {
    if !reading.contains(CELSIUS_MARKER) {
        return String::new();
    }
    match parse_reading(&reading.replace(CELSIUS_MARKER, "")) {
        Some(celsius) => format!("{:.1}°F", celsius * 9.0 / 5.0 + 32.0),
        None => String::new(),
    }
}

/// `"7.0m/s"` -> `"15.7mph"`; anything without an m/s reading -> `""`.
pub fn wind_to_mph(reading: &str) -> String {
    if !reading.contains(METERS_PER_SECOND_MARKER) {
        return String::new();
    }
    match parse_reading(&reading.replace(METERS_PER_SECOND_MARKER, "")) {
        Some(mps) => format!("{:.1}mph", mps * MPS_TO_MPH),
        None => String::new(),
    }
}

fn parse_reading(number: &str) -> Option<f64> {
    number.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert one event's raw readings. Humidity and pressure pass through.
pub fn convert_environment(raw: Option<&RawEnvironment>, config: &EngineConfig) -> EnvironmentSummary {
    let Some(raw) = raw else {
        return EnvironmentSummary::default();
    };

    let weather = raw.weather.clone().unwrap_or_default();
    let temperature = raw.temperature.clone().unwrap_or_default();
    let wind_speed = raw.wind.clone().unwrap_or_default();

    EnvironmentSummary {
        weather_description: describe_weather(&weather, &config.weather_descriptions),
        temperature_fahrenheit: celsius_to_fahrenheit(&temperature),
        wind_speed_mph: wind_to_mph(&wind_speed),
        humidity: raw.humidity.clone().unwrap_or_default(),
        pressure: raw.pressure.clone().unwrap_or_default(),
        weather,
        temperature,
        wind_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BTreeMap<i64, String> {
        EngineConfig::default().weather_descriptions
    }

    #[test]
    fn test_temperature() {
        assert_eq!(celsius_to_fahrenheit("30°C"), "86.0°F");
        assert_eq!(celsius_to_fahrenheit("-5°C"), "23.0°F");
        assert_eq!(celsius_to_fahrenheit(" 21.5 °C"), "70.7°F");
        assert_eq!(celsius_to_fahrenheit("30"), "");
        assert_eq!(celsius_to_fahrenheit("warm°C"), "");
        assert_eq!(celsius_to_fahrenheit(""), "");
    }

    #[test]
    fn test_wind() {
        assert_eq!(wind_to_mph("7.0m/s"), "15.7mph");
        assert_eq!(wind_to_mph("0m/s"), "0.0mph");
        assert_eq!(wind_to_mph("7 km/h"), "");
        assert_eq!(wind_to_mph("calm m/s"), "");
    }

    #[test]
    fn test_weather() {
        let table = table();
        assert_eq!(describe_weather(&Scalar::Int(5), &table), "Sunny");
        assert_eq!(describe_weather(&Scalar::Text("13".into()), &table), "Fog");
        assert_eq!(describe_weather(&Scalar::Int(42), &table), "Unknown weather ID: 42");
        assert_eq!(
            describe_weather(&Scalar::Text("rainy".into()), &table),
            "Invalid weather ID: rainy"
        );
        assert_eq!(describe_weather(&Scalar::Null, &table), "");
        assert_eq!(describe_weather(&Scalar::Int(0), &table), "");
        assert_eq!(describe_weather(&Scalar::Float(0.0), &table), "");
        assert_eq!(describe_weather(&Scalar::Text("0".into()), &table), "Unknown weather ID: 0");
        assert_eq!(describe_weather(&Scalar::Text("".into()), &table), "");
    }

    #[test]
    fn test_convert_environment() {
        let raw = RawEnvironment {
            weather: Some(Scalar::Int(2)),
            temperature: Some("30°C".to_string()),
            wind: Some("7.0m/s".to_string()),
            humidity: Some("65%".to_string()),
            pressure: Some("1013hPa".to_string()),
        };
        let env = convert_environment(Some(&raw), &EngineConfig::default());
        assert_eq!(env.weather, Scalar::Int(2));
        assert_eq!(env.weather_description, "Cloudy");
        assert_eq!(env.temperature, "30°C");
        assert_eq!(env.temperature_fahrenheit, "86.0°F");
        assert_eq!(env.wind_speed, "7.0m/s");
        assert_eq!(env.wind_speed_mph, "15.7mph");
        assert_eq!(env.humidity, "65%");
        assert_eq!(env.pressure, "1013hPa");
    }

    #[test]
    fn test_absent_environment_keeps_shape() {
        let env = convert_environment(None, &EngineConfig::default());
        let value = serde_json::to_value(&env).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 8);
        assert!(value["weather"].is_null());
        assert_eq!(value["temperature_fahrenheit"], "");
    }
}
