use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ParseValueError;

/// Measurement system requested from OpenWeatherMap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Standard, Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "standard" => Ok(Units::Standard),
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(ParseValueError {
                kind: "units",
                value: value.to_string(),
                expected: "standard, metric, imperial",
            }),
        }
    }
}

/// Which OpenWeatherMap product to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Forecast {
    /// Current conditions.
    #[default]
    Current,
    Hourly,
    Daily,
    Climate,
}

impl Forecast {
    pub fn as_str(&self) -> &'static str {
        match self {
            Forecast::Current => "current",
            Forecast::Hourly => "hourly",
            Forecast::Daily => "daily",
            Forecast::Climate => "climate",
        }
    }

    /// Endpoint path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Forecast::Current => "weather",
            Forecast::Hourly => "forecast/hourly",
            Forecast::Daily => "forecast/daily",
            Forecast::Climate => "forecast/climate",
        }
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Forecast {
    type Err = ParseValueError;

    // An empty value means "current", matching the flag's empty default.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "" | "current" => Ok(Forecast::Current),
            "hourly" => Ok(Forecast::Hourly),
            "daily" => Ok(Forecast::Daily),
            "climate" => Ok(Forecast::Climate),
            _ => Err(ParseValueError {
                kind: "forecast",
                value: value.to_string(),
                expected: "hourly, daily, climate",
            }),
        }
    }
}

/// Response format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(ParseValueError {
                kind: "output format",
                value: value.to_string(),
                expected: "json, xml",
            }),
        }
    }
}

/// Everything needed to issue one lookup. Built once, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub location: String,
    pub units: Units,
    pub api_key: String,
    pub forecast: Forecast,
    pub output: OutputFormat,
}

impl WeatherQuery {
    /// Query for current conditions as JSON.
    pub fn new(location: impl Into<String>, units: Units, api_key: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            units,
            api_key: api_key.into(),
            forecast: Forecast::default(),
            output: OutputFormat::default(),
        }
    }

    pub fn with_forecast(mut self, forecast: Forecast) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }
}

impl fmt::Debug for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherQuery")
            .field("location", &self.location)
            .field("units", &self.units)
            .field("api_key", &"<redacted>")
            .field("forecast", &self.forecast)
            .field("output", &self.output)
            .finish()
    }
}
