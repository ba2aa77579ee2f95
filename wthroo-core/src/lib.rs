//! Core library for the `wthroo` CLI.
//!
//! This crate defines:
//! - The query model (location, units, credential, forecast, output)
//! - Fetching raw responses from OpenWeatherMap
//! - Re-indenting response bodies for display
//! - Optional on-disk defaults
//!
//! It is used by `wthroo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod format;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{FormatError, ParseValueError, WeatherError};
pub use lookup::lookup;
pub use model::{Forecast, OutputFormat, Units, WeatherQuery};
pub use provider::{WeatherSource, openweather::OpenWeatherSource};
