use async_trait::async_trait;
use std::fmt::Debug;

use crate::{WeatherQuery, error::WeatherError};

pub mod openweather;

/// Something that can answer a weather query with a raw response body.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Issue the query and return the body bytes, whatever the HTTP status.
    async fn fetch(&self, query: &WeatherQuery) -> Result<Vec<u8>, WeatherError>;
}
