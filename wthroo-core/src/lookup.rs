use crate::{error::WeatherError, format, model::WeatherQuery, provider::WeatherSource};

/// Fetch the query from `source` and render the body for display.
pub async fn lookup(
    source: &dyn WeatherSource,
    query: &WeatherQuery,
) -> Result<Vec<u8>, WeatherError> {
    let raw = source.fetch(query).await?;

    format::render(query.output, &raw).map_err(|e| {
        tracing::error!(message = "failed to format response", error = %e);
        WeatherError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OutputFormat, Units};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Canned(&'static str);

    #[async_trait]
    impl WeatherSource for Canned {
        async fn fetch(&self, _query: &WeatherQuery) -> Result<Vec<u8>, WeatherError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn formats_fetched_json() {
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY");
        let out = lookup(&Canned(r#"{"main":{"temp":20}}"#), &query).await.unwrap();

        assert_eq!(out, b"{\n  \"main\": {\n    \"temp\": 20\n  }\n}".to_vec());
    }

    #[tokio::test]
    async fn malformed_json_is_a_format_error() {
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY");
        let err = lookup(&Canned("not json"), &query).await.unwrap_err();

        assert!(matches!(err, WeatherError::Format(_)));
    }

    #[tokio::test]
    async fn xml_output_is_not_parsed_as_json() {
        let query = WeatherQuery::new("Paris", Units::Metric, "KEY").with_output(OutputFormat::Xml);
        let out = lookup(&Canned("<current/>"), &query).await.unwrap();

        assert_eq!(out, b"<current/>".to_vec());
    }
}
