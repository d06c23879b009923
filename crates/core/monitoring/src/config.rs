use std::time::Duration;

use serde::Deserialize;

/// Where and how often the service exports its counters.
///
/// Read by the service binary that installs the global meter provider; the counters of this
/// crate only need the provider to exist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenTelemetryConfig {
    /// OTLP/HTTP metrics collector endpoint, e.g. `http://localhost:4318`
    pub metrics_url: Option<String>,
    /// Seconds between two exports; the SDK default applies when absent
    #[serde(
        default,
        rename = "metrics_export_interval_secs",
        deserialize_with = "deserialize_interval"
    )]
    pub metrics_export_interval: Option<Duration>,
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<f64>>::deserialize(deserializer)?
        .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_interval_is_read_in_seconds() {
        //* Given
        let json = r#"{"metrics_url": "http://otel:4318", "metrics_export_interval_secs": 2.5}"#;

        //* When
        let config: OpenTelemetryConfig = serde_json::from_str(json).expect("valid config");

        //* Then
        assert_eq!(
            config,
            OpenTelemetryConfig {
                metrics_url: Some("http://otel:4318".to_string()),
                metrics_export_interval: Some(Duration::from_millis(2500)),
            }
        );
    }

    #[test]
    fn negative_export_interval_is_rejected() {
        //* When
        let result =
            serde_json::from_str::<OpenTelemetryConfig>(r#"{"metrics_export_interval_secs": -1}"#);

        //* Then
        assert!(result.is_err());
    }
}
