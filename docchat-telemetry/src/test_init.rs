use crate::{TelemetryError, init_json_telemetry, init_telemetry};

#[tokio::test]
async fn second_init_reports_error_instead_of_panicking() {
    // Only one global subscriber can exist per process.
    let first = init_telemetry("test-service");
    let second = init_json_telemetry("test-service");

    assert!(matches!(second, Err(TelemetryError::AlreadyInitialized(_))));
    if first.is_ok() {
        tracing::info!(component = "telemetry", "subscriber active");
    }
}
