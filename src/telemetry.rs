use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::workflows::{ResourceKey, TaskId};

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins over the configured level. With `json_logs` every line is
/// a JSON object carrying the current span and its parents.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))?;

    let json_layer = observability.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!observability.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    tracing::debug!("choose-state telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the records of one task execution
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with the attributes of one choose-state execution
pub fn create_transition_span(
    operation: &str,
    task_id: TaskId,
    key: &ResourceKey,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "choose_state",
        operation = operation,
        task.id = %task_id,
        resource.id = key.resource_id,
        resource.kind = %key.resource_type,
        workflow.id = %key.workflow_id,
        correlation.id = correlation_id
    )
}
