use crate::config::Settings;
use crate::types::{Direction, OutputFormat};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use dynot_tracers::{Decision, RequestHeaders, SpanConfig, create_http_tracer, registry};
use dynot_types::TracingConfig;
use std::path::Path;
use std::time::SystemTime;

/// What to record for the single span
#[derive(Debug, Clone)]
pub struct SpanRequest {
    pub operation: String,
    pub direction: Direction,
    pub tags: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub sampled: bool,
}

pub fn handle(
    file: &Path,
    request: SpanRequest,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let config = TracingConfig::load_from(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let context = settings.factory_context();

    let driver = create_http_tracer(registry::global(), &config, &context)
        .with_context(|| format!("Failed to create tracer from {}", file.display()))?
        .with_context(|| format!("No HTTP tracer configured in {}", file.display()))?;

    let mut incoming: RequestHeaders = request.headers.iter().map(|(k, v)| (k, v.clone())).collect();
    let span_config = SpanConfig {
        operation: request.direction.into(),
    };
    let decision = if request.sampled {
        Decision::traced()
    } else {
        Decision::not_traced()
    };

    let started_at = SystemTime::now();
    let mut span = driver.start_span(
        &span_config,
        &mut incoming,
        &request.operation,
        started_at,
        decision,
    );
    for (key, value) in &request.tags {
        span.set_tag(key, value);
    }

    let mut outgoing = RequestHeaders::new();
    span.inject_context(&mut outgoing);
    span.finish_span();

    // Spans are flushed once the last handle on the tracer is gone.
    drop(span);
    drop(driver);

    tracing::info!(
        operation = %request.operation,
        headers = outgoing.len(),
        "recorded span"
    );

    match format {
        OutputFormat::Json => {
            let started_at: DateTime<Utc> = started_at.into();
            let headers: serde_json::Map<String, serde_json::Value> = outgoing
                .iter()
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
                .collect();
            let output = serde_json::json!({
                "operation": request.operation,
                "started_at": started_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                "sampled": request.sampled,
                "headers": headers,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for (name, value) in outgoing.iter() {
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}
