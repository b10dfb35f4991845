use crate::record::{LogRecord, SpanRecord, format_id};
use crate::{SPAN_ID_KEY, TRACE_ID_KEY};
use dynot_plugin::TextMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize)]
struct MockTracerConfig {
    #[serde(default)]
    output_file: Option<String>,
}

#[derive(Default)]
struct Recorder {
    spans: Mutex<Vec<SpanRecord>>,
}

impl Recorder {
    fn record(&self, span: SpanRecord) {
        self.spans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(span);
    }

    fn take(&self) -> Vec<SpanRecord> {
        std::mem::take(
            &mut *self
                .spans
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

pub(crate) struct MockTracer {
    output: File,
    recorder: Arc<Recorder>,
}

impl MockTracer {
    pub(crate) fn from_json(config: &str) -> Result<Self, String> {
        let config: MockTracerConfig = serde_json::from_str(config)
            .map_err(|err| format!("failed to parse tracer configuration: {}", err))?;

        let output_file = match config.output_file {
            Some(path) if !path.is_empty() => path,
            _ => return Err("output_file not provided".to_string()),
        };
        let output = File::create(&output_file)
            .map_err(|err| format!("failed to open file {}: {}", output_file, err))?;

        Ok(Self {
            output,
            recorder: Arc::default(),
        })
    }

    /// Start a span
    ///
    /// A carrier without mock context keys starts a new trace. `None` when the
    /// carrier holds a partial or undecodable context.
    pub(crate) fn start_span(
        &self,
        operation: String,
        parent: &str,
        start_micros: u64,
    ) -> Option<MockSpan> {
        let parent = TextMap::decode(parent).ok()?;
        let (trace_id, parent_span_id) =
            match (parent.get(TRACE_ID_KEY), parent.get(SPAN_ID_KEY)) {
                (None, None) => (random_id(), None),
                (Some(trace_id), Some(span_id)) => (parse_id(trace_id)?, Some(parse_id(span_id)?)),
                _ => return None,
            };

        Some(MockSpan {
            recorder: Arc::clone(&self.recorder),
            trace_id,
            span_id: random_id(),
            parent_span_id,
            operation_name: operation,
            start_micros,
            tags: BTreeMap::new(),
            logs: Vec::new(),
        })
    }

    /// Write every finished span to the output file
    pub(crate) fn close(mut self) -> std::io::Result<()> {
        let spans = self.recorder.take();
        let content = serde_json::to_string_pretty(&spans).map_err(std::io::Error::other)?;
        self.output.write_all(content.as_bytes())?;
        self.output.sync_all()
    }
}

pub(crate) struct MockSpan {
    recorder: Arc<Recorder>,
    trace_id: u64,
    span_id: u64,
    parent_span_id: Option<u64>,
    operation_name: String,
    start_micros: u64,
    tags: BTreeMap<String, String>,
    logs: Vec<LogRecord>,
}

impl MockSpan {
    pub(crate) fn set_operation(&mut self, operation: String) {
        self.operation_name = operation;
    }

    pub(crate) fn set_tag(&mut self, key: String, value: String) {
        self.tags.insert(key, value);
    }

    pub(crate) fn log(&mut self, timestamp_micros: u64, event: String) {
        self.logs.push(LogRecord {
            timestamp_micros,
            event,
        });
    }

    pub(crate) fn context(&self) -> TextMap {
        let mut map = TextMap::new();
        map.insert(TRACE_ID_KEY, format_id(self.trace_id));
        map.insert(SPAN_ID_KEY, format_id(self.span_id));
        map
    }

    pub(crate) fn finish(self, finish_micros: u64) {
        let record = SpanRecord {
            trace_id: format_id(self.trace_id),
            span_id: format_id(self.span_id),
            parent_span_id: self.parent_span_id.map(format_id),
            operation_name: self.operation_name,
            start_micros: self.start_micros,
            finish_micros: finish_micros.max(self.start_micros),
            tags: self.tags,
            logs: self.logs,
        };
        self.recorder.record(record);
    }
}

fn random_id() -> u64 {
    uuid::Uuid::new_v4().as_u128() as u64
}

fn parse_id(hex: &str) -> Option<u64> {
    u64::from_str_radix(hex, 16).ok()
}
