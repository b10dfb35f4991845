//! Host-side wrappers driven against the mock tracer linked in statically.

use anyhow::Result;
use dynot_mocktracer::{ENTRY_POINT, SPAN_ID_KEY, TRACE_ID_KEY, read_spans};
use dynot_plugin::abi::{ABI_VERSION, PluginApi};
use dynot_plugin::{Error, TextMap, TracerLibrary};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

fn mock_library() -> Arc<TracerLibrary> {
    Arc::new(TracerLibrary::from_entry_point("static:mocktracer", ENTRY_POINT).unwrap())
}

fn config_for(output: &std::path::Path) -> String {
    format!(r#"{{"output_file": "{}"}}"#, output.display())
}

#[test]
fn test_static_library_reports_plugin_name() {
    let library = mock_library();
    assert_eq!(library.name(), "mocktracer");
    assert_eq!(library.origin(), "static:mocktracer");
}

#[test]
fn test_make_tracer_surfaces_plugin_error() {
    let library = mock_library();
    match library.make_tracer("{}") {
        Err(Error::MakeTracer(message)) => assert_eq!(message, "output_file not provided"),
        other => panic!("expected MakeTracer error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_make_tracer_rejects_unwritable_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("missing-dir").join("spans.json");
    match mock_library().make_tracer(&config_for(&output)) {
        Err(Error::MakeTracer(message)) => {
            assert!(message.starts_with("failed to open file"), "{}", message)
        }
        other => panic!("expected MakeTracer error, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[test]
fn test_finished_span_keeps_its_context() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("spans.json");
    let tracer = mock_library().make_tracer(&config_for(&output))?;

    let mut root = tracer.start_span("root", None, SystemTime::now())?;
    let live = root.inject()?;
    root.finish(SystemTime::now());
    assert!(root.is_finished());
    assert_eq!(root.inject()?, live);

    let late = tracer.start_span("late", Some(&root.inject()?), SystemTime::now())?;
    drop(late);
    drop(root);
    drop(tracer);

    let spans = read_spans(&output)?;
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].operation_name, "root");
    assert_eq!(spans[1].trace_id, spans[0].trace_id);
    assert_eq!(spans[1].parent_span_id.as_ref(), Some(&spans[0].span_id));
    Ok(())
}

#[test]
fn test_spans_are_flushed_when_last_handle_drops() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("spans.json");
    let library = mock_library();
    let tracer = library.make_tracer(&config_for(&output))?;

    let start = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let mut root = tracer.start_span("ingress", None, start)?;
    root.set_tag("component", "proxy");
    root.log(start + Duration::from_millis(1), "headers received");

    let context = root.inject()?;
    assert!(context.get(TRACE_ID_KEY).is_some());
    assert!(context.get(SPAN_ID_KEY).is_some());

    let mut child = root.tracer().start_span("upstream", Some(&context), start)?;
    child.set_operation("upstream call");
    child.finish(start + Duration::from_millis(5));
    root.finish(start + Duration::from_millis(10));

    // Spans keep the tracer alive; it closes after the last one goes away.
    drop(tracer);
    assert_eq!(std::fs::metadata(&output)?.len(), 0);
    drop(child);
    drop(root);

    let spans = read_spans(&output)?;
    assert_eq!(spans.len(), 2);

    let child = &spans[0];
    let root = &spans[1];
    assert_eq!(child.operation_name, "upstream call");
    assert_eq!(child.trace_id, root.trace_id);
    assert_eq!(child.parent_span_id.as_deref(), Some(root.span_id.as_str()));
    assert_eq!(root.tags.get("component").map(String::as_str), Some("proxy"));
    assert_eq!(root.logs.len(), 1);
    assert_eq!(root.logs[0].event, "headers received");
    assert_eq!(root.finish_micros - root.start_micros, 10_000);
    Ok(())
}

#[test]
fn test_dropped_span_is_finished() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("spans.json");
    let tracer = mock_library().make_tracer(&config_for(&output))?;

    let span = tracer.start_span("abandoned", None, SystemTime::now())?;
    drop(span);
    drop(tracer);

    let spans = read_spans(&output)?;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].operation_name, "abandoned");
    Ok(())
}

#[test]
fn test_bad_parent_context_is_an_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let tracer = mock_library().make_tracer(&config_for(&temp_dir.path().join("o.json")))?;

    let mut parent = TextMap::new();
    parent.insert(TRACE_ID_KEY, "not-hex");
    parent.insert(SPAN_ID_KEY, "01");

    let result = tracer.start_span("child", Some(&parent), SystemTime::now());
    assert!(matches!(result, Err(Error::StartSpan(_))));
    Ok(())
}

unsafe extern "C" fn refusing_entry(_host_abi_version: u32) -> *const PluginApi {
    std::ptr::null()
}

#[test]
fn test_plugin_refusing_abi_version() {
    match TracerLibrary::from_entry_point("static:refusing", refusing_entry) {
        Err(Error::AbiMismatch { host, actual, .. }) => {
            assert_eq!(host, ABI_VERSION);
            assert_eq!(actual, None);
        }
        other => panic!("expected ABI mismatch, got {:?}", other),
    }
}

static NEWER_API: OnceLock<PluginApi> = OnceLock::new();

unsafe extern "C" fn newer_entry(_host_abi_version: u32) -> *const PluginApi {
    NEWER_API.get_or_init(|| {
        let mock = unsafe { &*ENTRY_POINT(ABI_VERSION) };
        PluginApi {
            abi_version: ABI_VERSION + 1,
            ..*mock
        }
    })
}

#[test]
fn test_plugin_with_other_abi_version() {
    match TracerLibrary::from_entry_point("static:newer", newer_entry) {
        Err(Error::AbiMismatch { host, actual, .. }) => {
            assert_eq!(host, ABI_VERSION);
            assert_eq!(actual, Some(ABI_VERSION + 1));
        }
        other => panic!("expected ABI mismatch, got {:?}", other),
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn test_library_without_entry_point() {
    // Any shared object that is not a tracer plugin will do.
    let path = std::path::Path::new("libc.so.6");
    match TracerLibrary::open(path) {
        Err(Error::MissingEntryPoint { symbol, .. }) => {
            assert_eq!(symbol, dynot_plugin::abi::ENTRY_POINT);
        }
        other => panic!("expected missing entry point, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_open_missing_library_fails_to_load() {
    let result = TracerLibrary::open(std::path::Path::new("/nonexistent/libnothing.so"));
    match result {
        Err(Error::Load { path, message }) => {
            assert_eq!(path, std::path::Path::new("/nonexistent/libnothing.so"));
            assert!(!message.is_empty());
        }
        other => panic!("expected load error, got {:?}", other),
    }
}
