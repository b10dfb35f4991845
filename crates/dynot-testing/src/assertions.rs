//! Assertions over spans recorded by the mock tracer.

use anyhow::{Context, Result};
use dynot_mocktracer::SpanRecord;

/// Find the span with `operation`, failing if there is not exactly one
pub fn find_span<'a>(spans: &'a [SpanRecord], operation: &str) -> Result<&'a SpanRecord> {
    let mut matches = spans.iter().filter(|span| span.operation_name == operation);
    let span = matches
        .next()
        .with_context(|| format!("No span named '{}' was recorded", operation))?;

    if matches.next().is_some() {
        anyhow::bail!("More than one span named '{}' was recorded", operation);
    }
    Ok(span)
}

/// Assert that `child` was started from `parent`'s context.
pub fn assert_child_of(child: &SpanRecord, parent: &SpanRecord) -> Result<()> {
    if child.trace_id != parent.trace_id {
        anyhow::bail!(
            "Span '{}' is in trace {} but its parent '{}' is in trace {}",
            child.operation_name,
            child.trace_id,
            parent.operation_name,
            parent.trace_id
        );
    }

    if child.parent_span_id.as_deref() != Some(parent.span_id.as_str()) {
        anyhow::bail!(
            "Span '{}' has parent {:?}, expected {}",
            child.operation_name,
            child.parent_span_id,
            parent.span_id
        );
    }

    Ok(())
}

/// Assert that `span` carries `key` with `value`.
pub fn assert_tag(span: &SpanRecord, key: &str, value: &str) -> Result<()> {
    let actual = span
        .tags
        .get(key)
        .with_context(|| format!("Span '{}' has no tag '{}'", span.operation_name, key))?;

    if actual != value {
        anyhow::bail!(
            "Span '{}' tag '{}' is '{}', expected '{}'",
            span.operation_name,
            key,
            actual,
            value
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn span(operation: &str, span_id: &str, parent: Option<&str>) -> SpanRecord {
        SpanRecord {
            trace_id: "00000000000000aa".to_string(),
            span_id: span_id.to_string(),
            parent_span_id: parent.map(str::to_string),
            operation_name: operation.to_string(),
            start_micros: 0,
            finish_micros: 10,
            tags: BTreeMap::from([("span.kind".to_string(), "server".to_string())]),
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_child_of() {
        let parent = span("parent", "0000000000000001", None);
        let child = span("child", "0000000000000002", Some("0000000000000001"));
        assert!(assert_child_of(&child, &parent).is_ok());
        assert!(assert_child_of(&parent, &child).is_err());
    }

    #[test]
    fn test_find_span_and_tag() {
        let spans = vec![
            span("a", "0000000000000001", None),
            span("b", "0000000000000002", None),
            span("b", "0000000000000003", None),
        ];
        let a = find_span(&spans, "a").unwrap();
        assert!(assert_tag(a, "span.kind", "server").is_ok());
        assert!(assert_tag(a, "span.kind", "client").is_err());
        assert!(find_span(&spans, "b").is_err());
        assert!(find_span(&spans, "c").is_err());
    }
}
