use super::driver::DynamicOpenTracingDriver;
use crate::Result;
use crate::context::TracerFactoryContext;
use crate::traits::{Driver, TypedTracerFactory};
use dynot_types::DynamicOtConfig;
use std::sync::Arc;

/// Extension name of the dynamic OpenTracing tracer
pub const DYNAMIC_OT_NAME: &str = "envoy.tracers.dynamic_ot";

/// Builds [`DynamicOpenTracingDriver`]s from [`DynamicOtConfig`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicOpenTracingTracerFactory;

impl TypedTracerFactory for DynamicOpenTracingTracerFactory {
    type Config = DynamicOtConfig;

    const NAME: &'static str = DYNAMIC_OT_NAME;

    fn create_typed_driver(
        &self,
        config: &DynamicOtConfig,
        context: &TracerFactoryContext,
    ) -> Result<Arc<dyn Driver>> {
        let driver = DynamicOpenTracingDriver::new(
            &config.library,
            &config.config_json(),
            context.loader(),
        )?
        .with_local_info(&context.server.local_info);
        Ok(Arc::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::headers::RequestHeaders;
    use crate::traits::{Decision, SpanConfig, TracerFactory};
    use std::time::SystemTime;
    use dynot_plugin::StaticLoader;
    use dynot_types::Message;
    use serde_json::json;
    use tempfile::TempDir;

    fn context_with_mock(path: &str) -> TracerFactoryContext {
        let loader = StaticLoader::new();
        loader.register(path, dynot_mocktracer::ENTRY_POINT);
        TracerFactoryContext::default().with_loader(Arc::new(loader))
    }

    #[test]
    fn test_creates_driver_from_static_plugin() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("spans.json");
        let mut config = DynamicOtConfig::new("libmocktracer_plugin.so");
        config
            .config
            .insert("output_file".to_string(), json!(output.display().to_string()));

        let factory = DynamicOpenTracingTracerFactory;
        let context = context_with_mock("libmocktracer_plugin.so");
        let driver = factory.create_tracer_driver(&config, &context);
        assert!(driver.is_ok());
    }

    #[test]
    fn test_spans_are_tagged_with_node_id() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("spans.json");
        let mut config = DynamicOtConfig::new("libmocktracer_plugin.so");
        config
            .config
            .insert("output_file".to_string(), json!(output.display().to_string()));

        let mut context = context_with_mock("libmocktracer_plugin.so");
        context.server.local_info.node_id = "edge-7".to_string();
        let driver = DynamicOpenTracingTracerFactory
            .create_tracer_driver(&config, &context)
            .unwrap();

        let span = driver.start_span(
            &SpanConfig::default(),
            &mut RequestHeaders::new(),
            "op",
            SystemTime::now(),
            Decision::traced(),
        );
        drop(span);
        drop(driver);

        let spans = dynot_mocktracer::read_spans(&output).unwrap();
        assert_eq!(spans[0].tags["node_id"], "edge-7");
    }

    #[test]
    fn test_plugin_error_names_library() {
        let factory = DynamicOpenTracingTracerFactory;
        let context = context_with_mock("libmocktracer_plugin.so");
        let config = DynamicOtConfig::new("libmocktracer_plugin.so");

        match factory.create_tracer_driver(&config, &context) {
            Err(Error::Library { library, source }) => {
                assert_eq!(library, "libmocktracer_plugin.so");
                assert!(source.to_string().contains("output_file not provided"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected failure without output_file"),
        }
    }

    #[test]
    fn test_wrong_message_type_is_rejected() {
        #[derive(Debug)]
        struct Other;
        impl Message for Other {
            fn type_name(&self) -> &'static str {
                "test.Other"
            }
            fn validate(&self) -> dynot_types::Result<()> {
                Ok(())
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let result =
            DynamicOpenTracingTracerFactory.create_tracer_driver(&Other, &context_with_mock("x"));
        assert!(matches!(result, Err(Error::ConfigTypeMismatch { .. })));
    }

    #[test]
    fn test_empty_config_fails_validation() {
        let empty = DynamicOpenTracingTracerFactory.create_empty_config();
        assert_eq!(empty.type_name(), "envoy.config.trace.v3.DynamicOtConfig");
        assert!(empty.validate().is_err());
    }
}
