use crate::headers::RequestHeaders;
use crate::opentracing::{DriverStatsSnapshot, OpenTracingDriver, PropagationMode};
use crate::traits::{Decision, Driver, Span, SpanConfig};
use crate::context::LocalInfo;
use crate::{Error, Result};
use dynot_plugin::LibraryLoader;
use std::time::SystemTime;

/// OpenTracing driver whose tracer comes from a plugin library
pub struct DynamicOpenTracingDriver {
    library: String,
    driver: OpenTracingDriver,
}

impl DynamicOpenTracingDriver {
    /// Load `library` through `loader` and build a tracer from `tracer_config` (JSON)
    pub fn new(library: &str, tracer_config: &str, loader: &dyn LibraryLoader) -> Result<Self> {
        let plugin = loader.load(library).map_err(|source| Error::Library {
            library: library.to_string(),
            source,
        })?;
        let tracer = plugin
            .make_tracer(tracer_config)
            .map_err(|source| Error::Library {
                library: library.to_string(),
                source,
            })?;

        tracing::info!(
            library,
            tracer = plugin.name(),
            "created dynamic OpenTracing driver"
        );

        Ok(Self {
            library: library.to_string(),
            driver: OpenTracingDriver::new(tracer, PropagationMode::TracerNative),
        })
    }

    /// Identify spans with the proxy described by `local_info`
    pub fn with_local_info(mut self, local_info: &LocalInfo) -> Self {
        self.driver = self.driver.with_node_id(&local_info.node_id);
        self
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    /// Name the plugin reports for its tracer
    pub fn tracer_name(&self) -> &str {
        self.driver.tracer().library().name()
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.driver.propagation_mode()
    }

    pub fn stats(&self) -> DriverStatsSnapshot {
        self.driver.stats()
    }
}

impl Driver for DynamicOpenTracingDriver {
    fn start_span(
        &self,
        config: &SpanConfig,
        headers: &mut RequestHeaders,
        operation_name: &str,
        start_time: SystemTime,
        decision: Decision,
    ) -> Box<dyn Span> {
        self.driver
            .start_span(config, headers, operation_name, start_time, decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynot_plugin::StaticLoader;
    use tempfile::TempDir;

    #[test]
    fn test_driver_reports_its_plugin() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("spans.json");
        let loader = StaticLoader::new();
        loader.register("libmocktracer_plugin.so", dynot_mocktracer::ENTRY_POINT);

        let config = format!(r#"{{"output_file": "{}"}}"#, output.display());
        let driver = DynamicOpenTracingDriver::new("libmocktracer_plugin.so", &config, &loader)
            .unwrap();

        assert_eq!(driver.library(), "libmocktracer_plugin.so");
        assert_eq!(driver.tracer_name(), dynot_mocktracer::TRACER_NAME);
        assert_eq!(driver.propagation_mode(), PropagationMode::TracerNative);
        assert_eq!(driver.stats(), DriverStatsSnapshot::default());
    }

    #[test]
    fn test_unregistered_library_is_reported() {
        let loader = StaticLoader::new();
        let result = DynamicOpenTracingDriver::new("libnothing.so", "{}", &loader);
        assert!(matches!(
            result,
            Err(Error::Library {
                source: dynot_plugin::Error::NotRegistered(_),
                ..
            })
        ));
    }
}
