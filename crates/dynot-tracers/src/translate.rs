use crate::context::TracerFactoryContext;
use crate::registry::FactoryRegistry;
use crate::traits::{Driver, TracerFactory};
use crate::{Error, Result};
use dynot_types::{HttpTracerConfig, Message, TracingConfig, ValidationMode};
use std::sync::Arc;

/// Turn a tracer block into the config message `factory` expects
///
/// A block without `typed_config` yields the factory's empty config, which
/// must still pass validation.
pub fn translate_to_factory_config(
    http: &HttpTracerConfig,
    mode: ValidationMode,
    factory: &dyn TracerFactory,
) -> Result<Box<dyn Message>> {
    match &http.typed_config {
        Some(typed_config) => factory.translate_config(typed_config, mode),
        None => {
            let config = factory.create_empty_config();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Build the HTTP tracer driver described by `config`
///
/// Returns `Ok(None)` when no HTTP tracer is configured.
pub fn create_http_tracer(
    registry: &FactoryRegistry,
    config: &TracingConfig,
    context: &TracerFactoryContext,
) -> Result<Option<Arc<dyn Driver>>> {
    let Some(http) = &config.http else {
        tracing::debug!("no http tracer configured");
        return Ok(None);
    };

    let factory = registry
        .get_factory_with_runtime(&http.name, &context.server.runtime)
        .ok_or_else(|| Error::UnknownFactory(http.name.clone()))?;
    let message = translate_to_factory_config(http, context.validation, factory.as_ref())?;
    let driver = factory.create_tracer_driver(message.as_ref(), context)?;

    tracing::info!(
        factory = factory.name(),
        config = message.type_name(),
        "created http tracer"
    );
    Ok(Some(driver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_ot::DynamicOpenTracingTracerFactory;
    use dynot_types::DynamicOtConfig;

    #[test]
    fn test_missing_typed_config_fails_validation() {
        let http = HttpTracerConfig {
            name: "envoy.tracers.dynamic_ot".to_string(),
            typed_config: None,
        };
        let result = translate_to_factory_config(
            &http,
            ValidationMode::Strict,
            &DynamicOpenTracingTracerFactory,
        );
        assert!(matches!(
            result,
            Err(Error::Config(dynot_types::Error::Validation(_)))
        ));
    }

    #[test]
    fn test_translate_yields_factory_message() -> Result<()> {
        let config = TracingConfig::from_yaml(
            r#"
http:
  name: envoy.tracers.dynamic_ot
  typed_config:
    "@type": type.googleapis.com/envoy.config.trace.v3.DynamicOtConfig
    library: libtracer.so
    config:
      output_file: spans.json
"#,
        )?;
        let http = config.http.as_ref().unwrap();

        let message = translate_to_factory_config(
            http,
            ValidationMode::Strict,
            &DynamicOpenTracingTracerFactory,
        )?;
        let dynamic = dynot_types::downcast_message::<DynamicOtConfig>(message.as_ref()).unwrap();
        assert_eq!(dynamic.library, "libtracer.so");
        assert_eq!(dynamic.config_json(), r#"{"output_file":"spans.json"}"#);
        Ok(())
    }

    #[test]
    fn test_no_http_block_means_no_tracer() -> Result<()> {
        let driver = create_http_tracer(
            &FactoryRegistry::with_builtin_factories(),
            &TracingConfig::default(),
            &TracerFactoryContext::default(),
        )?;
        assert!(driver.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_factory_name() {
        let config = TracingConfig::from_yaml("http:\n  name: envoy.dynamic.ot\n").unwrap();
        let result = create_http_tracer(
            &FactoryRegistry::with_builtin_factories(),
            &config,
            &TracerFactoryContext::default(),
        );
        assert!(matches!(result, Err(Error::UnknownFactory(name)) if name == "envoy.dynamic.ot"));
    }
}
