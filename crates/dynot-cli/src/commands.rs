use super::args::{Cli, Commands};
use super::handlers;
use crate::config::{Settings, resolve_settings_path};
use crate::logging;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let settings_path = resolve_settings_path(cli.settings.as_deref())?;
    let settings = Settings::load_from(&settings_path)?;
    tracing::debug!(path = %settings_path.display(), "loaded settings");

    match cli.command {
        Commands::Validate { file, permissive } => {
            handlers::validate::handle(&file, permissive, &settings, cli.format)
        }

        Commands::Factories => handlers::factories::handle(cli.format),

        Commands::Span {
            file,
            operation,
            direction,
            tags,
            headers,
            unsampled,
        } => handlers::span::handle(
            &file,
            handlers::span::SpanRequest {
                operation,
                direction,
                tags,
                headers,
                sampled: !unsampled,
            },
            &settings,
            cli.format,
        ),

        Commands::Settings { init } => {
            handlers::settings::handle(&settings_path, &settings, init, cli.format)
        }
    }
}
