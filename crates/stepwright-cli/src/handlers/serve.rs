//! `serve` command handler

use std::sync::Arc;
use std::time::Duration;

use stepwright::{ArtifactStore, CachedTranslator, TranslationCache};

use crate::commands::ServeArgs;
use crate::config::{CliConfig, ServiceConfig};
use crate::error::CliResult;
use crate::handlers::backend::model_translator;
use crate::output::Reporter;
use crate::server::{self, AppState};

/// Service settings from command-line arguments
#[must_use]
pub fn service_config(args: &ServeArgs) -> ServiceConfig {
    ServiceConfig::new()
        .with_port(args.port)
        .with_artifact_dir(&args.artifact_dir)
        .with_timeout(Duration::from_secs(args.timeout_secs))
}

/// Execute the serve command. Runs until interrupted.
pub async fn execute_serve(config: &CliConfig, args: &ServeArgs) -> CliResult<()> {
    let service = service_config(args);
    let (provider, translator) = model_translator(service.timeout)?;

    let cache = Arc::new(TranslationCache::new());
    let translator = CachedTranslator::new(translator, Arc::clone(&cache));
    let state = AppState::new(
        Arc::new(translator),
        cache,
        ArtifactStore::new(&service.artifact_dir),
        provider.provider.as_str(),
        &provider.model,
    );

    let addr = service.listen_addr();
    let reporter = Reporter::from_config(config);
    reporter.info(&format!(
        "serving {} on http://{addr} (artifacts in {})",
        provider.label(),
        service.artifact_dir.display()
    ));
    server::serve(addr, state).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_service_config_from_args() {
        let args = ServeArgs {
            port: 9100,
            artifact_dir: PathBuf::from("out"),
            timeout_secs: 7,
        };
        let config = service_config(&args);
        assert_eq!(config.port, 9100);
        assert_eq!(config.artifact_dir, PathBuf::from("out"));
        assert_eq!(config.timeout, Duration::from_secs(7));
    }
}
