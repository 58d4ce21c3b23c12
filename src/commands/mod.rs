/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod groups;
pub mod search;
pub mod watch;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::cli::{Command, OutputCtx, SettingsArgs};
use crate::config::{Settings, load_source_arg};
use crate::engine::{HttpFetcher, RemoteFetch, SearchController, SearchError, SearchEvent};

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `SearchError` on any command failure.
pub async fn dispatch(
    command: &Command,
    args: &SettingsArgs,
    ctx: OutputCtx,
) -> Result<(), SearchError> {
    let settings = {
        let _t = ctx.timer("load_settings");
        load_settings(args)?
    };
    tracing::debug!(?settings, "settings loaded");
    let ctx = ctx.with_highlight(settings.highlight_results);

    match command {
        Command::Search(search_args) => search::run(search_args, &settings, &ctx).await,
        Command::Watch => watch::run(&settings, &ctx).await,
        Command::Groups => groups::run(&settings, &ctx),
    }
}

/// Read the config file (if any) and apply command-line overrides.
///
/// # Errors
///
/// Returns `SearchError` if the config file or the `--source` data file
/// cannot be read or parsed.
pub fn load_settings(args: &SettingsArgs) -> Result<Settings, SearchError> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(source) = &args.source {
        settings.source = load_source_arg(source)?;
    }
    if let Some(method) = args.method {
        settings.method = method;
    }
    if let Some(min) = args.min_length {
        settings.minimum_length = min;
    }
    if let Some(delay) = args.delay {
        settings.search_delay = delay;
    }
    if args.case_sensitive {
        settings.case_sensitive = true;
    }
    if args.no_highlight {
        settings.highlight_results = false;
    }
    if args.quiet {
        settings.debug = false;
    }
    Ok(settings)
}

/// Bind a controller to the configured source.
///
/// # Errors
///
/// Returns `SearchError` if the source is invalid or the HTTP client cannot be built.
pub fn bind_controller(
    settings: &Settings,
) -> Result<(SearchController, mpsc::UnboundedReceiver<SearchEvent>), SearchError> {
    let source = Arc::new(settings.build_source()?);
    let fetcher: Arc<dyn RemoteFetch> = Arc::new(HttpFetcher::new(settings.request_timeout())?);
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = SearchController::new(
        source,
        fetcher,
        settings.search_options(),
        settings.reporter(),
        tx,
    );
    tracing::debug!(instance = %controller.id(), "input bound");
    Ok((controller, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HttpMethod;

    fn args() -> SettingsArgs {
        SettingsArgs {
            config: None,
            source: None,
            method: None,
            min_length: None,
            delay: None,
            case_sensitive: false,
            no_highlight: false,
            quiet: false,
        }
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        let settings = load_settings(&args()).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.minimum_length, 3);
        assert!(settings.highlight_results);
    }

    #[test]
    fn test_flags_override() {
        let settings = load_settings(&SettingsArgs {
            source: Some("https://example.com/search".into()),
            method: Some(HttpMethod::Get),
            min_length: Some(0),
            delay: Some(50),
            case_sensitive: true,
            no_highlight: true,
            quiet: true,
            ..args()
        })
        .unwrap();
        assert_eq!(settings.method, HttpMethod::Get);
        assert_eq!(settings.minimum_length, 0);
        assert_eq!(settings.search_delay, 50);
        assert!(settings.case_sensitive);
        assert!(!settings.highlight_results);
        assert!(!settings.debug);
        assert!(settings.build_source().unwrap().is_remote());
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_settings(&SettingsArgs {
            config: Some("/no/such/typeahead.json".into()),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
