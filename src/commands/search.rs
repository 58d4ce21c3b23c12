/// `search` command: one keystroke's worth of search, printed once.
use crate::cli::args::SearchArgs;
use crate::cli::output::write_outcome;
use crate::cli::OutputCtx;
use crate::config::Settings;
use crate::engine::{Keystroke, SearchError, SearchEvent};

use super::bind_controller;

/// Run `typeahead search`.
///
/// The query goes through the same rules as typed input: an empty query hides
/// results and a query not longer than the minimum length searches nothing.
/// Remote searches wait out the debounce window.
///
/// # Errors
///
/// Returns `SearchError` on an invalid source, unreadable files, or a failed
/// remote search.
pub async fn run(
    args: &SearchArgs,
    settings: &Settings,
    ctx: &OutputCtx,
) -> Result<(), SearchError> {
    let (mut controller, mut events) = bind_controller(settings)?;

    let search_timer = ctx.timer("search");
    let outcome = match controller.on_input(&args.query) {
        Keystroke::Hidden => {
            tracing::info!("empty query; results hidden");
            return Ok(());
        }
        Keystroke::BelowMinimum => {
            tracing::info!(
                query = %args.query,
                minimum_length = settings.minimum_length,
                "query too short; nothing searched"
            );
            return Ok(());
        }
        Keystroke::Rendered(outcome) => outcome,
        Keystroke::Scheduled => match events.recv().await {
            Some(SearchEvent::Rendered { outcome, .. }) => outcome,
            Some(SearchEvent::Failed { error, .. }) => return Err(error),
            None => return Ok(()),
        },
    };
    drop(search_timer);

    let _t_render = ctx.timer("render");
    write_outcome(&outcome, ctx);
    Ok(())
}
