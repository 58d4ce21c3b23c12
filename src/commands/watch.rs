/// `watch` command: drive one input from stdin, one line per keystroke.
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::OutputCtx;
use crate::cli::output::write_watch_event;
use crate::config::Settings;
use crate::engine::{Keystroke, SearchError, SearchEvent, SearchOutcome, SearchState};
use crate::types::{ErrorDetail, MatchOutput, WatchOutput};

use super::bind_controller;

/// Run `typeahead watch`.
///
/// Each stdin line is the input's full value after a keystroke. Local results
/// print immediately; remote results print when their debounced request
/// completes. At end of input a pending debounce is allowed to fire and every
/// request already sent is awaited before returning.
///
/// # Errors
///
/// Returns `SearchError` on an invalid source or if stdin cannot be read.
pub async fn run(settings: &Settings, ctx: &OutputCtx) -> Result<(), SearchError> {
    let (mut controller, mut events) = bind_controller(settings)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(value) = line.map_err(stdin_error)? else {
                    break;
                };
                let instance = controller.id().to_string();
                match controller.on_input(&value) {
                    Keystroke::Rendered(outcome) => emit_rendered(instance, &outcome, ctx),
                    Keystroke::Hidden => {
                        write_watch_event(&WatchOutput::Hidden { instance }, None, ctx);
                    }
                    Keystroke::BelowMinimum => tracing::debug!(%value, "below minimum length"),
                    Keystroke::Scheduled => tracing::debug!(%value, "search scheduled"),
                }
            }
            Some(event) = events.recv() => emit_event(event, ctx),
        }
    }

    // Let a pending debounce fire, then unbind so the channel closes once
    // every dispatched request has reported back.
    if controller.has_pending_timer() {
        tracing::debug!(query = controller.query(), "input closed; waiting for pending search");
    }
    let mut state = controller.subscribe_state();
    let _ = state.wait_for(|s| *s != SearchState::Pending).await;
    drop(controller);

    let _t_drain = ctx.timer("drain");
    while let Some(event) = events.recv().await {
        emit_event(event, ctx);
    }
    Ok(())
}

fn emit_event(event: SearchEvent, ctx: &OutputCtx) {
    match event {
        SearchEvent::Rendered { instance, outcome } => {
            emit_rendered(instance.to_string(), &outcome, ctx);
        }
        SearchEvent::Failed {
            instance,
            query,
            error,
        } => {
            let out = WatchOutput::Failed {
                instance: instance.to_string(),
                query,
                error: ErrorDetail::from_search_error(&error),
            };
            write_watch_event(&out, None, ctx);
        }
    }
}

fn emit_rendered(instance: String, outcome: &SearchOutcome, ctx: &OutputCtx) {
    let out = WatchOutput::Rendered {
        instance,
        query: outcome.query.clone(),
        matches: MatchOutput::from_outcome(outcome),
    };
    write_watch_event(&out, Some(outcome), ctx);
}

fn stdin_error(err: std::io::Error) -> SearchError {
    SearchError::Io {
        path: "<stdin>".to_owned(),
        message: err.to_string(),
    }
}
