/// `groups` command: list the groups of a local source.
use crate::cli::output::write_groups;
use crate::cli::OutputCtx;
use crate::config::Settings;
use crate::engine::{SearchError, Source};
use crate::types::GroupOutput;

/// Run `typeahead groups`.
///
/// # Errors
///
/// Returns `SearchError::Config` for a remote source, whose groups are only
/// known per query.
pub fn run(settings: &Settings, ctx: &OutputCtx) -> Result<(), SearchError> {
    let groups = match settings.build_source()? {
        Source::Local(groups) => groups,
        Source::Remote(endpoint) => {
            return Err(SearchError::Config(format!(
                "groups needs a local source; '{}' is a remote endpoint",
                endpoint.url
            )));
        }
    };

    if groups.is_empty() {
        settings.reporter().report(&SearchError::EmptySource);
    }

    let output: Vec<GroupOutput> = groups
        .iter()
        .map(|g| GroupOutput {
            name: g.name.clone(),
            records: g.records.len(),
        })
        .collect();

    write_groups(&output, ctx);
    Ok(())
}
