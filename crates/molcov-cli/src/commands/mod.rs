pub mod query;
pub mod smarts;

use std::collections::HashSet;

use molcov::engine::filter::FilterChain;
use molcov::engine::progress::ProgressReporter;
use molcov::store::csv::CsvStore;
use molcov::store::patterns::PatternSet;
use molcov::workflows;
use molcov::workflows::query::QueryConfig;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::utils::progress::MatchProgress;

/// Shared driver: both subcommands end up running the query workflow
/// against a CSV store, differing only in how the pattern set was loaded.
pub fn execute(
    patterns: &PatternSet,
    want: Option<&HashSet<String>>,
    args: &RunArgs,
) -> Result<()> {
    let filters = FilterChain::parse_specs(&args.filters)?;
    let mut store = CsvStore::open(&args.store);

    let progress = MatchProgress::new();
    let reporter = ProgressReporter::with_callback(progress.callback());

    let config = QueryConfig {
        workers: args.workers,
        chunk_size: args.chunk_size,
        limit: args.limit,
    };

    info!(
        pattern_set = patterns.name(),
        patterns = patterns.len(),
        "Invoking the query workflow."
    );
    let summary = workflows::query::run(
        &mut store,
        patterns,
        &filters,
        want,
        &config,
        &reporter,
    )?;

    println!(
        "Matched {} of {} patterns across {} records ({} unmatched records).",
        summary.registry.len(),
        patterns.len(),
        summary.total_items,
        summary.unmatched
    );
    for (id, set) in summary.registry.iter() {
        println!(
            "  {:<12} {:>6} molecules {:>6} fragments  {}",
            id,
            set.molecules.len(),
            set.fragments.len(),
            set.smarts
        );
    }
    Ok(())
}
