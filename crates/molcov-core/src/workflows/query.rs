use std::collections::HashSet;

use tracing::{info, instrument};

use crate::engine::error::EngineError;
use crate::engine::filter::FilterChain;
use crate::engine::pipeline::{self, PipelineConfig, WorkItem};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::MatchRegistry;
use crate::store::patterns::PatternSet;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub workers: usize,
    pub chunk_size: usize,
    /// Cap on the number of records read from each store table.
    pub limit: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            workers: pipeline.workers,
            chunk_size: pipeline.chunk_size,
            limit: None,
        }
    }
}

#[derive(Debug)]
pub struct QuerySummary {
    pub registry: MatchRegistry,
    /// Worklist items that contributed nothing: filtered out or matched by
    /// no requested pattern.
    pub unmatched: u64,
    pub total_items: usize,
}

/// Matches `patterns` against every molecule and fragment in `store` and
/// persists the aggregated match sets under the pattern set's name,
/// replacing any results of a previous run with that name.
#[instrument(skip_all, name = "query_workflow", fields(pattern_set = patterns.name()))]
pub fn run(
    store: &mut dyn Store,
    patterns: &PatternSet,
    filters: &FilterChain,
    want: Option<&HashSet<String>>,
    config: &QueryConfig,
    reporter: &ProgressReporter,
) -> Result<QuerySummary, EngineError> {
    // === Phase 0: Load the worklist ===
    reporter.report(Progress::PhaseStart { name: "Loading" });
    info!("Starting query run: resetting previous results and loading records.");

    store.reset_run(patterns.name())?;
    let molecules = store.get_molecules(config.limit)?;
    let fragments = store.get_fragments(config.limit)?;
    info!(
        molecules = molecules.len(),
        fragments = fragments.len(),
        patterns = patterns.len(),
        "Worklist loaded."
    );

    // Molecules first, then fragments; the pipeline preserves this order
    // in the aggregates.
    let items: Vec<WorkItem> = molecules
        .into_iter()
        .map(|record| WorkItem {
            record,
            is_fragment: false,
        })
        .chain(fragments.into_iter().map(|record| WorkItem {
            record,
            is_fragment: true,
        }))
        .collect();
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Match ===
    reporter.report(Progress::PhaseStart { name: "Matching" });
    let pipeline_config = PipelineConfig {
        workers: config.workers,
        chunk_size: config.chunk_size,
    };
    let output = pipeline::run(
        &items,
        patterns.patterns(),
        filters,
        want,
        &pipeline_config,
        reporter,
    )?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Persist ===
    reporter.report(Progress::PhaseStart { name: "Persisting" });
    store.insert_run(patterns.name(), &output.registry)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        matched_patterns = output.registry.len(),
        unmatched = output.unmatched,
        "Query run finished."
    );
    Ok(QuerySummary {
        registry: output.registry,
        unmatched: output.unmatched,
        total_items: items.len(),
    })
}
