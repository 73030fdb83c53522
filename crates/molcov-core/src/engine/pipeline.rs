//! Parallel matching pipeline.
//!
//! Work items are processed in fixed-size chunks on a dedicated worker
//! pool. Workers send finished chunks back over a channel tagged with
//! their submission index, and the aggregating thread commits chunks
//! strictly in submission order through a reorder buffer. Aggregated
//! output is therefore identical for any worker count or chunk size.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::mpsc;

use tracing::{debug, instrument, warn};

use crate::core::models::record::MolRecord;
use crate::core::smarts::LabeledPattern;
use crate::core::smiles::mol_from_smiles;

use super::error::EngineError;
use super::filter::FilterChain;
use super::progress::{Progress, ProgressReporter};
use super::registry::MatchRegistry;
use super::resolver;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Worker threads in the matching pool.
    pub workers: usize,
    /// Records per unit of work sent to the pool.
    pub chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            chunk_size: 32,
        }
    }
}

/// One record queued for matching, tagged with its kind.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub record: MolRecord,
    pub is_fragment: bool,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub registry: MatchRegistry,
    /// Items that contributed no match: rejected by a filter, or sanitized
    /// and matched by none of the requested patterns.
    pub unmatched: u64,
}

enum ItemOutcome {
    Filtered,
    Report {
        smiles: String,
        matches: BTreeSet<String>,
        is_fragment: bool,
    },
}

/// Runs the full worklist and aggregates per-pattern match sets.
///
/// Patterns are matched with list-order precedence (see
/// [`resolver::assign_environments`]); when `want` is given, only the
/// requested identifiers count as matches or appear in the output.
#[instrument(skip_all, fields(items = items.len(), patterns = patterns.len()))]
pub fn run(
    items: &[WorkItem],
    patterns: &[LabeledPattern],
    filters: &FilterChain,
    want: Option<&HashSet<String>>,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<PipelineOutput, EngineError> {
    let display: HashMap<&str, &str> = patterns
        .iter()
        .map(|p| (p.id.as_str(), p.pattern.text()))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    let chunk_size = config.chunk_size.max(1);

    reporter.report(Progress::TaskStart {
        total: items.len() as u64,
    });

    let mut registry = MatchRegistry::new();
    let mut unmatched = 0u64;
    let mut first_error: Option<EngineError> = None;

    pool.in_place_scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for (chunk_idx, chunk) in items.chunks(chunk_size).enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let results: Vec<Result<ItemOutcome, EngineError>> = chunk
                    .iter()
                    .map(|item| process_item(item, patterns, filters, want))
                    .collect();
                // Receiver only hangs up on panic; nothing to do here.
                let _ = tx.send((chunk_idx, results));
            });
        }
        drop(tx);

        // Reorder buffer: chunks finish in any order but commit in
        // submission order, which fixes the aggregation order.
        let mut pending: BTreeMap<usize, Vec<Result<ItemOutcome, EngineError>>> = BTreeMap::new();
        let mut next_chunk = 0usize;
        for (chunk_idx, results) in rx {
            pending.insert(chunk_idx, results);
            while let Some(results) = pending.remove(&next_chunk) {
                next_chunk += 1;
                for result in results {
                    reporter.report(Progress::TaskIncrement);
                    match result {
                        Ok(ItemOutcome::Filtered) => unmatched += 1,
                        Ok(ItemOutcome::Report {
                            smiles,
                            matches,
                            is_fragment,
                        }) => {
                            if matches.is_empty() {
                                unmatched += 1;
                                warn!(smiles = %smiles, "no requested pattern matched");
                                continue;
                            }
                            for id in &matches {
                                let smarts = display.get(id.as_str()).copied().unwrap_or("");
                                registry.record(id, smarts, &smiles, is_fragment);
                            }
                        }
                        Err(err) => {
                            if first_error.is_none() {
                                first_error = Some(err);
                            }
                        }
                    }
                }
            }
        }
    });

    reporter.report(Progress::TaskFinish);

    if let Some(err) = first_error {
        return Err(err);
    }
    debug!(
        matched_patterns = registry.len(),
        unmatched, "pipeline finished"
    );
    Ok(PipelineOutput { registry, unmatched })
}

fn process_item(
    item: &WorkItem,
    patterns: &[LabeledPattern],
    filters: &FilterChain,
    want: Option<&HashSet<String>>,
) -> Result<ItemOutcome, EngineError> {
    if !filters.passes(&item.record) {
        return Ok(ItemOutcome::Filtered);
    }
    let mol = mol_from_smiles(&item.record.smiles).map_err(|source| EngineError::Sanitize {
        smiles: item.record.smiles.clone(),
        source,
    })?;
    let mut matches = resolver::matched_ids(&mol, patterns);
    if let Some(want) = want {
        matches.retain(|id| want.contains(id));
    }
    Ok(ItemOutcome::Report {
        smiles: item.record.smiles.clone(),
        matches,
        is_fragment: item.is_fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::elements;
    use crate::core::smarts::Pattern;
    use crate::engine::filter::RecordFilter;

    fn item(id: i64, smiles: &str, is_fragment: bool) -> WorkItem {
        let mol = crate::core::smiles::parse_smiles(smiles).unwrap();
        let nums: Vec<u8> = mol.atoms().map(|i| mol.atom(i).atomic_num).collect();
        WorkItem {
            record: MolRecord {
                id,
                smiles: smiles.to_string(),
                inchikey: format!("KEY{id}"),
                natoms: mol.atom_count(),
                elements: elements::elements_to_bits(nums),
            },
            is_fragment,
        }
    }

    fn labeled(id: &str, smarts: &str) -> LabeledPattern {
        LabeledPattern::new(id, Pattern::parse(smarts).unwrap())
    }

    fn run_simple(
        items: &[WorkItem],
        patterns: &[LabeledPattern],
        config: &PipelineConfig,
    ) -> PipelineOutput {
        run(
            items,
            patterns,
            &FilterChain::default(),
            None,
            config,
            &ProgressReporter::new(),
        )
        .unwrap()
    }

    #[test]
    fn aggregates_molecules_and_fragments_separately() {
        let items = vec![item(1, "CCO", false), item(2, "CC", true)];
        let patterns = vec![labeled("cc", "[#6:1][#6:2]")];
        let out = run_simple(&items, &patterns, &PipelineConfig::default());

        let set = out.registry.get("cc").unwrap();
        assert_eq!(set.molecules, vec!["CCO"]);
        assert_eq!(set.fragments, vec!["CC"]);
        assert_eq!(set.smarts, "[#6:1][#6:2]");
        assert_eq!(out.unmatched, 0);
    }

    #[test]
    fn output_is_identical_for_any_worker_and_chunk_configuration() {
        let items: Vec<WorkItem> = (0..40)
            .map(|i| {
                let smiles = ["CC", "CCO", "c1ccccc1", "CCN", "CC(C)C"][i % 5];
                item(i as i64, smiles, i % 3 == 0)
            })
            .collect();
        let patterns = vec![
            labeled("cc", "[#6:1][#6:2]"),
            labeled("co", "[#6:1][#8:2]"),
            labeled("cn", "[#6:1][#7:2]"),
        ];

        let reference = run_simple(
            &items,
            &patterns,
            &PipelineConfig {
                workers: 1,
                chunk_size: 1,
            },
        );
        for (workers, chunk_size) in [(2, 3), (4, 7), (8, 64), (3, 1)] {
            let out = run_simple(
                &items,
                &patterns,
                &PipelineConfig {
                    workers,
                    chunk_size,
                },
            );
            assert_eq!(out.unmatched, reference.unmatched);
            assert_eq!(out.registry.len(), reference.registry.len());
            for (id, set) in reference.registry.iter() {
                assert_eq!(out.registry.get(id), Some(set), "pattern {id}");
            }
        }
    }

    #[test]
    fn unmatched_counts_unclaimed_and_filtered_items() {
        let items = vec![
            item(1, "CC", false),
            item(2, "O", false),
            item(3, "CCCCCCCC", false),
        ];
        let patterns = vec![labeled("cc", "[#6:1][#6:2]")];
        let filters = FilterChain::new(vec![RecordFilter::MaxAtoms { limit: 4 }]);
        let out = run(
            &items,
            &patterns,
            &filters,
            None,
            &PipelineConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        // "O" matched nothing, the octane was filtered out.
        assert_eq!(out.unmatched, 2);
        assert_eq!(out.registry.get("cc").unwrap().molecules, vec!["CC"]);
    }

    #[test]
    fn empty_pattern_list_leaves_every_item_unmatched() {
        let items = vec![item(1, "CC", false), item(2, "CCO", true)];
        let out = run_simple(&items, &[], &PipelineConfig::default());
        assert!(out.registry.is_empty());
        assert_eq!(out.unmatched, items.len() as u64);
    }

    #[test]
    fn want_set_restricts_counted_matches() {
        let items = vec![item(1, "CCO", false)];
        let patterns = vec![labeled("cc", "[#6:1][#6:2]"), labeled("co", "[#6:1][#8:2]")];
        let want: HashSet<String> = ["co".to_string()].into();
        let out = run(
            &items,
            &patterns,
            &FilterChain::default(),
            Some(&want),
            &PipelineConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(out.registry.get("cc").is_none());
        assert_eq!(out.registry.get("co").unwrap().molecules, vec!["CCO"]);
    }

    #[test]
    fn want_set_with_no_surviving_match_counts_as_unmatched() {
        let items = vec![item(1, "CC", false)];
        let patterns = vec![labeled("cc", "[#6:1][#6:2]"), labeled("co", "[#6:1][#8:2]")];
        let want: HashSet<String> = ["co".to_string()].into();
        let out = run(
            &items,
            &patterns,
            &FilterChain::default(),
            Some(&want),
            &PipelineConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(out.registry.is_empty());
        assert_eq!(out.unmatched, 1);
    }

    #[test]
    fn invalid_smiles_aborts_the_run() {
        let items = vec![item(1, "CC", false), item(2, "C", false)];
        let mut bad = item(3, "C", false);
        bad.record.smiles = "C((C".to_string();
        let items = [items, vec![bad]].concat();
        let patterns = vec![labeled("cc", "[#6:1][#6:2]")];
        let result = run(
            &items,
            &patterns,
            &FilterChain::default(),
            None,
            &PipelineConfig::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Sanitize { .. })));
    }

    #[test]
    fn progress_increments_once_per_item() {
        use std::sync::atomic::{AtomicU64, Ordering};
        let increments = AtomicU64::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::TaskIncrement) {
                increments.fetch_add(1, Ordering::Relaxed);
            }
        }));
        let items = vec![item(1, "CC", false), item(2, "CCO", false), item(3, "C", true)];
        run(
            &items,
            &[labeled("cc", "[#6:1][#6:2]")],
            &FilterChain::default(),
            None,
            &PipelineConfig::default(),
            &reporter,
        )
        .unwrap();
        assert_eq!(increments.load(Ordering::Relaxed), 3);
    }
}
