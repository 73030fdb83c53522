//! Record filters applied before any molecular graph is built.
//!
//! Filters test the precomputed summary columns of a [`MolRecord`], so a
//! rejected record costs no parsing or matching work. Filter specs arrive
//! as `kind:argument` strings from configuration or the command line.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::elements;
use crate::core::models::record::MolRecord;

use super::error::EngineError;

/// A single predicate over a record's summary columns.
#[derive(Debug, Clone)]
pub enum RecordFilter {
    /// Passes records whose element bitmask is contained in `mask`: the
    /// record may use a subset of the allowed elements, never more.
    Elements { mask: u128 },
    /// Passes records with at most `limit` heavy atoms.
    MaxAtoms { limit: usize },
    /// Rejects records whose structural key appears in `keys`.
    ExcludeKeys { keys: HashSet<String> },
}

impl RecordFilter {
    pub fn passes(&self, record: &MolRecord) -> bool {
        match self {
            RecordFilter::Elements { mask } => record.elements | mask == *mask,
            RecordFilter::MaxAtoms { limit } => record.natoms <= *limit,
            RecordFilter::ExcludeKeys { keys } => !keys.contains(&record.inchikey),
        }
    }

    /// Parses one `kind:argument` spec.
    ///
    /// * `elements:C,H,N,O` — allowed element symbols;
    /// * `natoms:40` — heavy-atom ceiling;
    /// * `inchi:path/to/keys.txt` — file with one structural key per line.
    pub fn parse_spec(spec: &str) -> Result<Self, EngineError> {
        let (kind, arg) = spec
            .split_once(':')
            .ok_or_else(|| EngineError::FilterSpec(spec.to_string()))?;
        match kind {
            "elements" => {
                let mut nums = Vec::new();
                for symbol in arg.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let num = elements::atomic_number(symbol).ok_or_else(|| {
                        EngineError::FilterSpec(format!("unknown element `{symbol}` in `{spec}`"))
                    })?;
                    nums.push(num);
                }
                if nums.is_empty() {
                    return Err(EngineError::FilterSpec(spec.to_string()));
                }
                Ok(RecordFilter::Elements {
                    mask: elements::elements_to_bits(nums),
                })
            }
            "natoms" => {
                let limit = arg
                    .trim()
                    .parse()
                    .map_err(|_| EngineError::FilterSpec(spec.to_string()))?;
                Ok(RecordFilter::MaxAtoms { limit })
            }
            "inchi" => {
                let path = Path::new(arg);
                let text = fs::read_to_string(path).map_err(|source| EngineError::FilterIo {
                    path: path.to_path_buf(),
                    source,
                })?;
                let keys = text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(RecordFilter::ExcludeKeys { keys })
            }
            _ => Err(EngineError::FilterSpec(spec.to_string())),
        }
    }
}

/// Conjunction of filters: a record passes only if every filter passes.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<RecordFilter>,
}

impl FilterChain {
    pub fn new(filters: Vec<RecordFilter>) -> Self {
        Self { filters }
    }

    pub fn parse_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, EngineError> {
        let filters = specs
            .iter()
            .map(|s| RecordFilter::parse_spec(s.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { filters })
    }

    pub fn passes(&self, record: &MolRecord) -> bool {
        self.filters.iter().all(|f| f.passes(record))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(inchikey: &str, natoms: usize, symbols: &[&str]) -> MolRecord {
        let nums: Vec<u8> = symbols
            .iter()
            .map(|s| elements::atomic_number(s).unwrap())
            .collect();
        MolRecord {
            id: 1,
            smiles: String::new(),
            inchikey: inchikey.to_string(),
            natoms,
            elements: elements::elements_to_bits(nums),
        }
    }

    #[test]
    fn elements_filter_is_subset_containment() {
        let filter = RecordFilter::parse_spec("elements:C,H,N,O").unwrap();
        assert!(filter.passes(&record("a", 5, &["C", "O"])));
        assert!(filter.passes(&record("b", 5, &["C", "H", "N", "O"])));
        assert!(!filter.passes(&record("c", 5, &["C", "S"])));
    }

    #[test]
    fn natoms_filter_is_a_ceiling() {
        let filter = RecordFilter::parse_spec("natoms:10").unwrap();
        assert!(filter.passes(&record("a", 10, &["C"])));
        assert!(!filter.passes(&record("b", 11, &["C"])));
    }

    #[test]
    fn exclusion_filter_reads_keys_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclude.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "AAAA").unwrap();
        writeln!(file, "  BBBB  ").unwrap();
        writeln!(file).unwrap();

        let spec = format!("inchi:{}", path.display());
        let filter = RecordFilter::parse_spec(&spec).unwrap();
        assert!(!filter.passes(&record("AAAA", 1, &["C"])));
        assert!(!filter.passes(&record("BBBB", 1, &["C"])));
        assert!(filter.passes(&record("CCCC", 1, &["C"])));
    }

    #[test]
    fn chain_is_a_conjunction() {
        let chain = FilterChain::parse_specs(&["elements:C,H", "natoms:3"]).unwrap();
        assert!(chain.passes(&record("a", 3, &["C"])));
        assert!(!chain.passes(&record("b", 4, &["C"])));
        assert!(!chain.passes(&record("c", 3, &["N"])));
    }

    #[test]
    fn adding_a_filter_never_admits_more_records() {
        let base = FilterChain::parse_specs(&["natoms:20"]).unwrap();
        let tighter = FilterChain::parse_specs(&["natoms:20", "elements:C,H"]).unwrap();
        let records = [
            record("a", 5, &["C"]),
            record("b", 25, &["C"]),
            record("c", 5, &["N"]),
        ];
        for r in &records {
            if tighter.passes(r) {
                assert!(base.passes(r));
            }
        }
    }

    #[test]
    fn empty_chain_passes_everything() {
        let chain = FilterChain::default();
        assert!(chain.is_empty());
        assert!(chain.passes(&record("a", 1_000, &["U"])));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(RecordFilter::parse_spec("natoms").is_err());
        assert!(RecordFilter::parse_spec("natoms:many").is_err());
        assert!(RecordFilter::parse_spec("elements:Qq").is_err());
        assert!(RecordFilter::parse_spec("elements:").is_err());
        assert!(RecordFilter::parse_spec("weight:300").is_err());
        assert!(RecordFilter::parse_spec("inchi:/no/such/file").is_err());
    }
}
