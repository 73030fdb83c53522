//! Per-pattern aggregation of matching structures.

use std::collections::BTreeMap;

/// The structures matched by one pattern, split by record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    /// Display text of the pattern, seeded on its first claim.
    pub smarts: String,
    pub molecules: Vec<String>,
    pub fragments: Vec<String>,
}

/// Pattern identifier to [`MatchSet`] aggregate for one run.
///
/// Entries exist only for patterns that matched at least once. SMILES are
/// appended in the order results are committed, without deduplication; a
/// structure matching under both kinds appears in both lists.
#[derive(Debug, Clone, Default)]
pub struct MatchRegistry {
    sets: BTreeMap<String, MatchSet>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &str, smarts: &str, smiles: &str, is_fragment: bool) {
        let set = self.sets.entry(id.to_string()).or_insert_with(|| MatchSet {
            smarts: smarts.to_string(),
            ..MatchSet::default()
        });
        if is_fragment {
            set.fragments.push(smiles.to_string());
        } else {
            set.molecules.push(smiles.to_string());
        }
    }

    pub fn get(&self, id: &str) -> Option<&MatchSet> {
        self.sets.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchSet)> {
        self.sets.iter().map(|(id, set)| (id.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
