//! Environment-to-pattern assignment.
//!
//! Patterns are applied in list order and every canonical environment they
//! match is claimed into a single assignment map. A later pattern that
//! matches an already-claimed environment overwrites the earlier claim, so
//! list position encodes precedence: last match wins. The set of patterns
//! that survive with at least one claimed environment is the molecule's
//! match set.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::models::atom::Atom;
use crate::core::models::bond::Bond;
use crate::core::models::mol::Mol;
use crate::core::rings::RingInfo;
use crate::core::smarts::{LabeledPattern, MatchContext};
use crate::core::substructure;

use super::environment::Environment;

/// Assigns every matched environment of `mol` to the last pattern in
/// `patterns` that claims it.
pub fn assign_environments<'a>(
    mol: &Mol<Atom, Bond>,
    patterns: &'a [LabeledPattern],
) -> BTreeMap<Environment, &'a str> {
    let rings = RingInfo::perceive(mol);
    let ctx = MatchContext::new(mol, &rings);

    let mut assignments: BTreeMap<Environment, &str> = BTreeMap::new();
    for labeled in patterns {
        for tuple in substructure::environment_matches(&ctx, &labeled.pattern) {
            assignments.insert(Environment::canonical(tuple), labeled.id.as_str());
        }
    }
    assignments
}

/// The identifiers of the patterns that won at least one environment.
pub fn matched_ids(mol: &Mol<Atom, Bond>, patterns: &[LabeledPattern]) -> BTreeSet<String> {
    assign_environments(mol, patterns)
        .into_values()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::smarts::Pattern;
    use crate::core::smiles::mol_from_smiles;

    fn labeled(id: &str, smarts: &str) -> LabeledPattern {
        LabeledPattern::new(id, Pattern::parse(smarts).unwrap())
    }

    #[test]
    fn later_pattern_overrides_earlier() {
        // Both patterns claim the central torsion of butane; the more
        // specific second pattern must win it.
        let mol = mol_from_smiles("CCCC").unwrap();
        let patterns = vec![
            labeled("p1", "[*:1]~[#6X4:2]-[#6X4:3]~[*:4]"),
            labeled("p2", "[#6:1]-[#6X4:2]-[#6X4:3]-[#6:4]"),
        ];
        let ids = matched_ids(&mol, &patterns);
        assert!(ids.contains("p1"));
        assert!(ids.contains("p2"));

        let assignments = assign_environments(&mol, &patterns);
        let heavy_torsion = Environment::canonical(vec![0, 1, 2, 3]);
        assert_eq!(assignments.get(&heavy_torsion), Some(&"p2"));
    }

    #[test]
    fn full_eclipse_drops_the_earlier_pattern() {
        // The second pattern claims every environment the first one does.
        let mol = mol_from_smiles("CC").unwrap();
        let patterns = vec![labeled("general", "[#6:1][#6:2]"), labeled("specific", "[#6:1]~[#6:2]")];
        let ids = matched_ids(&mol, &patterns);
        assert!(!ids.contains("general"));
        assert!(ids.contains("specific"));
    }

    #[test]
    fn direction_duplicates_collapse_to_one_claim() {
        let mol = mol_from_smiles("CC").unwrap();
        let patterns = vec![labeled("cc", "[#6:1][#6:2]")];
        let assignments = assign_environments(&mol, &patterns);
        assert_eq!(assignments.len(), 1);
    }

    #[test]
    fn no_patterns_means_no_matches() {
        let mol = mol_from_smiles("CCO").unwrap();
        assert!(matched_ids(&mol, &[]).is_empty());
    }

    #[test]
    fn disjoint_patterns_both_survive() {
        let mol = mol_from_smiles("CCO").unwrap();
        let patterns = vec![labeled("co", "[#6:1][#8:2]"), labeled("cc", "[#6:1][#6:2]")];
        let ids = matched_ids(&mol, &patterns);
        assert_eq!(ids.len(), 2);
    }
}
