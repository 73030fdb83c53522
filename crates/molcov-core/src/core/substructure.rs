//! Backtracking substructure search.
//!
//! A VF2-style matcher maps every query atom onto a distinct target atom
//! such that all atom and bond expressions hold. All embeddings are
//! reported, including symmetry-equivalent ones: a linear `CC` query
//! matches ethane twice (once per direction), and downstream environment
//! counting relies on that.

use petgraph::graph::NodeIndex;

use crate::core::smarts::{MatchContext, Pattern};

/// One embedding: target atom index for each query atom, indexed by query
/// node position.
pub type AtomMapping = Vec<NodeIndex>;

/// Returns every embedding of `pattern` in the target molecule.
pub fn find_all(ctx: &MatchContext, pattern: &Pattern) -> Vec<AtomMapping> {
    let query = pattern.query();
    let n_query = query.atom_count();
    if n_query == 0 || n_query > ctx.mol.atom_count() {
        return Vec::new();
    }

    // Match high-degree query atoms first; their bond constraints prune
    // the search earliest.
    let mut order: Vec<NodeIndex> = query.atoms().collect();
    order.sort_by_key(|&idx| std::cmp::Reverse(query.degree(idx)));

    let mut state = SearchState {
        ctx,
        pattern,
        order: &order,
        mapping: vec![NodeIndex::end(); n_query],
        used: vec![false; ctx.mol.atom_count()],
        found: Vec::new(),
    };
    state.extend(0);
    state.found
}

/// Environment tuples for `pattern` in the target: for each embedding, the
/// target atom indices of the tagged query atoms, ordered by tag value.
/// Patterns with no tags yield one empty tuple per embedding, so the caller
/// can still count matches.
pub fn environment_matches(ctx: &MatchContext, pattern: &Pattern) -> Vec<Vec<usize>> {
    let tagged = pattern.tagged_atoms();
    find_all(ctx, pattern)
        .into_iter()
        .map(|mapping| {
            tagged
                .iter()
                .map(|&(_, query_idx)| mapping[query_idx.index()].index())
                .collect()
        })
        .collect()
}

struct SearchState<'a> {
    ctx: &'a MatchContext<'a>,
    pattern: &'a Pattern,
    order: &'a [NodeIndex],
    mapping: Vec<NodeIndex>,
    used: Vec<bool>,
    found: Vec<AtomMapping>,
}

impl SearchState<'_> {
    fn extend(&mut self, depth: usize) {
        if depth == self.order.len() {
            self.found.push(self.mapping.clone());
            return;
        }
        let query_idx = self.order[depth];
        for target_idx in self.ctx.mol.atoms() {
            if self.used[target_idx.index()] {
                continue;
            }
            if !self.feasible(query_idx, target_idx) {
                continue;
            }
            self.mapping[query_idx.index()] = target_idx;
            self.used[target_idx.index()] = true;
            self.extend(depth + 1);
            self.used[target_idx.index()] = false;
            self.mapping[query_idx.index()] = NodeIndex::end();
        }
    }

    fn feasible(&self, query_idx: NodeIndex, target_idx: NodeIndex) -> bool {
        let query = self.pattern.query();
        if !query.atom(query_idx).expr.matches(self.ctx, target_idx) {
            return false;
        }
        // Every already-mapped query neighbor must be a target neighbor
        // through a bond that satisfies the query's bond expression.
        for query_nb in query.neighbors(query_idx) {
            let mapped = self.mapping[query_nb.index()];
            if mapped == NodeIndex::end() {
                continue;
            }
            let Some(target_edge) = self.ctx.mol.bond_between(target_idx, mapped) else {
                return false;
            };
            let Some(query_edge) = query.bond_between(query_idx, query_nb) else {
                return false;
            };
            if !query.bond(query_edge).matches(self.ctx, target_edge) {
                return false;
            }
        }
        true
    }
}
