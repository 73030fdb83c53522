//! Ring perception for SMARTS ring primitives.
//!
//! A bond is a ring bond iff it is not a bridge of the molecular graph, and
//! an atom is a ring atom iff it has at least one ring bond. This is all the
//! `R`/`R0` atom primitives and the `@` bond primitive need; no SSSR is
//! computed.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::core::models::mol::Mol;

#[derive(Debug, Clone)]
pub struct RingInfo {
    ring_bonds: HashSet<(usize, usize)>,
    ring_atoms: Vec<bool>,
}

impl RingInfo {
    pub fn perceive<A, B>(mol: &Mol<A, B>) -> Self {
        let n = mol.atom_count();
        let bridges = find_bridges(mol);

        let mut ring_bonds = HashSet::new();
        let mut ring_atoms = vec![false; n];
        for ei in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(ei) else {
                continue;
            };
            let key = normalize(a.index(), b.index());
            if !bridges.contains(&key) {
                ring_bonds.insert(key);
                ring_atoms[a.index()] = true;
                ring_atoms[b.index()] = true;
            }
        }
        Self {
            ring_bonds,
            ring_atoms,
        }
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.ring_bonds.contains(&normalize(a.index(), b.index()))
    }

    pub fn is_ring_atom(&self, idx: NodeIndex) -> bool {
        self.ring_atoms.get(idx.index()).copied().unwrap_or(false)
    }
}

fn normalize(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Classic DFS bridge finding with discovery times and low links.
fn find_bridges<A, B>(mol: &Mol<A, B>) -> HashSet<(usize, usize)> {
    let n = mol.atom_count();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;
    let mut bridges = HashSet::new();

    fn dfs<A, B>(
        mol: &Mol<A, B>,
        at: NodeIndex,
        parent: Option<NodeIndex>,
        disc: &mut [usize],
        low: &mut [usize],
        timer: &mut usize,
        bridges: &mut HashSet<(usize, usize)>,
    ) {
        disc[at.index()] = *timer;
        low[at.index()] = *timer;
        *timer += 1;
        let mut parent_skipped = false;
        for nb in mol.neighbors(at) {
            if Some(nb) == parent && !parent_skipped {
                // Skip the tree edge once; parallel edges would be cycles,
                // but molecular graphs have no parallel bonds anyway.
                parent_skipped = true;
                continue;
            }
            if disc[nb.index()] == usize::MAX {
                dfs(mol, nb, Some(at), disc, low, timer, bridges);
                low[at.index()] = low[at.index()].min(low[nb.index()]);
                if low[nb.index()] > disc[at.index()] {
                    bridges.insert(normalize(at.index(), nb.index()));
                }
            } else {
                low[at.index()] = low[at.index()].min(disc[nb.index()]);
            }
        }
    }

    for start in mol.atoms() {
        if disc[start.index()] == usize::MAX {
            dfs(mol, start, None, &mut disc, &mut low, &mut timer, &mut bridges);
        }
    }
    bridges
}
