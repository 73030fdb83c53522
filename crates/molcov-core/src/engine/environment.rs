//! Canonical atom-environment tuples.
//!
//! An environment is the ordered tuple of target atom indices a pattern's
//! tagged atoms landed on. Substructure search reports each embedding in
//! both traversal directions, so tuples are canonicalized to a single
//! orientation before they are used as assignment keys.

/// A canonicalized atom-index tuple identifying one matched environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Environment(Vec<usize>);

impl Environment {
    /// Canonicalizes a raw tuple: if the first atom index exceeds the
    /// last, the tuple is reversed, so the two traversal directions of the
    /// same embedding collapse to one key.
    pub fn canonical(mut atoms: Vec<usize>) -> Self {
        if let (Some(&first), Some(&last)) = (atoms.first(), atoms.last()) {
            if first > last {
                atoms.reverse();
            }
        }
        Self(atoms)
    }

    pub fn atoms(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_reverse_collapse() {
        let forward = Environment::canonical(vec![0, 1, 2, 3]);
        let reverse = Environment::canonical(vec![3, 2, 1, 0]);
        assert_eq!(forward, reverse);
        assert_eq!(forward.atoms(), &[0, 1, 2, 3]);
    }

    #[test]
    fn already_canonical_is_untouched() {
        let env = Environment::canonical(vec![1, 5, 2]);
        assert_eq!(env.atoms(), &[1, 5, 2]);
    }

    #[test]
    fn ties_on_endpoints_keep_order() {
        // Equal endpoints: no reversal, interior order distinguishes.
        let a = Environment::canonical(vec![2, 0, 2]);
        assert_eq!(a.atoms(), &[2, 0, 2]);
    }

    #[test]
    fn empty_and_singleton_tuples() {
        assert_eq!(Environment::canonical(vec![]).atoms(), &[] as &[usize]);
        assert_eq!(Environment::canonical(vec![7]).atoms(), &[7]);
    }
}
