/// An immutable molecule (or fragment) record as produced by the store.
///
/// Records carry precomputed summary data so the filter chain can reject
/// them without rebuilding the molecular graph: the element-presence
/// bitmask (bit per atomic number, see
/// [`elements_to_bits`](crate::core::elements::elements_to_bits)), the
/// heavy-atom count, and a unique structural key (InChIKey or equivalent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MolRecord {
    pub id: i64,
    /// Canonical SMILES; the pipeline rebuilds the graph from this.
    pub smiles: String,
    /// Unique structural hash, used by the exclusion filter.
    pub inchikey: String,
    /// Heavy-atom count.
    pub natoms: usize,
    /// Element-presence bitmask.
    pub elements: u128,
}
