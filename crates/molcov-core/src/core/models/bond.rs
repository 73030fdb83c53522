/// Bond order of a molecular graph edge.
///
/// Aromatic rings are not kekulized: a bond between two aromatic atoms that
/// was written implicitly (or as `:`) stays [`BondOrder::Aromatic`] and
/// contributes 1.5 to valence sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Twice the nominal bond order, so aromatic bonds stay integral.
    pub fn doubled(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bond {
    pub order: BondOrder,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self { order }
    }
}
