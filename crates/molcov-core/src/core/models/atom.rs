/// Tetrahedral chirality tag parsed from `@`/`@@`.
///
/// On a molecule atom it records that the input SMILES declared a
/// stereocenter; on a SMARTS query atom it constrains matching to
/// stereo-tagged targets. Neighbor ordering is not tracked — nothing
/// downstream consumes the handedness itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// Counterclockwise (`@`).
    Ccw,
    /// Clockwise (`@@`).
    Cw,
}

/// A molecular graph node: intrinsic atomic properties only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, ...). `0` is the `*` wildcard.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number; `0` means natural abundance.
    pub isotope: u16,
    /// Implicit (suppressed) hydrogens implied by valence. Cleared once
    /// explicit hydrogens are added to the graph.
    pub hydrogen_count: u8,
    /// Whether the atom was written in aromatic (lowercase) form.
    pub is_aromatic: bool,
    pub chirality: Chirality,
}

impl Atom {
    pub fn from_atomic_num(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }
}
