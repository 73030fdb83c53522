//! SMILES reader.
//!
//! Parses the organic subset plus bracket atoms into a [`Mol<Atom, Bond>`],
//! assigns implicit hydrogen counts from default valences, and can convert
//! those implicit hydrogens into explicit graph atoms so patterns that name
//! hydrogens (`[#1:1]...`) have something to bind to.
//!
//! Aromatic rings are taken at face value from the lowercase notation; no
//! kekulization or aromaticity re-perception is performed.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::core::elements;
use crate::core::models::atom::{Atom, Chirality};
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::mol::Mol;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmilesError {
    #[error("unexpected character `{ch}` at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unknown element `{symbol}` at position {pos}")]
    UnknownElement { pos: usize, symbol: String },

    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },

    #[error("unbalanced branch parentheses")]
    UnbalancedBranch,

    #[error("ring-closure digit {0} was never paired")]
    UnpairedRingBond(u16),

    #[error("ring-closure {0} declares conflicting bond symbols")]
    RingBondConflict(u16),

    #[error("bond symbol with no following atom")]
    DanglingBond,

    #[error("empty SMILES input")]
    Empty,
}

/// Parses SMILES and adds explicit hydrogens, mirroring the cleaning the
/// matcher expects. This is the entry point the pipeline uses.
pub fn mol_from_smiles(input: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = parse_smiles(input)?;
    add_explicit_hydrogens(&mut mol);
    Ok(mol)
}

/// Parses SMILES into a molecular graph with implicit hydrogen counts.
pub fn parse_smiles(input: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    Parser::new(input).parse()
}

/// Converts every implicit hydrogen into an explicit graph atom bonded by
/// a single bond, clearing the per-atom counts.
pub fn add_explicit_hydrogens(mol: &mut Mol<Atom, Bond>) {
    let heavy: Vec<NodeIndex> = mol.atoms().collect();
    for idx in heavy {
        let count = mol.atom(idx).hydrogen_count;
        mol.atom_mut(idx).hydrogen_count = 0;
        for _ in 0..count {
            let h = mol.add_atom(Atom::from_atomic_num(1));
            mol.add_bond(idx, h, Bond::new(BondOrder::Single));
        }
    }
}

/// Number of non-hydrogen atoms.
pub fn heavy_atom_count(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms().filter(|&i| mol.atom(i).atomic_num != 1).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BondTok {
    Single,
    Double,
    Triple,
    Aromatic,
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    mol: Mol<Atom, Bond>,
    /// Atoms written without brackets; these receive implicit hydrogens.
    organic: Vec<bool>,
    prev: Option<NodeIndex>,
    pending_bond: Option<BondTok>,
    branch_stack: Vec<Option<NodeIndex>>,
    ring_bonds: HashMap<u16, (NodeIndex, Option<BondTok>)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
            mol: Mol::new(),
            organic: Vec::new(),
            prev: None,
            pending_bond: None,
            branch_stack: Vec::new(),
            ring_bonds: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn parse(mut self) -> Result<Mol<Atom, Bond>, SmilesError> {
        if self.bytes.is_empty() {
            return Err(SmilesError::Empty);
        }
        while let Some(b) = self.peek() {
            match b {
                b'-' | b'/' | b'\\' => {
                    // Directional bonds carry E/Z information the matcher
                    // does not consume; they bind as single bonds.
                    self.bump();
                    self.set_pending(BondTok::Single)?;
                }
                b'=' => {
                    self.bump();
                    self.set_pending(BondTok::Double)?;
                }
                b'#' => {
                    self.bump();
                    self.set_pending(BondTok::Triple)?;
                }
                b':' => {
                    self.bump();
                    self.set_pending(BondTok::Aromatic)?;
                }
                b'.' => {
                    if self.pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond);
                    }
                    self.bump();
                    self.prev = None;
                }
                b'(' => {
                    self.bump();
                    self.branch_stack.push(self.prev);
                }
                b')' => {
                    self.bump();
                    self.prev = self
                        .branch_stack
                        .pop()
                        .ok_or(SmilesError::UnbalancedBranch)?;
                }
                b'0'..=b'9' => {
                    let digit = (self.bump().unwrap() - b'0') as u16;
                    self.close_ring(digit)?;
                }
                b'%' => {
                    self.bump();
                    let number = self.parse_two_digit()?;
                    self.close_ring(number)?;
                }
                b'[' => {
                    let atom = self.parse_bracket_atom()?;
                    self.attach(atom, false)?;
                }
                _ => {
                    let atom = self.parse_organic_atom()?;
                    self.attach(atom, true)?;
                }
            }
        }
        if self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond);
        }
        if !self.branch_stack.is_empty() {
            return Err(SmilesError::UnbalancedBranch);
        }
        if let Some((&digit, _)) = self.ring_bonds.iter().next() {
            return Err(SmilesError::UnpairedRingBond(digit));
        }
        assign_implicit_hydrogens(&mut self.mol, &self.organic);
        Ok(self.mol)
    }

    fn set_pending(&mut self, tok: BondTok) -> Result<(), SmilesError> {
        if self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond);
        }
        self.pending_bond = Some(tok);
        Ok(())
    }

    fn parse_two_digit(&mut self) -> Result<u16, SmilesError> {
        let mut value = 0u16;
        for _ in 0..2 {
            match self.peek() {
                Some(b @ b'0'..=b'9') => {
                    self.bump();
                    value = value * 10 + (b - b'0') as u16;
                }
                _ => {
                    return Err(SmilesError::UnexpectedChar {
                        pos: self.pos,
                        ch: self.peek().map(char::from).unwrap_or(' '),
                    });
                }
            }
        }
        Ok(value)
    }

    fn parse_organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let pos = self.pos;
        let b = self.bump().ok_or(SmilesError::Empty)?;
        let (atomic_num, aromatic) = match b {
            b'*' => (0, false),
            b'B' => {
                if self.peek() == Some(b'r') {
                    self.bump();
                    (35, false)
                } else {
                    (5, false)
                }
            }
            b'C' => {
                if self.peek() == Some(b'l') {
                    self.bump();
                    (17, false)
                } else {
                    (6, false)
                }
            }
            b'N' => (7, false),
            b'O' => (8, false),
            b'P' => (15, false),
            b'S' => (16, false),
            b'F' => (9, false),
            b'I' => (53, false),
            b'b' => (5, true),
            b'c' => (6, true),
            b'n' => (7, true),
            b'o' => (8, true),
            b'p' => (15, true),
            b's' => (16, true),
            other => {
                return Err(SmilesError::UnexpectedChar {
                    pos,
                    ch: char::from(other),
                });
            }
        };
        Ok(Atom {
            atomic_num,
            is_aromatic: aromatic,
            ..Atom::default()
        })
    }

    fn parse_bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        self.bump(); // consume '['

        let mut atom = Atom::default();

        // isotope
        let mut isotope = 0u16;
        let mut saw_isotope = false;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            self.bump();
            isotope = isotope * 10 + (b - b'0') as u16;
            saw_isotope = true;
        }
        if saw_isotope {
            atom.isotope = isotope;
        }

        // element symbol
        let sym_pos = self.pos;
        match self.peek() {
            Some(b'*') => {
                self.bump();
                atom.atomic_num = 0;
            }
            Some(b) if b.is_ascii_uppercase() => {
                self.bump();
                let mut symbol = String::from(char::from(b));
                if let Some(lo) = self.peek() {
                    if lo.is_ascii_lowercase() {
                        let two = format!("{symbol}{}", char::from(lo));
                        if elements::atomic_number(&two).is_some() {
                            self.bump();
                            symbol = two;
                        }
                    }
                }
                atom.atomic_num = elements::atomic_number(&symbol).ok_or_else(|| {
                    SmilesError::UnknownElement {
                        pos: sym_pos,
                        symbol,
                    }
                })?;
            }
            Some(b) if b.is_ascii_lowercase() => {
                self.bump();
                let mut symbol = String::from(char::from(b));
                if let Some(lo) = self.peek() {
                    if lo.is_ascii_lowercase() {
                        let two = format!("{symbol}{}", char::from(lo));
                        if elements::aromatic_atomic_number(&two).is_some() {
                            self.bump();
                            symbol = two;
                        }
                    }
                }
                atom.atomic_num =
                    elements::aromatic_atomic_number(&symbol).ok_or_else(|| {
                        SmilesError::UnknownElement {
                            pos: sym_pos,
                            symbol,
                        }
                    })?;
                atom.is_aromatic = true;
            }
            _ => return Err(SmilesError::UnclosedBracket { pos: open }),
        }

        // chirality
        if self.peek() == Some(b'@') {
            self.bump();
            if self.peek() == Some(b'@') {
                self.bump();
                atom.chirality = Chirality::Cw;
            } else {
                atom.chirality = Chirality::Ccw;
            }
        }

        // hydrogen count
        if self.peek() == Some(b'H') {
            self.bump();
            let mut count = 1u8;
            if let Some(b @ b'0'..=b'9') = self.peek() {
                self.bump();
                count = b - b'0';
            }
            atom.hydrogen_count = count;
        }

        // charge
        match self.peek() {
            Some(sign @ (b'+' | b'-')) => {
                self.bump();
                let unit: i8 = if sign == b'+' { 1 } else { -1 };
                let mut charge = unit;
                if let Some(b @ b'0'..=b'9') = self.peek() {
                    self.bump();
                    charge = unit * (b - b'0') as i8;
                } else {
                    while self.peek() == Some(sign) {
                        self.bump();
                        charge += unit;
                    }
                }
                atom.formal_charge = charge;
            }
            _ => {}
        }

        // atom map: parsed and discarded, molecules carry no tags
        if self.peek() == Some(b':') {
            self.bump();
            while let Some(b'0'..=b'9') = self.peek() {
                self.bump();
            }
        }

        if self.bump() != Some(b']') {
            return Err(SmilesError::UnclosedBracket { pos: open });
        }
        Ok(atom)
    }

    fn attach(&mut self, atom: Atom, organic: bool) -> Result<(), SmilesError> {
        let aromatic = atom.is_aromatic;
        let idx = self.mol.add_atom(atom);
        self.organic.push(organic);
        if let Some(prev) = self.prev {
            let tok = self.pending_bond.take();
            let order = self.bond_order(prev, idx, tok, aromatic);
            self.mol.add_bond(prev, idx, Bond::new(order));
        } else if self.pending_bond.is_some() {
            return Err(SmilesError::DanglingBond);
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn bond_order(
        &self,
        prev: NodeIndex,
        _next: NodeIndex,
        tok: Option<BondTok>,
        next_aromatic: bool,
    ) -> BondOrder {
        match tok {
            Some(BondTok::Single) => BondOrder::Single,
            Some(BondTok::Double) => BondOrder::Double,
            Some(BondTok::Triple) => BondOrder::Triple,
            Some(BondTok::Aromatic) => BondOrder::Aromatic,
            None => {
                if self.mol.atom(prev).is_aromatic && next_aromatic {
                    BondOrder::Aromatic
                } else {
                    BondOrder::Single
                }
            }
        }
    }

    fn close_ring(&mut self, digit: u16) -> Result<(), SmilesError> {
        let here = self.prev.ok_or(SmilesError::UnexpectedChar {
            pos: self.pos.saturating_sub(1),
            ch: char::from_digit(digit as u32 % 10, 10).unwrap_or('?'),
        })?;
        let tok = self.pending_bond.take();
        match self.ring_bonds.remove(&digit) {
            None => {
                self.ring_bonds.insert(digit, (here, tok));
                Ok(())
            }
            Some((other, open_tok)) => {
                let tok = match (open_tok, tok) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(SmilesError::RingBondConflict(digit));
                    }
                    (Some(a), _) => Some(a),
                    (None, b) => b,
                };
                let aromatic = self.mol.atom(here).is_aromatic;
                let order = self.bond_order(other, here, tok, aromatic);
                self.mol.add_bond(other, here, Bond::new(order));
                Ok(())
            }
        }
    }
}

/// Assigns implicit hydrogens to organic-subset atoms: the count that tops
/// the bond-order sum up to the element's smallest accommodating default
/// valence. Bracket atoms keep whatever `H` count they declared.
fn assign_implicit_hydrogens(mol: &mut Mol<Atom, Bond>, organic: &[bool]) {
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for idx in atoms {
        if !organic[idx.index()] {
            continue;
        }
        let doubled: u8 = mol
            .bonds_of(idx)
            .map(|ei| mol.bond(ei).order.doubled())
            .sum();
        let bond_sum = doubled / 2;
        let atom = mol.atom_mut(idx);
        atom.hydrogen_count = elements::default_valences(atom.atomic_num)
            .iter()
            .copied()
            .find(|&v| v >= bond_sum)
            .map(|v| v - bond_sum)
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        let idx = mol.atoms().next().unwrap();
        assert_eq!(mol.atom(idx).atomic_num, 6);
        assert_eq!(mol.atom(idx).hydrogen_count, 4);
    }

    #[test]
    fn ethanol_graph() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        let hs: Vec<u8> = mol.atoms().map(|i| mol.atom(i).hydrogen_count).collect();
        assert_eq!(hs, vec![3, 2, 1]);
    }

    #[test]
    fn double_bond_reduces_hydrogens() {
        let mol = parse_smiles("C=C").unwrap();
        for idx in mol.atoms() {
            assert_eq!(mol.atom(idx).hydrogen_count, 2);
        }
    }

    #[test]
    fn benzene_ring() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for idx in mol.atoms() {
            let atom = mol.atom(idx);
            assert!(atom.is_aromatic);
            assert_eq!(atom.hydrogen_count, 1);
        }
        for ei in mol.bonds() {
            assert_eq!(mol.bond(ei).order, BondOrder::Aromatic);
        }
    }

    #[test]
    fn pyridine_nitrogen_has_no_hydrogen() {
        let mol = parse_smiles("c1ccncc1").unwrap();
        let n = mol.atoms().find(|&i| mol.atom(i).atomic_num == 7).unwrap();
        assert_eq!(mol.atom(n).hydrogen_count, 0);
    }

    #[test]
    fn pyrrole_needs_explicit_nh() {
        let mol = parse_smiles("c1cc[nH]c1").unwrap();
        let n = mol.atoms().find(|&i| mol.atom(i).atomic_num == 7).unwrap();
        assert_eq!(mol.atom(n).hydrogen_count, 1);
    }

    #[test]
    fn branch_and_ring_closure() {
        let mol = parse_smiles("CC(C)C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 9);
        assert_eq!(mol.bond_count(), 9);
    }

    #[test]
    fn percent_ring_closure() {
        let mol = parse_smiles("C%12CCCCC%12").unwrap();
        assert_eq!(mol.bond_count(), 6);
    }

    #[test]
    fn bracket_atom_properties() {
        let mol = parse_smiles("[13C@H3+]").unwrap();
        let idx = mol.atoms().next().unwrap();
        let atom = mol.atom(idx);
        assert_eq!(atom.atomic_num, 6);
        assert_eq!(atom.isotope, 13);
        assert_eq!(atom.chirality, Chirality::Ccw);
        assert_eq!(atom.hydrogen_count, 3);
        assert_eq!(atom.formal_charge, 1);
    }

    #[test]
    fn charges_stack_and_count() {
        let double_minus = parse_smiles("[O--]").unwrap();
        let idx = double_minus.atoms().next().unwrap();
        assert_eq!(double_minus.atom(idx).formal_charge, -2);

        let numbered = parse_smiles("[Fe+3]").unwrap();
        let idx = numbered.atoms().next().unwrap();
        assert_eq!(numbered.atom(idx).formal_charge, 3);
    }

    #[test]
    fn atom_map_is_discarded() {
        let mol = parse_smiles("[CH3:1][CH3:2]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 1);
    }

    #[test]
    fn disconnected_components() {
        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn two_letter_organic_elements() {
        let mol = parse_smiles("ClCBr").unwrap();
        let nums: Vec<u8> = mol.atoms().map(|i| mol.atom(i).atomic_num).collect();
        assert_eq!(nums, vec![17, 6, 35]);
    }

    #[test]
    fn explicit_hydrogens_are_added() {
        let mol = mol_from_smiles("CO").unwrap();
        // CH3-OH: 2 heavy + 4 hydrogens
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(heavy_atom_count(&mol), 2);
        for idx in mol.atoms() {
            assert_eq!(mol.atom(idx).hydrogen_count, 0);
        }
    }

    #[test]
    fn directional_bonds_become_single() {
        let mol = parse_smiles("C/C=C/C").unwrap();
        let orders: Vec<BondOrder> = mol.bonds().map(|e| mol.bond(e).order).collect();
        assert_eq!(
            orders,
            vec![BondOrder::Single, BondOrder::Double, BondOrder::Single]
        );
    }

    #[test]
    fn errors() {
        assert!(matches!(parse_smiles(""), Err(SmilesError::Empty)));
        assert!(matches!(
            parse_smiles("C("),
            Err(SmilesError::UnbalancedBranch)
        ));
        assert!(matches!(
            parse_smiles("C1CC"),
            Err(SmilesError::UnpairedRingBond(1))
        ));
        assert!(matches!(
            parse_smiles("C="),
            Err(SmilesError::DanglingBond)
        ));
        assert!(matches!(
            parse_smiles("[Xx]"),
            Err(SmilesError::UnknownElement { .. })
        ));
        assert!(matches!(
            parse_smiles("C=1CCCC-1"),
            Err(SmilesError::RingBondConflict(1))
        ));
    }

    #[test]
    fn ring_closure_bond_specified_on_either_side() {
        let a = parse_smiles("C=1CCCCC=1").unwrap();
        let b = parse_smiles("C=1CCCCC1").unwrap();
        let double_bonds =
            |m: &Mol<Atom, Bond>| m.bonds().filter(|&e| m.bond(e).order == BondOrder::Double).count();
        assert_eq!(double_bonds(&a), 1);
        assert_eq!(double_bonds(&b), 1);
    }
}
