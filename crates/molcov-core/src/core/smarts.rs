//! SMARTS-subset pattern compiler.
//!
//! Compiles a pattern string into a query graph whose nodes carry
//! [`AtomExpr`] trees and whose edges carry [`BondExpr`] trees, evaluated
//! against target atoms during substructure search. Atoms may carry a
//! 1-based positional tag (`:n`) naming their place in the reported
//! environment tuple.
//!
//! The supported primitive set covers what force-field style patterns use:
//! elements (`#n`, symbols, aromatic lowercase), `*`/`a`/`A`, degree `D`,
//! hydrogen counts `H`/`h`, connectivity `X`, valence `v`, charge, ring
//! membership `R`/`R0`, chirality `@`/`@@`, and the `!`/`&`/`,`/`;` logic
//! operators. Anything else (recursive `$()`, ring sizes `r`, ...) is a
//! parse error rather than a silently-ignored constraint.

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::core::elements;
use crate::core::models::atom::{Atom, Chirality};
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::mol::Mol;
use crate::core::rings::RingInfo;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmartsError {
    #[error("unexpected character `{ch}` at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unknown element `{symbol}` at position {pos}")]
    UnknownElement { pos: usize, symbol: String },

    #[error("unsupported SMARTS primitive `{feature}` at position {pos}")]
    Unsupported { pos: usize, feature: &'static str },

    #[error("unclosed bracket expression starting at position {pos}")]
    UnclosedBracket { pos: usize },

    #[error("empty bracket expression at position {pos}")]
    EmptyBracket { pos: usize },

    #[error("unbalanced branch parentheses")]
    UnbalancedBranch,

    #[error("ring-closure digit {0} was never paired")]
    UnpairedRingBond(u16),

    #[error("bond expression with no following atom")]
    DanglingBond,

    #[error("empty SMARTS pattern")]
    Empty,
}

/// Query test applied to one target atom.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Wildcard `*`.
    True,
    /// Element test. `aromatic` is `None` for `#n` (either form),
    /// `Some(true)` for lowercase, `Some(false)` for uppercase.
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// Any aromatic atom (`a`).
    Aromatic,
    /// Any aliphatic atom (`A`).
    Aliphatic,
    Isotope(u16),
    /// Explicit-connection count (`D`): every graph neighbor counts,
    /// explicit hydrogens included.
    Degree(u8),
    /// Total hydrogen count, implicit plus explicit neighbors (`H`).
    TotalHCount(u8),
    /// Implicit hydrogen count (`h`).
    ImplicitHCount(u8),
    /// Degree plus implicit hydrogens (`X`).
    Connectivity(u8),
    /// Bond-order sum plus implicit hydrogens (`v`).
    Valence(u8),
    Charge(i8),
    /// In at least one ring (`R`, `Rn`).
    InRing,
    /// In no ring (`R0`).
    NotInRing,
    /// `@`/`@@`: requires a stereo-tagged target atom. Only presence is
    /// tested, never handedness: a `@` query accepts a `@@` target and
    /// vice versa, since without neighbor-order bookkeeping the written
    /// direction of the same physical center is arbitrary.
    Chirality(Chirality),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// Query test applied to one target bond.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// Any bond (`~`).
    Any,
    Single,
    Double,
    Triple,
    Aromatic,
    /// Ring bond (`@`).
    Ring,
    /// Implicit SMARTS bond: single or aromatic.
    SingleOrAromatic,
    /// Directional single bond (`/` or `\`); matches as single.
    Directional,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// One pattern atom: its test expression plus the 1-based positional tag
/// (`0` = untagged, excluded from environment tuples).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAtom {
    pub expr: AtomExpr,
    pub map_num: u16,
}

/// A compiled substructure pattern along with its display text.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    query: Mol<QueryAtom, BondExpr>,
}

impl Pattern {
    pub fn parse(text: &str) -> Result<Self, SmartsError> {
        let query = Parser::new(text).parse()?;
        Ok(Self {
            text: text.to_string(),
            query,
        })
    }

    /// The original pattern text, used as the display form in aggregates.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn query(&self) -> &Mol<QueryAtom, BondExpr> {
        &self.query
    }

    /// Tagged atoms sorted by tag value; defines the order of environment
    /// tuple positions.
    pub fn tagged_atoms(&self) -> Vec<(u16, NodeIndex)> {
        let mut tagged: Vec<(u16, NodeIndex)> = self
            .query
            .atoms()
            .filter_map(|idx| {
                let map_num = self.query.atom(idx).map_num;
                (map_num != 0).then_some((map_num, idx))
            })
            .collect();
        tagged.sort_by_key(|&(map_num, _)| map_num);
        tagged
    }
}

/// A pattern paired with the identifier it reports matches under.
#[derive(Debug, Clone)]
pub struct LabeledPattern {
    pub id: String,
    pub pattern: Pattern,
}

impl LabeledPattern {
    pub fn new(id: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            id: id.into(),
            pattern,
        }
    }
}

/// Target-side state shared by all expression evaluations for one molecule.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub rings: &'a RingInfo,
}

impl<'a> MatchContext<'a> {
    pub fn new(mol: &'a Mol<Atom, Bond>, rings: &'a RingInfo) -> Self {
        Self { mol, rings }
    }
}

fn explicit_h_neighbors(ctx: &MatchContext, idx: NodeIndex) -> u8 {
    ctx.mol
        .neighbors(idx)
        .filter(|&nb| ctx.mol.atom(nb).atomic_num == 1)
        .count() as u8
}

fn bond_order_sum(ctx: &MatchContext, idx: NodeIndex) -> u8 {
    let doubled: u8 = ctx
        .mol
        .bonds_of(idx)
        .map(|ei| ctx.mol.bond(ei).order.doubled())
        .sum();
    doubled / 2
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => {
                atom.atomic_num == *atomic_num
                    && aromatic.is_none_or(|a| atom.is_aromatic == a)
            }
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => ctx.mol.degree(idx) as u8 == *d,
            AtomExpr::TotalHCount(h) => {
                atom.hydrogen_count + explicit_h_neighbors(ctx, idx) == *h
            }
            AtomExpr::ImplicitHCount(h) => atom.hydrogen_count == *h,
            AtomExpr::Connectivity(x) => {
                ctx.mol.degree(idx) as u8 + atom.hydrogen_count == *x
            }
            AtomExpr::Valence(v) => bond_order_sum(ctx, idx) + atom.hydrogen_count == *v,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::InRing => ctx.rings.is_ring_atom(idx),
            AtomExpr::NotInRing => !ctx.rings.is_ring_atom(idx),
            AtomExpr::Chirality(q) => match q {
                Chirality::None => true,
                Chirality::Cw | Chirality::Ccw => atom.chirality != Chirality::None,
            },
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, idx)),
            AtomExpr::Not(expr) => !expr.matches(ctx, idx),
        }
    }
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let bond: &Bond = ctx.mol.bond(edge);
        match self {
            BondExpr::Any => true,
            BondExpr::Single | BondExpr::Directional => bond.order == BondOrder::Single,
            BondExpr::Double => bond.order == BondOrder::Double,
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => bond.order == BondOrder::Aromatic,
            BondExpr::SingleOrAromatic => {
                bond.order == BondOrder::Single || bond.order == BondOrder::Aromatic
            }
            BondExpr::Ring => match ctx.mol.bond_endpoints(edge) {
                Some((a, b)) => ctx.rings.is_ring_bond(a, b),
                None => false,
            },
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, edge)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, edge)),
            BondExpr::Not(expr) => !expr.matches(ctx, edge),
        }
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    mol: Mol<QueryAtom, BondExpr>,
    prev: Option<NodeIndex>,
    pending_bond: Option<BondExpr>,
    branch_stack: Vec<Option<NodeIndex>>,
    ring_bonds: HashMap<u16, (NodeIndex, Option<BondExpr>)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
            mol: Mol::new(),
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

    fn unexpected(&self, ch: u8) -> SmartsError {
        SmartsError::UnexpectedChar {
            pos: self.pos,
            ch: char::from(ch),
        }
    }

    fn parse(mut self) -> Result<Mol<QueryAtom, BondExpr>, SmartsError> {
        if self.bytes.is_empty() {
            return Err(SmartsError::Empty);
        }
        while let Some(b) = self.peek() {
            match b {
                b'(' => {
                    self.bump();
                    self.branch_stack.push(self.prev);
                }
                b')' => {
                    self.bump();
                    self.prev = self
                        .branch_stack
                        .pop()
                        .ok_or(SmartsError::UnbalancedBranch)?;
                }
                b'.' => {
                    if self.pending_bond.is_some() {
                        return Err(SmartsError::DanglingBond);
                    }
                    self.bump();
                    self.prev = None;
                }
                b'0'..=b'9' => {
                    let digit = (self.bump().unwrap() - b'0') as u16;
                    self.close_ring(digit)?;
                }
                b'%' => {
                    self.bump();
                    let mut number = 0u16;
                    for _ in 0..2 {
                        match self.peek() {
                            Some(d @ b'0'..=b'9') => {
                                self.bump();
                                number = number * 10 + (d - b'0') as u16;
                            }
                            other => {
                                return Err(self
                                    .unexpected(other.unwrap_or(b' ')));
                            }
                        }
                    }
                    self.close_ring(number)?;
                }
                b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!' | b'&'
                | b',' | b';' => {
                    if self.pending_bond.is_some() {
                        return Err(SmartsError::DanglingBond);
                    }
                    let expr = self.parse_bond_expr()?;
                    self.pending_bond = Some(expr);
                }
                b'[' => {
                    let (expr, map_num) = self.parse_bracket()?;
                    self.attach(QueryAtom { expr, map_num })?;
                }
                _ => {
                    let expr = self.parse_bare_atom()?;
                    self.attach(QueryAtom { expr, map_num: 0 })?;
                }
            }
        }
        if self.pending_bond.is_some() {
            return Err(SmartsError::DanglingBond);
        }
        if !self.branch_stack.is_empty() {
            return Err(SmartsError::UnbalancedBranch);
        }
        if let Some((&digit, _)) = self.ring_bonds.iter().next() {
            return Err(SmartsError::UnpairedRingBond(digit));
        }
        Ok(self.mol)
    }

    fn attach(&mut self, atom: QueryAtom) -> Result<(), SmartsError> {
        let idx = self.mol.add_atom(atom);
        if let Some(prev) = self.prev {
            let expr = self
                .pending_bond
                .take()
                .unwrap_or(BondExpr::SingleOrAromatic);
            self.mol.add_bond(prev, idx, expr);
        } else if self.pending_bond.is_some() {
            return Err(SmartsError::DanglingBond);
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn close_ring(&mut self, digit: u16) -> Result<(), SmartsError> {
        let here = self.prev.ok_or(SmartsError::DanglingBond)?;
        let tok = self.pending_bond.take();
        match self.ring_bonds.remove(&digit) {
            None => {
                self.ring_bonds.insert(digit, (here, tok));
                Ok(())
            }
            Some((other, open_tok)) => {
                let expr = open_tok
                    .or(tok)
                    .unwrap_or(BondExpr::SingleOrAromatic);
                self.mol.add_bond(other, here, expr);
                Ok(())
            }
        }
    }

    fn parse_bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let pos = self.pos;
        let b = self.bump().ok_or(SmartsError::Empty)?;
        let expr = match b {
            b'*' => AtomExpr::True,
            b'a' => AtomExpr::Aromatic,
            b'A' => AtomExpr::Aliphatic,
            b'B' => {
                if self.peek() == Some(b'r') {
                    self.bump();
                    element(35, false)
                } else {
                    element(5, false)
                }
            }
            b'C' => {
                if self.peek() == Some(b'l') {
                    self.bump();
                    element(17, false)
                } else {
                    element(6, false)
                }
            }
            b'N' => element(7, false),
            b'O' => element(8, false),
            b'P' => element(15, false),
            b'S' => element(16, false),
            b'F' => element(9, false),
            b'I' => element(53, false),
            b'b' => element(5, true),
            b'c' => element(6, true),
            b'n' => element(7, true),
            b'o' => element(8, true),
            b'p' => element(15, true),
            b's' => element(16, true),
            b'$' => {
                return Err(SmartsError::Unsupported {
                    pos,
                    feature: "recursive SMARTS",
                });
            }
            other => {
                return Err(SmartsError::UnexpectedChar {
                    pos,
                    ch: char::from(other),
                });
            }
        };
        Ok(expr)
    }

    /// Parses `[expr(:map)?]`.
    fn parse_bracket(&mut self) -> Result<(AtomExpr, u16), SmartsError> {
        let open = self.pos;
        self.bump(); // consume '['
        if self.peek() == Some(b']') {
            return Err(SmartsError::EmptyBracket { pos: open });
        }
        let expr = self.parse_atom_semi()?;
        let mut map_num = 0u16;
        if self.peek() == Some(b':') {
            self.bump();
            let mut saw_digit = false;
            while let Some(d @ b'0'..=b'9') = self.peek() {
                self.bump();
                map_num = map_num * 10 + (d - b'0') as u16;
                saw_digit = true;
            }
            if !saw_digit {
                return Err(self.unexpected(self.peek().unwrap_or(b' ')));
            }
        }
        if self.bump() != Some(b']') {
            return Err(SmartsError::UnclosedBracket { pos: open });
        }
        Ok((expr, map_num))
    }

    // Operator precedence, loosest first: `;` then `,` then `&` (explicit
    // or implied by adjacency) then unary `!`.
    fn parse_atom_semi(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.parse_atom_comma()?];
        while self.peek() == Some(b';') {
            self.bump();
            terms.push(self.parse_atom_comma()?);
        }
        Ok(fold_atom_and(terms))
    }

    fn parse_atom_comma(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.parse_atom_amp()?];
        while self.peek() == Some(b',') {
            self.bump();
            terms.push(self.parse_atom_amp()?);
        }
        if terms.len() == 1 {
            Ok(terms.pop().unwrap())
        } else {
            Ok(AtomExpr::Or(terms))
        }
    }

    fn parse_atom_amp(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.parse_atom_unary()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.bump();
                    terms.push(self.parse_atom_unary()?);
                }
                Some(b) if starts_primitive(b) => {
                    terms.push(self.parse_atom_unary()?);
                }
                _ => break,
            }
        }
        Ok(fold_atom_and(terms))
    }

    fn parse_atom_unary(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.bump();
            let inner = self.parse_atom_unary()?;
            return Ok(AtomExpr::Not(Box::new(inner)));
        }
        self.parse_atom_primitive()
    }

    fn parse_atom_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let pos = self.pos;
        let b = self.peek().ok_or(SmartsError::UnclosedBracket { pos })?;
        match b {
            b'0'..=b'9' => {
                let mut iso = 0u16;
                while let Some(d @ b'0'..=b'9') = self.peek() {
                    self.bump();
                    iso = iso * 10 + (d - b'0') as u16;
                }
                Ok(AtomExpr::Isotope(iso))
            }
            b'#' => {
                self.bump();
                let num = self.parse_number(pos)? as u8;
                Ok(AtomExpr::Element {
                    atomic_num: num,
                    aromatic: None,
                })
            }
            b'*' => {
                self.bump();
                Ok(AtomExpr::True)
            }
            b'A' => {
                self.bump();
                Ok(AtomExpr::Aliphatic)
            }
            b'a' => {
                self.bump();
                if self.peek() == Some(b's') {
                    self.bump();
                    return Ok(element(33, true));
                }
                Ok(AtomExpr::Aromatic)
            }
            b'D' => self.counted_primitive(1, AtomExpr::Degree),
            b'H' => self.counted_primitive(1, AtomExpr::TotalHCount),
            b'X' => self.counted_primitive(1, AtomExpr::Connectivity),
            b'h' => self.counted_primitive(1, AtomExpr::ImplicitHCount),
            b'v' => self.counted_primitive(1, AtomExpr::Valence),
            b'R' => {
                self.bump();
                match self.peek() {
                    Some(b'0') => {
                        self.bump();
                        Ok(AtomExpr::NotInRing)
                    }
                    Some(b'1'..=b'9') => {
                        // Ring counts degrade to membership; SSSR counting
                        // is not implemented.
                        self.bump();
                        Ok(AtomExpr::InRing)
                    }
                    _ => Ok(AtomExpr::InRing),
                }
            }
            b'+' | b'-' => {
                self.bump();
                let unit: i8 = if b == b'+' { 1 } else { -1 };
                let mut charge = unit;
                if let Some(d @ b'0'..=b'9') = self.peek() {
                    self.bump();
                    charge = unit * (d - b'0') as i8;
                } else {
                    while self.peek() == Some(b) {
                        self.bump();
                        charge += unit;
                    }
                }
                Ok(AtomExpr::Charge(charge))
            }
            b'@' => {
                self.bump();
                if self.peek() == Some(b'@') {
                    self.bump();
                    Ok(AtomExpr::Chirality(Chirality::Cw))
                } else {
                    Ok(AtomExpr::Chirality(Chirality::Ccw))
                }
            }
            b'$' => Err(SmartsError::Unsupported {
                pos,
                feature: "recursive SMARTS",
            }),
            b'r' => Err(SmartsError::Unsupported {
                pos,
                feature: "ring size `r`",
            }),
            b'x' => Err(SmartsError::Unsupported {
                pos,
                feature: "ring bond count `x`",
            }),
            _ if b.is_ascii_uppercase() => self.parse_element_symbol(pos, false),
            _ if b.is_ascii_lowercase() => self.parse_element_symbol(pos, true),
            other => Err(self.unexpected(other)),
        }
    }

    /// `D`, `H`, `X`, `h`, `v` with an optional count (default 1). The
    /// uppercase letters double as element-symbol openers (`Ho`, `Xe`,
    /// `Db`, ...), so a valid two-letter element wins first.
    fn counted_primitive(
        &mut self,
        default: u8,
        make: fn(u8) -> AtomExpr,
    ) -> Result<AtomExpr, SmartsError> {
        let pos = self.pos;
        let first = self.bytes[self.pos];
        if first.is_ascii_uppercase() {
            if let Some(lo) = self.bytes.get(self.pos + 1).copied() {
                if lo.is_ascii_lowercase() {
                    let two = format!("{}{}", char::from(first), char::from(lo));
                    if elements::atomic_number(&two).is_some() {
                        return self.parse_element_symbol(pos, false);
                    }
                }
            }
        }
        self.bump();
        let count = match self.peek() {
            Some(d @ b'0'..=b'9') => {
                self.bump();
                d - b'0'
            }
            _ => default,
        };
        Ok(make(count))
    }

    fn parse_element_symbol(
        &mut self,
        pos: usize,
        aromatic: bool,
    ) -> Result<AtomExpr, SmartsError> {
        let first = self.bump().ok_or(SmartsError::UnclosedBracket { pos })?;
        let mut symbol = String::from(char::from(first));
        if let Some(lo) = self.peek() {
            if lo.is_ascii_lowercase() {
                let two = format!("{symbol}{}", char::from(lo));
                let valid = if aromatic {
                    elements::aromatic_atomic_number(&two).is_some()
                } else {
                    elements::atomic_number(&two).is_some()
                };
                if valid {
                    self.bump();
                    symbol = two;
                }
            }
        }
        let atomic_num = if aromatic {
            elements::aromatic_atomic_number(&symbol)
        } else {
            elements::atomic_number(&symbol)
        }
        .ok_or(SmartsError::UnknownElement { pos, symbol })?;
        Ok(element(atomic_num, aromatic))
    }

    fn parse_number(&mut self, pos: usize) -> Result<u16, SmartsError> {
        let mut value = 0u16;
        let mut saw_digit = false;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            self.bump();
            value = value * 10 + (d - b'0') as u16;
            saw_digit = true;
        }
        if !saw_digit {
            return Err(SmartsError::UnexpectedChar {
                pos,
                ch: self.peek().map(char::from).unwrap_or(' '),
            });
        }
        Ok(value)
    }

    // Bond expressions share the atom-expression operator precedence.
    fn parse_bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.parse_bond_comma()?];
        while self.peek() == Some(b';') {
            self.bump();
            terms.push(self.parse_bond_comma()?);
        }
        Ok(fold_bond_and(terms))
    }

    fn parse_bond_comma(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.parse_bond_amp()?];
        while self.peek() == Some(b',') {
            self.bump();
            terms.push(self.parse_bond_amp()?);
        }
        if terms.len() == 1 {
            Ok(terms.pop().unwrap())
        } else {
            Ok(BondExpr::Or(terms))
        }
    }

    fn parse_bond_amp(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.parse_bond_unary()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.bump();
                    terms.push(self.parse_bond_unary()?);
                }
                Some(b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!') => {
                    terms.push(self.parse_bond_unary()?);
                }
                _ => break,
            }
        }
        Ok(fold_bond_and(terms))
    }

    fn parse_bond_unary(&mut self) -> Result<BondExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.bump();
            let inner = self.parse_bond_unary()?;
            return Ok(BondExpr::Not(Box::new(inner)));
        }
        let pos = self.pos;
        match self.bump() {
            Some(b'-') => Ok(BondExpr::Single),
            Some(b'=') => Ok(BondExpr::Double),
            Some(b'#') => Ok(BondExpr::Triple),
            Some(b':') => Ok(BondExpr::Aromatic),
            Some(b'~') => Ok(BondExpr::Any),
            Some(b'@') => Ok(BondExpr::Ring),
            Some(b'/') | Some(b'\\') => Ok(BondExpr::Directional),
            Some(other) => Err(SmartsError::UnexpectedChar {
                pos,
                ch: char::from(other),
            }),
            None => Err(SmartsError::DanglingBond),
        }
    }
}

fn element(atomic_num: u8, aromatic: bool) -> AtomExpr {
    AtomExpr::Element {
        atomic_num,
        aromatic: Some(aromatic),
    }
}

fn fold_atom_and(mut terms: Vec<AtomExpr>) -> AtomExpr {
    if terms.len() == 1 {
        terms.pop().unwrap()
    } else {
        AtomExpr::And(terms)
    }
}

fn fold_bond_and(mut terms: Vec<BondExpr>) -> BondExpr {
    if terms.len() == 1 {
        terms.pop().unwrap()
    } else {
        BondExpr::And(terms)
    }
}

fn starts_primitive(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'#' | b'*' | b'+' | b'-' | b'@' | b'$')
        || b.is_ascii_alphabetic()
}
