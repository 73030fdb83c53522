use phf::{Map, Set, phf_map, phf_set};

/// Element symbols indexed by atomic number. Index 0 is the wildcard atom.
pub static SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg",
    "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn",
    "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb",
    "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta",
    "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At",
    "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt",
    "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6,
    "N" => 7, "O" => 8, "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12,
    "Al" => 13, "Si" => 14, "P" => 15, "S" => 16, "Cl" => 17, "Ar" => 18,
    "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V" => 23, "Cr" => 24,
    "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30,
    "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42,
    "Tc" => 43, "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48,
    "In" => 49, "Sn" => 50, "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54,
    "Cs" => 55, "Ba" => 56, "La" => 57, "Ce" => 58, "Pr" => 59, "Nd" => 60,
    "Pm" => 61, "Sm" => 62, "Eu" => 63, "Gd" => 64, "Tb" => 65, "Dy" => 66,
    "Ho" => 67, "Er" => 68, "Tm" => 69, "Yb" => 70, "Lu" => 71, "Hf" => 72,
    "Ta" => 73, "W" => 74, "Re" => 75, "Os" => 76, "Ir" => 77, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83, "Po" => 84,
    "At" => 85, "Rn" => 86, "Fr" => 87, "Ra" => 88, "Ac" => 89, "Th" => 90,
    "Pa" => 91, "U" => 92, "Np" => 93, "Pu" => 94, "Am" => 95, "Cm" => 96,
    "Bk" => 97, "Cf" => 98, "Es" => 99, "Fm" => 100, "Md" => 101,
    "No" => 102, "Lr" => 103, "Rf" => 104, "Db" => 105, "Sg" => 106,
    "Bh" => 107, "Hs" => 108, "Mt" => 109, "Ds" => 110, "Rg" => 111,
    "Cn" => 112, "Nh" => 113, "Fl" => 114, "Mc" => 115, "Lv" => 116,
    "Ts" => 117, "Og" => 118,
};

/// Lowercase symbols that may appear as aromatic atoms in SMILES/SMARTS
/// bracket expressions.
static AROMATIC_SYMBOLS: Set<&'static str> = phf_set! {
    "b", "c", "n", "o", "p", "s", "se", "as",
};

pub fn atomic_number(symbol: &str) -> Option<u8> {
    ATOMIC_NUMBERS.get(symbol).copied()
}

pub fn symbol(atomic_num: u8) -> Option<&'static str> {
    SYMBOLS.get(atomic_num as usize).copied()
}

/// Resolves a lowercase aromatic symbol (`c`, `se`, ...) to its atomic number.
pub fn aromatic_atomic_number(symbol: &str) -> Option<u8> {
    if !AROMATIC_SYMBOLS.contains(symbol) {
        return None;
    }
    let mut chars = symbol.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.collect();
    atomic_number(&format!("{first}{rest}"))
}

/// Default valences used to assign implicit hydrogens to organic-subset
/// atoms. Elements outside the subset get no implicit hydrogens.
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],
        5 => &[3],
        6 => &[4],
        7 => &[3, 5],
        8 => &[2],
        9 | 17 | 35 | 53 => &[1],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        _ => &[],
    }
}

/// Folds atomic numbers into the element-presence bitmask stored on a
/// molecule record: bit `n` is set iff element `n` occurs.
pub fn elements_to_bits(atomic_nums: impl IntoIterator<Item = u8>) -> u128 {
    atomic_nums
        .into_iter()
        .fold(0u128, |mask, n| mask | (1u128 << (n as u32 & 127)))
}

pub fn bits_to_elements(mask: u128) -> Vec<u8> {
    (0..128).filter(|n| mask & (1u128 << n) != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for num in 1u8..=118 {
            let sym = symbol(num).unwrap();
            assert_eq!(atomic_number(sym), Some(num), "symbol {sym}");
        }
    }

    #[test]
    fn wildcard_has_no_atomic_number() {
        assert_eq!(symbol(0), Some("*"));
        assert_eq!(atomic_number("*"), None);
    }

    #[test]
    fn aromatic_symbols_resolve() {
        assert_eq!(aromatic_atomic_number("c"), Some(6));
        assert_eq!(aromatic_atomic_number("n"), Some(7));
        assert_eq!(aromatic_atomic_number("se"), Some(34));
        assert_eq!(aromatic_atomic_number("Cl"), None);
        assert_eq!(aromatic_atomic_number("f"), None);
    }

    #[test]
    fn bitmask_round_trip() {
        let mask = elements_to_bits([1, 6, 8, 17]);
        assert_eq!(bits_to_elements(mask), vec![1, 6, 8, 17]);
    }

    #[test]
    fn bitmask_containment_is_superset_test() {
        let allowed = elements_to_bits([1, 6, 7, 8]);
        let water = elements_to_bits([1, 8]);
        let chloroform = elements_to_bits([1, 6, 17]);
        assert_eq!(water | allowed, allowed);
        assert_ne!(chloroform | allowed, allowed);
    }
}
