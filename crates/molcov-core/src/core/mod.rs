pub mod elements;
pub mod models;
pub mod rings;
pub mod smarts;
pub mod smiles;
pub mod substructure;
