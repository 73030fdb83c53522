pub mod atom;
pub mod bond;
pub mod mol;
pub mod record;
