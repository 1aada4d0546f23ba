pub mod blake2b;
pub mod domain_separators;
pub mod pedersen;
pub mod poseidon;

pub use blake2b::*;
pub use domain_separators::*;
pub use pedersen::*;
pub use poseidon::*;
