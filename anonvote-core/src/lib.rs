pub mod circuit_input;
pub mod config;
pub mod crypto;
pub mod data_structures;
pub mod merkle;
pub mod shared_tree;
pub mod types;
pub mod utils;

pub use circuit_input::*;
pub use config::*;
pub use crypto::*;
pub use data_structures::*;
pub use merkle::*;
pub use shared_tree::*;
pub use types::*;
