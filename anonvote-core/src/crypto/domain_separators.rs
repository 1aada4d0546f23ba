/// Seed domain for the Jubjub Pedersen generators
pub const DOM_PEDERSEN_GENERATORS: &[u8; 32] = b"ANONVOTE_PEDERSEN_GENERATORS____";

/// Seed domain for tree zero values derived from a label
pub const DOM_ZERO_VALUE: &[u8; 32] = b"ANONVOTE_TREE_ZERO_VALUE________";
