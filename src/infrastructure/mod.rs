pub mod ed25519;
pub mod fixtures;
pub mod in_memory;
