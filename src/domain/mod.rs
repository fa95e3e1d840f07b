//! Domain types, the risk engine and the ports to the outside world.

pub mod attestation;
pub mod bank;
pub mod loan;
pub mod money;
pub mod ports;
pub mod risk;
pub mod settings;
pub mod state_caps;
