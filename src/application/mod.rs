//! Application layer orchestrating the three underwriting stages.
//!
//! [`underwriter::Underwriter`] resolves parameters from the collaborator ports,
//! runs the pure risk engine and hands the result to
//! [`signer::AttestationSigner`].

pub mod signer;
pub mod underwriter;
