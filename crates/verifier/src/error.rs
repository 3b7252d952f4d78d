use std::path::PathBuf;

use alloy_primitives::Address;

/// Errors that prevent a `verify` call from being made at all.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The verifier bytecode could not be read or decoded.
    #[error("failed to load verifier bytecode from {path}: {reason}")]
    Bytecode { path: PathBuf, reason: String },
    /// The deployment transaction did not produce a contract.
    #[error("verifier deployment failed: {0}")]
    Deployment(String),
    /// There is no contract code at the address of a pre-deployed verifier.
    #[error("no contract code at {0}")]
    MissingCode(Address),
    /// The execution environment rejected the transaction before executing it.
    #[error("execution environment failure: {0}")]
    Environment(String),
}
