mod error;
pub use error::Error;

pub mod abi;

mod bytecode;
pub use bytecode::load_bytecode;

pub mod evm;
pub use evm::{CallOutcome, Deployment, EvmEnv};

pub mod verifier;
pub use verifier::{VerifierContract, VerifyOutcome, deploy_and_verify};
