use alloy_primitives::{Address, B256, Bytes, keccak256};
use groth16_harness_types::ProofFixture;
use tracing::instrument;

use crate::{
    Error, abi,
    evm::{CallOutcome, EvmEnv},
};

/// Handle to a live verifier contract inside an [`EvmEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifierContract {
    pub address: Address,
    /// Keccak digest of the runtime code, identifies which verifier is being exercised.
    pub codehash: B256,
}

/// What came back from a `verify` call that reached the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The contract returned a boolean verdict.
    Returned { verified: bool, gas_used: u64 },
    /// The call reverted, e.g. a verifier that reverts on an invalid seal.
    Reverted { output: Bytes, gas_used: u64 },
    /// The call halted (out of gas, invalid opcode, ...).
    Halted { reason: String, gas_used: u64 },
    /// The call succeeded but did not return an ABI-encoded `bool`.
    Undecodable {
        output: Bytes,
        reason: String,
        gas_used: u64,
    },
}

impl VerifyOutcome {
    /// The verdict, if the contract returned one.
    pub fn verified(&self) -> Option<bool> {
        match self {
            Self::Returned { verified, .. } => Some(*verified),
            _ => None,
        }
    }

    pub fn gas_used(&self) -> u64 {
        match self {
            Self::Returned { gas_used, .. }
            | Self::Reverted { gas_used, .. }
            | Self::Halted { gas_used, .. }
            | Self::Undecodable { gas_used, .. } => *gas_used,
        }
    }
}

impl VerifierContract {
    /// Deploy a fresh verifier from its creation code.
    pub fn deploy(env: &mut EvmEnv, init_code: &[u8]) -> Result<Self, Error> {
        let deployment = env.deploy(init_code)?;
        Ok(Self {
            address: deployment.address,
            codehash: deployment.codehash,
        })
    }

    /// Connect to a verifier that already lives at `address`.
    pub fn at(env: &EvmEnv, address: Address) -> Result<Self, Error> {
        let code = env.code_at(address).ok_or(Error::MissingCode(address))?;
        Ok(Self {
            address,
            codehash: keccak256(&code),
        })
    }

    /// Call `verify(bytes,bytes32,bytes32,bytes)` with the fixture's values.
    ///
    /// Reverts and malformed return data are outcomes, not errors. Only a failure of the
    /// environment itself is returned as [`Error`].
    #[instrument("VerifierContract::verify", skip_all, fields(address = %self.address, image_id = %fixture.image_id))]
    pub fn verify(&self, env: &mut EvmEnv, fixture: &ProofFixture) -> Result<VerifyOutcome, Error> {
        let calldata = abi::encode_verify(fixture);

        let outcome = match env.call(self.address, calldata)? {
            CallOutcome::Success { output, gas_used } => {
                match abi::decode_verify_return(&output) {
                    Ok(verified) => VerifyOutcome::Returned { verified, gas_used },
                    Err(e) => VerifyOutcome::Undecodable {
                        output,
                        reason: e.to_string(),
                        gas_used,
                    },
                }
            }
            CallOutcome::Revert { output, gas_used } => VerifyOutcome::Reverted { output, gas_used },
            CallOutcome::Halt { reason, gas_used } => VerifyOutcome::Halted { reason, gas_used },
        };

        tracing::info!(verified = ?outcome.verified(), gas_used = outcome.gas_used(), "verify");

        Ok(outcome)
    }
}

/// Deploys the verifier contract into a fresh [`EvmEnv`] and simulates an on-chain
/// verification of the fixture.
///
/// This approach essentially simulates 2 txs:
/// - Deploy the verifier.
/// - Call `verify` with the fixture encoded as calldata.
pub fn deploy_and_verify(init_code: &[u8], fixture: &ProofFixture) -> Result<VerifyOutcome, Error> {
    let mut env = EvmEnv::default();
    let verifier = VerifierContract::deploy(&mut env, init_code)?;
    verifier.verify(&mut env, fixture)
}
