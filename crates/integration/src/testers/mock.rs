//! Stand-in verifier contracts for exercising the harness without the Groth16 verifier.
//!
//! Every function returns creation code ready for [`EvmEnv::deploy`][groth16_harness_verifier::EvmEnv::deploy].

use alloy_primitives::{B256, Bytes, keccak256};
use alloy_sol_types::SolCall;
use groth16_harness_types::ProofFixture;
use groth16_harness_verifier::{
    Error,
    abi::{self, VerifyCall},
    evm::creation_code,
};

/// Jump target of the revert branch in [`digest_pinned_runtime`].
const REVERT_DEST: u8 = 0x4b;

/// A verifier that accepts exactly the calldata produced for `fixture`.
///
/// Calls with an unknown selector revert, like a Solidity contract without a fallback. Any
/// other `verify` calldata returns `false`.
pub fn digest_pinned_verifier(fixture: &ProofFixture) -> Result<Bytes, Error> {
    let expected = keccak256(abi::encode_verify(fixture));
    creation_code(&digest_pinned_runtime(VerifyCall::SELECTOR, expected))
}

fn digest_pinned_runtime(selector: [u8; 4], expected: B256) -> Vec<u8> {
    let mut code = vec![
        // if calldatasize < 4: revert
        0x60, 0x04, // PUSH1 4
        0x36, // CALLDATASIZE
        0x10, // LT
        0x60, REVERT_DEST, // PUSH1 dest
        0x57, // JUMPI
        // if calldata[0..4] != selector: revert
        0x60, 0x00, // PUSH1 0
        0x35, // CALLDATALOAD
        0x60, 0xe0, // PUSH1 224
        0x1c, // SHR
        0x63, // PUSH4 selector
    ];
    code.extend_from_slice(&selector);
    code.extend_from_slice(&[
        0x14, // EQ
        0x15, // ISZERO
        0x60, REVERT_DEST, // PUSH1 dest
        0x57, // JUMPI
        // keccak256(calldata)
        0x36, // CALLDATASIZE
        0x60, 0x00, // PUSH1 0
        0x60, 0x00, // PUSH1 0
        0x37, // CALLDATACOPY
        0x36, // CALLDATASIZE
        0x60, 0x00, // PUSH1 0
        0x20, // KECCAK256
        0x7f, // PUSH32 expected
    ]);
    code.extend_from_slice(expected.as_slice());
    code.extend_from_slice(&[
        0x14, // EQ
        0x60, 0x00, // PUSH1 0
        0x52, // MSTORE
        0x60, 0x20, // PUSH1 32
        0x60, 0x00, // PUSH1 0
        0xf3, // RETURN
        0x5b, // JUMPDEST
        0x60, 0x00, // PUSH1 0
        0x60, 0x00, // PUSH1 0
        0xfd, // REVERT
    ]);

    debug_assert_eq!(code[usize::from(REVERT_DEST)], 0x5b);
    code
}

/// A verifier returning the same verdict for any calldata.
pub fn constant_verifier(verdict: bool) -> Result<Bytes, Error> {
    creation_code(&[
        0x60, u8::from(verdict), // PUSH1 verdict
        0x60, 0x00, // PUSH1 0
        0x52, // MSTORE
        0x60, 0x20, // PUSH1 32
        0x60, 0x00, // PUSH1 0
        0xf3, // RETURN
    ])
}

/// A verifier that reverts on every call.
pub fn reverting_verifier() -> Result<Bytes, Error> {
    creation_code(&REVERT)
}

/// Creation code whose constructor reverts.
pub fn failing_constructor() -> Bytes {
    Bytes::from_static(&REVERT)
}

/// REVERT(0, 0).
const REVERT: [u8; 5] = [0x60, 0x00, 0x60, 0x00, 0xfd];
