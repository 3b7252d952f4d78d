use alloy_primitives::Bytes;
use alloy_sol_types::{SolCall, sol};
use groth16_harness_types::ProofFixture;

sol! {
    /// Entry points exposed by the RISC Zero Groth16 receipt verifier.
    ///
    /// Both overloads share the name `verify`, so bindings are generated per signature.
    interface IRiscZeroVerifier {
        function verify(bytes seal, bytes32 imageId, bytes32 postStateDigest, bytes32 journalDigest) external view returns (bool);
        function verify(bytes seal, bytes32 imageId, bytes32 postStateDigest, bytes journalHash) external view returns (bool);
    }
}

/// The `verify` overload driven by the harness.
pub type VerifyCall = IRiscZeroVerifier::verify_1Call;

/// Full signature of [`VerifyCall`], used to tell it apart from the other overload.
pub const VERIFY_SIGNATURE: &str = "verify(bytes,bytes32,bytes32,bytes)";

/// ABI-encode a call to [`VerifyCall`] with the fixture's values.
pub fn encode_verify(fixture: &ProofFixture) -> Bytes {
    VerifyCall {
        seal: fixture.seal.clone(),
        imageId: fixture.image_id,
        postStateDigest: fixture.post_state_digest,
        journalHash: fixture.journal_hash.clone(),
    }
    .abi_encode()
    .into()
}

/// Decode the `bool` returned by [`VerifyCall`].
pub fn decode_verify_return(output: &[u8]) -> Result<bool, alloy_sol_types::Error> {
    VerifyCall::abi_decode_returns(output)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{B256, U256, keccak256};

    use super::*;

    #[test]
    fn overload_is_selected_by_signature() {
        assert_eq!(VerifyCall::SIGNATURE, VERIFY_SIGNATURE);
        assert_eq!(
            IRiscZeroVerifier::verify_0Call::SIGNATURE,
            "verify(bytes,bytes32,bytes32,bytes32)"
        );
        assert_eq!(
            VerifyCall::SELECTOR[..],
            keccak256(VERIFY_SIGNATURE.as_bytes())[..4]
        );
        assert_ne!(VerifyCall::SELECTOR, IRiscZeroVerifier::verify_0Call::SELECTOR);
    }

    #[test]
    fn calldata_layout() {
        let fixture = ProofFixture {
            seal: Bytes::from(vec![0xaa; 40]),
            image_id: B256::repeat_byte(0x11),
            post_state_digest: B256::repeat_byte(0x22),
            journal_hash: Bytes::from(vec![0xbb; 3]),
        };
        let calldata = encode_verify(&fixture);

        // selector, 4 head words, seal (len + 2 words), journal (len + 1 word).
        assert_eq!(calldata.len(), 4 + 32 * 4 + 32 * 3 + 32 * 2);
        assert_eq!(calldata[..4], VerifyCall::SELECTOR[..]);

        let word = |i: usize| &calldata[4 + 32 * i..4 + 32 * (i + 1)];
        assert_eq!(U256::from_be_slice(word(0)), U256::from(128));
        assert_eq!(word(1), fixture.image_id.as_slice());
        assert_eq!(word(2), fixture.post_state_digest.as_slice());
        assert_eq!(U256::from_be_slice(word(3)), U256::from(128 + 96));
        assert_eq!(U256::from_be_slice(word(4)), U256::from(40));
        assert_eq!(U256::from_be_slice(word(7)), U256::from(3));
    }

    #[test]
    fn decode_bool_return() {
        let mut word = [0u8; 32];
        assert!(!decode_verify_return(&word).unwrap());
        word[31] = 1;
        assert!(decode_verify_return(&word).unwrap());
        assert!(decode_verify_return(&[]).is_err());
    }
}
