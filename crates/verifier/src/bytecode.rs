use std::path::Path;

use alloy_primitives::Bytes;
use groth16_harness_types::utils::decode_hex;
use serde::Deserialize;

use crate::Error;

/// The part of a Hardhat/Foundry compilation artifact we care about.
#[derive(Deserialize)]
struct Artifact {
    bytecode: ArtifactBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat writes the creation code as a plain hex string.
    Hex(String),
    /// Foundry nests it under `object`.
    Object { object: String },
}

/// Read the verifier's creation code.
///
/// Accepts a compilation artifact (`.json`), `0x`-prefixed hex text, or raw bytes such as a
/// `verifier.bin` release asset.
pub fn load_bytecode(path: impl AsRef<Path>) -> Result<Bytes, Error> {
    let path = path.as_ref();
    let err = |reason: String| Error::Bytecode {
        path: path.into(),
        reason,
    };

    let raw = std::fs::read(path).map_err(|e| err(e.to_string()))?;

    let code = if path.extension().is_some_and(|ext| ext == "json") {
        let artifact: Artifact = serde_json::from_slice(&raw).map_err(|e| err(e.to_string()))?;
        let hex = match artifact.bytecode {
            ArtifactBytecode::Hex(hex) | ArtifactBytecode::Object { object: hex } => hex,
        };
        decode_hex(&hex).map_err(|e| err(e.to_string()))?
    } else {
        match std::str::from_utf8(&raw) {
            Ok(text) if text.trim_start().starts_with("0x") => {
                decode_hex(text).map_err(|e| err(e.to_string()))?
            }
            _ => raw,
        }
    };

    if code.is_empty() {
        return Err(err("empty bytecode".to_string()));
    }

    tracing::debug!(?path, len = code.len(), "loaded verifier bytecode");

    Ok(code.into())
}
