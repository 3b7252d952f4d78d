use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    FixtureError,
    utils::{decode_hex, encode_hex},
};

/// Inputs to a single `verify` call on the receipt verifier contract.
///
/// The four fields are expected to come from the same receipt. Nothing here checks that: a
/// mismatched fixture is simply rejected by the verifier contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofFixture {
    /// The serialized Groth16 proof.
    pub seal: Bytes,
    /// Digest of the guest program whose execution is attested.
    pub image_id: B256,
    /// Digest of the guest's final state.
    pub post_state_digest: B256,
    /// Encoding of the journal committed by the guest.
    pub journal_hash: Bytes,
}

/// Identifies one of the four values of a [`ProofFixture`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureField {
    Seal,
    ImageId,
    PostStateDigest,
    JournalHash,
}

impl FixtureField {
    pub const ALL: [Self; 4] = [
        Self::Seal,
        Self::ImageId,
        Self::PostStateDigest,
        Self::JournalHash,
    ];

    /// File name of this value inside a fixture directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Seal => "seal.txt",
            Self::ImageId => "imageId.txt",
            Self::PostStateDigest => "postStateDigest.txt",
            Self::JournalHash => "journalHash.txt",
        }
    }

    /// Whether the contract ABI fixes the value to 32 bytes.
    pub fn is_digest(&self) -> bool {
        matches!(self, Self::ImageId | Self::PostStateDigest)
    }
}

impl fmt::Display for FixtureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seal => "seal",
            Self::ImageId => "imageId",
            Self::PostStateDigest => "postStateDigest",
            Self::JournalHash => "journalHash",
        };
        f.write_str(name)
    }
}

/// Where a fixture is read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureSource {
    /// A directory holding one hex file per [`FixtureField`]. Relative paths are resolved
    /// against the testdata root given to [`FixtureSource::load`].
    Dir(PathBuf),
    /// Hex strings embedded in the suite definition.
    Inline(InlineFixture),
}

/// Hex-encoded fixture values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFixture {
    pub seal: String,
    pub image_id: String,
    pub post_state_digest: String,
    pub journal_hash: String,
}

impl FixtureSource {
    /// Load the fixture, resolving relative directories against `root`.
    pub fn load(&self, root: impl AsRef<Path>) -> Result<ProofFixture, FixtureError> {
        match self {
            Self::Dir(dir) => ProofFixture::from_dir(root.as_ref().join(dir)),
            Self::Inline(inline) => inline.parse(),
        }
    }
}

impl InlineFixture {
    pub fn parse(&self) -> Result<ProofFixture, FixtureError> {
        ProofFixture::from_hex(
            &self.seal,
            &self.image_id,
            &self.post_state_digest,
            &self.journal_hash,
        )
    }
}

impl From<&ProofFixture> for InlineFixture {
    fn from(fixture: &ProofFixture) -> Self {
        Self {
            seal: encode_hex(&fixture.seal),
            image_id: encode_hex(fixture.image_id),
            post_state_digest: encode_hex(fixture.post_state_digest),
            journal_hash: encode_hex(&fixture.journal_hash),
        }
    }
}

/// Mutation applied to a single byte of a fixture value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TamperOp {
    /// Wrapping increment by one.
    #[default]
    Increment,
    /// Invert every bit.
    Flip,
}

impl TamperOp {
    fn apply(self, byte: u8) -> u8 {
        match self {
            Self::Increment => byte.wrapping_add(1),
            Self::Flip => !byte,
        }
    }
}

/// Derive a negative fixture by mutating one byte of one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tamper {
    pub field: FixtureField,
    /// Byte offset to mutate, the last byte when absent.
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub op: TamperOp,
}

impl Tamper {
    /// Increment the last byte of `field`.
    pub fn last_byte(field: FixtureField) -> Self {
        Self {
            field,
            index: None,
            op: TamperOp::Increment,
        }
    }
}

impl ProofFixture {
    /// Parse a fixture from four hex strings.
    pub fn from_hex(
        seal: &str,
        image_id: &str,
        post_state_digest: &str,
        journal_hash: &str,
    ) -> Result<Self, FixtureError> {
        Ok(Self {
            seal: parse_bytes(FixtureField::Seal, seal)?,
            image_id: parse_digest(FixtureField::ImageId, image_id)?,
            post_state_digest: parse_digest(FixtureField::PostStateDigest, post_state_digest)?,
            journal_hash: parse_bytes(FixtureField::JournalHash, journal_hash)?,
        })
    }

    /// Read a fixture directory.
    ///
    /// All four files are read before any of them is parsed, so a missing file is always
    /// reported as [`FixtureError::NotFound`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(FixtureError::NotFound { path: dir.into() });
        }

        let [seal, image_id, post_state_digest, journal_hash] =
            FixtureField::ALL.map(|field| read_file(dir.join(field.file_name())));
        let [seal, image_id, post_state_digest, journal_hash] =
            [seal?, image_id?, post_state_digest?, journal_hash?];

        tracing::debug!(?dir, "read fixture");

        Self::from_hex(
            as_text(FixtureField::Seal, &seal)?,
            as_text(FixtureField::ImageId, &image_id)?,
            as_text(FixtureField::PostStateDigest, &post_state_digest)?,
            as_text(FixtureField::JournalHash, &journal_hash)?,
        )
    }

    /// Write the fixture as one `0x`-hex file per value, creating `dir` if needed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), FixtureError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| FixtureError::Io {
            path: dir.into(),
            source,
        })?;

        for field in FixtureField::ALL {
            let path = dir.join(field.file_name());
            std::fs::write(&path, encode_hex(self.field(field)))
                .map_err(|source| FixtureError::Io { path, source })?;
        }

        Ok(())
    }

    /// Raw bytes of one of the values.
    pub fn field(&self, field: FixtureField) -> &[u8] {
        match field {
            FixtureField::Seal => &self.seal,
            FixtureField::ImageId => self.image_id.as_slice(),
            FixtureField::PostStateDigest => self.post_state_digest.as_slice(),
            FixtureField::JournalHash => &self.journal_hash,
        }
    }

    /// Copy of the fixture with a single byte mutated.
    pub fn tamper(&self, tamper: &Tamper) -> Result<Self, FixtureError> {
        let field = tamper.field;
        let mut bytes = self.field(field).to_vec();
        let len = bytes.len();

        let index = tamper
            .index
            .or_else(|| len.checked_sub(1))
            .filter(|&i| i < len)
            .ok_or_else(|| FixtureError::Malformed {
                field,
                reason: format!("cannot tamper byte {:?} of a {len}-byte value", tamper.index),
            })?;
        bytes[index] = tamper.op.apply(bytes[index]);

        let mut fixture = self.clone();
        match field {
            FixtureField::Seal => fixture.seal = bytes.into(),
            FixtureField::ImageId => fixture.image_id = B256::from_slice(&bytes),
            FixtureField::PostStateDigest => fixture.post_state_digest = B256::from_slice(&bytes),
            FixtureField::JournalHash => fixture.journal_hash = bytes.into(),
        }

        Ok(fixture)
    }
}

fn read_file(path: PathBuf) -> Result<Vec<u8>, FixtureError> {
    std::fs::read(&path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => FixtureError::NotFound { path },
        _ => FixtureError::Io { path, source },
    })
}

/// Contents of a fixture file as text. Invalid UTF-8 cannot be hex.
fn as_text(field: FixtureField, bytes: &[u8]) -> Result<&str, FixtureError> {
    std::str::from_utf8(bytes).map_err(|e| FixtureError::Malformed {
        field,
        reason: e.to_string(),
    })
}

fn parse_bytes(field: FixtureField, text: &str) -> Result<Bytes, FixtureError> {
    decode_hex(text)
        .map(Bytes::from)
        .map_err(|e| FixtureError::Malformed {
            field,
            reason: e.to_string(),
        })
}

fn parse_digest(field: FixtureField, text: &str) -> Result<B256, FixtureError> {
    let bytes = parse_bytes(field, text)?;
    if bytes.len() != B256::len_bytes() {
        return Err(FixtureError::Malformed {
            field,
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }
    Ok(B256::from_slice(&bytes))
}
