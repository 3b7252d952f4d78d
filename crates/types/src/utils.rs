use alloy_primitives::Bytes;

/// Decode hex text as written by fixture producers.
///
/// Surrounding whitespace and an optional `0x`/`0X` prefix are ignored.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits)
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Flatten a receipt seal given as 32-bit words, each word big-endian.
pub fn seal_from_words(words: &[u32]) -> Bytes {
    words
        .iter()
        .flat_map(|word| word.to_be_bytes())
        .collect::<Vec<u8>>()
        .into()
}
