//! SHA-1 digests used to look files up in the index

use std::path::Path;

use sha1::{Digest, Sha1};

pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Lowercase hex SHA-1 of a file's contents. The name plays no part.
pub async fn file_sha1(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(sha1_hex(&bytes))
}
