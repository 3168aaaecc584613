//! CRC32 checksum over a sequenced entry
//!
//! Covers the region, the key's sequence id, and every cell field in
//! order, each length-prefixed. Two entries with the same checksum input
//! are byte-for-byte the same log record, so a rewrite after a failed
//! append can be checked against the first attempt.
//!
//! Uses CRC32 (IEEE polynomial).

use crc32fast::Hasher;

use super::edit::WalEdit;
use super::key::WalKey;

/// Computes the checksum of a key and its edit.
///
/// Deterministic: the same key and edit always give the same value.
pub fn compute_checksum(key: &WalKey, edit: &WalEdit) -> u32 {
    let mut hasher = Hasher::new();
    update_bytes(&mut hasher, key.encoded_region_name().as_bytes());
    hasher.update(&key.sequence_id().value().to_le_bytes());
    hasher.update(&(edit.len() as u64).to_le_bytes());
    for cell in edit.cells() {
        update_bytes(&mut hasher, cell.row());
        update_bytes(&mut hasher, cell.family());
        update_bytes(&mut hasher, cell.qualifier());
        hasher.update(&cell.timestamp().to_le_bytes());
        update_bytes(&mut hasher, cell.value());
        hasher.update(&cell.sequence_id().value().to_le_bytes());
    }
    hasher.finalize()
}

/// Whether `expected` matches the checksum of `key` and `edit`.
pub fn verify_checksum(key: &WalKey, edit: &WalEdit, expected: u32) -> bool {
    compute_checksum(key, edit) == expected
}

fn update_bytes(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u32).to_le_bytes());
    hasher.update(bytes);
}
