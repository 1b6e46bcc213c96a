//! Identifier helpers - decision and revocation ids are UUIDv4

use uuid::{Uuid, Variant};

/// Length of the hyphenated UUID form (8-4-4-4-12)
const HYPHENATED_LEN: usize = 36;

/// Check that a string is a hyphenated, RFC 4122 version 4 UUID.
///
/// Hex digits may be upper or lower case. Braced, URN and simple forms are
/// rejected.
pub fn is_uuid_v4(value: &str) -> bool {
    if value.len() != HYPHENATED_LEN {
        return false;
    }

    match Uuid::try_parse(value) {
        Ok(uuid) => uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}

/// Generate a new random UUIDv4 in hyphenated lower-case form
pub fn new_uuid_v4() -> String {
    Uuid::new_v4().to_string()
}
