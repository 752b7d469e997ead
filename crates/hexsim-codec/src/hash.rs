use sha2::{Digest, Sha256};

use crate::encode::canonical_encode;
use crate::value::Value;

/// `SHA-256(canonical_encode(value))` as lowercase hex.
///
/// Absent (a key never written) and empty (present with a zero-length or
/// default value) are distinguished because the canonical encoding of the
/// two is never byte-identical: omitting a key changes the object's
/// serialized bytes, while writing it with an empty value still emits the
/// key and some representation of that value.
pub fn hash(value: &Value) -> String {
    let bytes = canonical_encode(value);
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn identical_values_hash_identically() {
        let a = Value::Object(BTreeMap::from([("k".to_string(), Value::Int(1))]));
        let b = Value::Object(BTreeMap::from([("k".to_string(), Value::Int(1))]));
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn absent_key_and_empty_value_hash_differently() {
        let absent = Value::object();
        let empty = Value::Object(BTreeMap::from([("k".to_string(), Value::String(String::new()))]));
        assert_ne!(hash(&absent), hash(&empty));
    }

    #[test]
    fn hash_is_64_lowercase_hex_chars() {
        let digest = hash(&Value::Null);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
