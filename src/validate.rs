//! Decoding HCL into caller-supplied serde types.
//!
//! The text is parsed into an [`hcl::Value`], bridged through
//! `serde_json::Value`, and deserialized into the target with `serde_ignored`
//! recording every key the target does not consume. In strict mode any such
//! key is an error.
//!
//! Labeled blocks follow hcl's value mapping: `block "label" { ... }` becomes
//! `{ "block": { "label": { ... } } }`.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

pub fn decode_value<T: DeserializeOwned>(src: &str, strict: bool) -> Result<T, DecodeError> {
    let value: hcl::Value = hcl::from_str(src)?;
    let json =
        serde_json::to_value(&value).map_err(|e| DecodeError::Deserialize(e.to_string()))?;

    let mut unknown_keys: Vec<String> = Vec::new();
    let decoded: T = serde_ignored::deserialize(json, |ignored_path| {
        unknown_keys.push(ignored_path.to_string());
    })
    .map_err(|e| DecodeError::Deserialize(e.to_string()))?;

    if strict && !unknown_keys.is_empty() {
        return Err(DecodeError::UnknownKeys(unknown_keys));
    }
    Ok(decoded)
}
