//! Lenient and strict JSON codec configurations.
//!
//! A store carries two codec values, constructed up front and never mutated:
//! a lenient profile for the main document (null members omitted on write,
//! case variation and unknown members tolerated on read) and a strict
//! profile for the fingerprint sidecar and shape checks (null members kept
//! on write, unknown members rejected on read).
//!
//! Strictness is enforced at runtime by aligning the parsed value against
//! the structural default of the target type: serializing `T::default()`
//! with nulls intact enumerates every member name `T` knows about, which is
//! the only member-set oracle available without reflection. Rejection of a
//! member absent from that oracle is the shape-mismatch signal the version
//! tracker relies on.

use crate::core::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    emit_nulls: bool,
    reject_unknown: bool,
}

impl Codec {
    /// Main-document profile: omit nulls on write, ignore unknown members
    /// on read.
    pub fn lenient() -> Self {
        Codec {
            emit_nulls: false,
            reject_unknown: false,
        }
    }

    /// Fingerprint/shape-check profile: keep nulls on write so the output
    /// is a complete structural snapshot, reject unknown members on read.
    pub fn strict() -> Self {
        Codec {
            emit_nulls: true,
            reject_unknown: true,
        }
    }

    /// Pretty-printed serialization of `value` under this profile.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, StoreError> {
        let mut tree = serde_json::to_value(value)?;
        if !self.emit_nulls {
            strip_nulls(&mut tree);
        }
        Ok(serde_json::to_string_pretty(&tree)?)
    }

    /// Decodes `text` into `T`. `Ok(None)` means the payload was a null
    /// root, i.e. semantically absent. Member names are matched
    /// case-insensitively against `T`'s structural default; members absent
    /// from the payload take their default value in both profiles, while a
    /// member with no counterpart in the default fails the decode in the
    /// strict profile only. Extra members are noise; missing ones are not
    /// drift.
    pub fn decode<T>(&self, text: &str) -> Result<Option<T>, StoreError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut tree: Value = serde_json::from_str(text)?;
        if tree.is_null() {
            return Ok(None);
        }
        let schema = serde_json::to_value(T::default())?;
        align(&mut tree, &schema, self.reject_unknown, "$")?;
        Ok(Some(serde_json::from_value(tree)?))
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            for member in map.values_mut() {
                strip_nulls(member);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}

/// Rewrites member names in `tree` to the casing the schema uses and, when
/// `reject_unknown` is set, fails on members the schema does not contain.
/// A null in the schema means the default carries no structure at that
/// point; such subtrees pass through unchecked.
fn align(
    tree: &mut Value,
    schema: &Value,
    reject_unknown: bool,
    path: &str,
) -> Result<(), StoreError> {
    match (tree, schema) {
        (Value::Object(map), Value::Object(known)) => {
            let entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            for (name, mut item) in entries {
                let canonical = if known.contains_key(&name) {
                    Some(name.clone())
                } else {
                    known
                        .keys()
                        .find(|key| key.eq_ignore_ascii_case(&name))
                        .cloned()
                };
                match canonical {
                    Some(key) => {
                        let child_path = format!("{path}.{key}");
                        align(&mut item, &known[key.as_str()], reject_unknown, &child_path)?;
                        map.insert(key, item);
                    }
                    None if reject_unknown => {
                        return Err(StoreError::UnknownMember {
                            path: path.to_string(),
                            member: name,
                        });
                    }
                    None => {
                        map.insert(name, item);
                    }
                }
            }
            // Members the payload left out take their default value, so a
            // document written by an older schema still decodes.
            for (key, default_value) in known {
                if !map.contains_key(key) {
                    map.insert(key.clone(), default_value.clone());
                }
            }
            Ok(())
        }
        (Value::Array(items), Value::Array(elements)) => {
            if let Some(element_schema) = elements.first() {
                for (index, item) in items.iter_mut().enumerate() {
                    align(
                        item,
                        element_schema,
                        reject_unknown,
                        &format!("{path}[{index}]"),
                    )?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Inner {
        enabled: bool,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        label: Option<String>,
        inner: Inner,
    }

    #[test]
    fn test_lenient_encode_omits_nulls() {
        let text = Codec::lenient()
            .encode(&Sample {
                count: 3,
                label: None,
                inner: Inner { enabled: true },
            })
            .unwrap();
        assert!(!text.contains("label"));
        assert!(text.contains("\"count\": 3"));
    }

    #[test]
    fn test_strict_encode_keeps_nulls() {
        let text = Codec::strict().encode(&Sample::default()).unwrap();
        assert!(text.contains("\"label\": null"));
    }

    #[test]
    fn test_lenient_decode_case_variation() {
        let decoded: Sample = Codec::lenient()
            .decode(r#"{"Count": 7, "Inner": {"Enabled": true}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.count, 7);
        assert!(decoded.inner.enabled);
    }

    #[test]
    fn test_lenient_decode_ignores_unknown_member() {
        let decoded: Sample = Codec::lenient()
            .decode(r#"{"count": 1, "legacy": "gone"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.count, 1);
    }

    #[test]
    fn test_strict_decode_rejects_unknown_member() {
        let result = Codec::strict().decode::<Sample>(r#"{"count": 1, "legacy": true}"#);
        match result {
            Err(StoreError::UnknownMember { member, .. }) => assert_eq!(member, "legacy"),
            other => panic!("expected unknown-member rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_decode_rejects_nested_unknown_member() {
        let result = Codec::strict().decode::<Sample>(r#"{"inner": {"enabled": true, "ghost": 1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_members_take_defaults() {
        let decoded: Sample = Codec::lenient().decode(r#"{"count": 4}"#).unwrap().unwrap();
        assert_eq!(decoded.count, 4);
        assert_eq!(decoded.label, None);
        assert!(!decoded.inner.enabled);

        // Missing members are not drift; only unknown members are.
        let strict: Sample = Codec::strict().decode(r#"{"count": 4}"#).unwrap().unwrap();
        assert_eq!(strict.count, 4);
    }

    #[test]
    fn test_null_root_is_absent() {
        let decoded = Codec::lenient().decode::<Sample>("null").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_missing_option_member_round_trips_as_none() {
        let text = Codec::lenient()
            .encode(&Sample {
                count: 2,
                label: None,
                inner: Inner::default(),
            })
            .unwrap();
        let decoded: Sample = Codec::lenient().decode(&text).unwrap().unwrap();
        assert_eq!(decoded.label, None);
        assert_eq!(decoded.count, 2);
    }
}
