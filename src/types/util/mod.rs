//! Small serde helpers shared by the wire types.
//!
//! Component payloads are dispatched on their integer `type` tag, which
//! serde's internally-tagged enums cannot express. The custom deserializer
//! therefore buffers each node into a [`serde_json::Value`] first and then
//! converts it with [`ValueExt::deserialize_into`].

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn is_false(value: &bool) -> bool {
    !value
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

/// Extension trait on [`serde_json::Value`] that provides
/// `.deserialize_into::<T>()`.
///
/// # Example
///
/// ```ignore
/// use serde_json::Value;
/// use crate::types::util::ValueExt;
///
/// let v: Value = serde_json::json!(42u64);
/// let n: u64 = v.deserialize_into().unwrap();
/// assert_eq!(n, 42);
/// ```
pub(crate) trait ValueExt: Sized {
    /// Consume this value and attempt to deserialize it into `T`.
    fn deserialize_into<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error>;

    /// The integer `type` tag of a component-shaped object, if present.
    fn type_tag(&self) -> Option<&serde_json::Value>;
}

impl ValueExt for serde_json::Value {
    fn deserialize_into<T: serde::de::DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self)
    }

    fn type_tag(&self) -> Option<&serde_json::Value> {
        self.as_object().and_then(|map| map.get("type"))
    }
}
