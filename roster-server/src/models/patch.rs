//! Patch field helpers
//!
//! Nullable columns need three states in a PUT body: absent (leave alone),
//! `null` (clear), or a value (set). They are modelled as
//! `Option<Option<T>>` with `#[serde(default, deserialize_with = "nullable")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some(inner)`; `null` becomes `Some(None)`.
/// Absent fields never reach this and take the `default` of `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
