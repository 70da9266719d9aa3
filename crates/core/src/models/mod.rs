//! Data models for the points backend

mod envelope;
mod exchange;
mod points;
mod product;
mod user;

pub use envelope::*;
pub use exchange::*;
pub use points::*;
pub use product::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Deserialize ID that can be either string or number
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        String(String),
        Number(i64),
    }

    match IdValue::deserialize(deserializer)? {
        IdValue::String(s) => Ok(s),
        IdValue::Number(n) => Ok(n.to_string()),
    }
}

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
