// Domain model: the shapes exchanged with the APOS service.
// The service sends timestamps as integers or floats and the owner either as
// a plain string or as a user object; both forms decode. Nulls and partial
// nested objects decode to empty values.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier the service assigns to a group order.
pub type OrderId = i64;

/// A shared order other users can add their items to until `deadline`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupOrder {
    pub id: OrderId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(with = "unix_timestamp")]
    pub deadline: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deliverer: String,
    #[serde(default, deserialize_with = "lenient_owner")]
    pub owner: Owner,
    #[serde(default, with = "unix_timestamp::option")]
    pub arrival: Option<DateTime<Utc>>,
}

/// Creator of a group order. The service either inlines the username or
/// nests it in a user object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Owner {
    User { username: String },
    Name(String),
}

impl Owner {
    pub fn username(&self) -> &str {
        match self {
            Owner::User { username } => username,
            Owner::Name(name) => name,
        }
    }
}

impl Default for Owner {
    fn default() -> Self {
        Owner::Name(String::new())
    }
}

/// A line entry the user submitted into a group order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub tip_percent: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default, alias = "group_id")]
    pub order_id: Option<OrderId>,
    /// Nested order, when the service sends a complete one. A partial object
    /// decodes to `None` and the order is looked up by `order_id` instead.
    #[serde(default, deserialize_with = "lenient")]
    pub order: Option<GroupOrder>,
}

impl Item {
    /// Id of the group this item belongs to, whichever way the service
    /// reported it.
    pub fn group_id(&self) -> Option<OrderId> {
        self.order_id.or_else(|| self.order.as_ref().map(|o| o.id))
    }
}

/// Payload for `PUT orders`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub title: String,
    pub description: String,
    #[serde(with = "unix_timestamp")]
    pub deadline: DateTime<Utc>,
    pub location: String,
    pub deliverer: String,
}

/// Payload for `PUT orders/{id}/items`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub tip_percent: f64,
    pub price: f64,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `None` for null or for anything that does not decode as `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}

fn lenient_owner<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Owner, D::Error> {
    Ok(lenient::<D, Owner>(deserializer)?.unwrap_or_default())
}

/// Unix timestamps in seconds. Serialized as an integer, deserialized from
/// an integer, a float or a numeric string.
pub(crate) mod unix_timestamp {
    use super::*;
    use serde::Serializer;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    fn to_datetime<E: serde::de::Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        let secs = match raw {
            Raw::Int(secs) => secs,
            Raw::Float(secs) if secs.is_finite() => secs.trunc() as i64,
            Raw::Float(secs) => return Err(E::custom(format!("invalid timestamp {secs}"))),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid timestamp {text:?}")))?
                .trunc() as i64,
        };
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| E::custom(format!("timestamp {secs} out of range")))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        to_datetime(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(ts) => serializer.serialize_some(&ts.timestamp()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(raw) => to_datetime::<D::Error>(raw).map(Some),
                None => Ok(None),
            }
        }
    }
}
