//! Serde adapter for user-keyed maps written as `[{name, value}]` lists.
//!
//! Layered configuration folds mapping keys to lower case, while names such
//! as environment variables and metric dimensions are case-sensitive. Names
//! carried as values keep their spelling.
//!
//! ```yaml
//! environment:
//!   - name: SPRING_PROFILES_ACTIVE
//!     value: prod
//! ```

use std::collections::BTreeMap;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
struct Entry<T> {
    name: String,
    value: T,
}

#[derive(Serialize)]
struct EntryRef<'a, T> {
    name: &'a str,
    value: &'a T,
}

pub fn serialize<T, S>(map: &BTreeMap<String, T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.iter().map(|(name, value)| EntryRef { name, value }))
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let entries = Vec::<Entry<T>>::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for entry in entries {
        if map.contains_key(&entry.name) {
            return Err(D::Error::custom(format!(
                "duplicate entry '{}'",
                entry.name
            )));
        }
        map.insert(entry.name, entry.value);
    }
    Ok(map)
}
