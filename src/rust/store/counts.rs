use std::collections::BTreeMap;

use super::error::StoreError;
use super::CategoryId;

/// Per-category counters, keyed by category id.
///
/// Stores persist a `CountMap` as a flat JSON object whose keys are the
/// decimal category ids, e.g. `{"1":3,"2":1}`. A blank record decodes to
/// an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap {
    counts: BTreeMap<CategoryId, u64>,
}

impl CountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count for `id`, or 0 if the id was never counted.
    pub fn get(&self, id: CategoryId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, id: CategoryId, count: u64) {
        self.counts.insert(id, count);
    }

    pub fn increment(&mut self, id: CategoryId) {
        *self.counts.entry(id).or_insert(0) += 1;
    }

    /// Decrements the count for `id`, never going below zero. An entry that
    /// reaches zero is dropped.
    pub fn decrement(&mut self, id: CategoryId) {
        if let Some(count) = self.counts.get_mut(&id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(&id);
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.counts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, u64)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Encodes the map into its flat string-keyed representation.
    pub fn encode(&self) -> String {
        let flat: BTreeMap<String, u64> = self
            .counts
            .iter()
            .map(|(id, count)| (id.to_string(), *count))
            .collect();
        // A map of strings to integers always serializes.
        serde_json::to_string(&flat).unwrap_or_else(|_| String::from("{}"))
    }

    /// Decodes the representation produced by [`CountMap::encode`].
    pub fn decode(data: &str) -> Result<Self, StoreError> {
        if data.trim().is_empty() {
            return Ok(Self::new());
        }

        let flat: BTreeMap<String, serde_json::Value> = serde_json::from_str(data)?;
        let mut counts = BTreeMap::new();
        for (key, value) in flat {
            let id = key
                .parse::<CategoryId>()
                .map_err(|_| StoreError::codec(format!("key '{}' is not a category id", key)))?;
            let count = value
                .as_u64()
                .ok_or_else(|| StoreError::codec(format!("count for category {} is not a non-negative integer: {}", id, value)))?;
            counts.insert(id, count);
        }
        Ok(Self { counts })
    }
}

impl FromIterator<(CategoryId, u64)> for CountMap {
    fn from_iter<I: IntoIterator<Item = (CategoryId, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_flat_and_string_keyed() {
        let map: CountMap = vec![(2, 1), (1, 3)].into_iter().collect();
        assert_eq!(map.encode(), r#"{"1":3,"2":1}"#);
    }

    #[test]
    fn test_round_trip() {
        let maps = vec![
            CountMap::new(),
            vec![(1, 0)].into_iter().collect(),
            vec![(1, 7), (12, 0), (40, u64::from(u32::MAX) + 5)].into_iter().collect::<CountMap>(),
        ];
        for map in maps {
            assert_eq!(CountMap::decode(&map.encode()).unwrap(), map);
        }
    }

    #[test]
    fn test_decode_blank_is_empty() {
        assert!(CountMap::decode("").unwrap().is_empty());
        assert!(CountMap::decode("  ").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_data() {
        assert!(matches!(CountMap::decode(r#"{"abc":1}"#), Err(StoreError::Codec(_))));
        assert!(matches!(CountMap::decode(r#"{"1":-4}"#), Err(StoreError::Codec(_))));
        assert!(matches!(CountMap::decode(r#"{"1":1.5}"#), Err(StoreError::Codec(_))));
        assert!(matches!(CountMap::decode("not json"), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut map = CountMap::new();
        map.increment(3);
        map.decrement(3);
        map.decrement(3);
        map.decrement(9);
        assert_eq!(map.get(3), 0);
        assert_eq!(map.get(9), 0);
        assert!(map.is_empty());
    }
}
