//! Field deserializers shared by the resource types

use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` as the field's default value.
///
/// `#[serde(default)]` only covers absent keys; the index also sends `null`
/// for numbers and lists it has no value for.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "null_as_default")]
        count: i64,
        #[serde(deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn null_and_missing_both_read_as_default() {
        let nulls: Sample = serde_json::from_str(r#"{"count":null,"tags":null}"#).unwrap();
        let missing: Sample = serde_json::from_str("{}").unwrap();

        assert_eq!((nulls.count, nulls.tags.len()), (0, 0));
        assert_eq!((missing.count, missing.tags.len()), (0, 0));
    }

    #[test]
    fn present_values_are_kept() {
        let sample: Sample = serde_json::from_str(r#"{"count":3,"tags":["a"]}"#).unwrap();
        assert_eq!(sample.count, 3);
        assert_eq!(sample.tags, ["a".to_string()]);
    }
}
