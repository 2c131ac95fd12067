//! Serde helpers for types the derive macro can't handle directly.

/// (De)serialize a `std::time::Duration` as whole seconds.
///
/// Used on config and monitoring fields where sub-second precision isn't
/// meaningful (snapshot intervals, shutdown timeouts) and a plain integer is
/// friendlier in a config file than serde's default struct representation.
pub mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::duration_serde")]
        interval: Duration,
    }

    #[test]
    fn duration_roundtrips_through_whole_seconds() {
        let wrapper = Wrapper {
            interval: Duration::from_secs(90),
        };
        let json = serde_json::to_string(&wrapper).expect("serialize");
        assert_eq!(json, r#"{"interval":90}"#);
        let back: Wrapper = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.interval, Duration::from_secs(90));
    }
}
