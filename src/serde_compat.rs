//! Serde helpers for wallet files
//!
//! Records written by the older generator script stored `timestamp` as
//! `"%Y-%m-%d %H:%M:%S"` and `wallet_id` as a signed integer. These
//! helpers read both shapes and always write the current one.

use serde::{Deserialize, Deserializer, Serializer};

const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize `DateTime<Utc>` as RFC 3339 seconds; accept the legacy
/// space-separated form when reading.
pub mod timestamp {
    use super::*;
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&s) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&s, LEGACY_TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", s, e)))
    }
}

/// Deserialize a wallet id stored either as a string or as an integer
pub mod wallet_id {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super::timestamp")]
        at: DateTime<Utc>,
        #[serde(with = "super::wallet_id")]
        id: String,
    }

    #[test]
    fn test_reads_legacy_shapes() {
        let parsed: Stamped =
            serde_json::from_str(r#"{"at":"2024-03-01 12:00:05","id":-4120394857}"#).unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap());
        assert_eq!(parsed.id, "-4120394857");
    }

    #[test]
    fn test_writes_rfc3339_seconds() {
        let value = Stamped {
            at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap(),
            id: "abc".to_string(),
        };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T12:00:05Z","id":"abc"}"#);
    }
}
