use chrono::{DateTime, NaiveDateTime, Utc};
use crate::core::circulation::{CirculationError, CirculationResult};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub mod serializer {
    use chrono::{NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{DATE_FMT, to_iso8601};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        to_iso8601(*time).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        let time = NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map_err(D::Error::custom)?;
        Ok(time)
    }
}

pub mod opt_serializer {
    use chrono::{NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::{DATE_FMT, to_iso8601};

    pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        time.map(to_iso8601).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        match str_time {
            Some(str_time) => {
                let time = NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map_err(D::Error::custom)?;
                Ok(Some(time))
            }
            None => Ok(None),
        }
    }
}

pub fn to_iso8601(t: NaiveDateTime) -> String {
    DateTime::<Utc>::from_utc(t, Utc).to_rfc3339()
}

// status documents carry ISO-8601 timestamps with an offset
pub fn parse_iso8601(value: &str) -> CirculationResult<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.naive_utc())
        .map_err(|err| CirculationError::bad_response(
            format!("invalid timestamp {} {:?}", value, err).as_str()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate};
    use crate::utils::date::{parse_iso8601, to_iso8601};

    #[tokio::test]
    async fn test_should_round_trip_iso8601() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap();
        let str_time = to_iso8601(time);
        let parsed = parse_iso8601(str_time.as_str()).expect("should parse");
        assert_eq!(time, parsed);
    }

    #[tokio::test]
    async fn test_should_parse_offset_timestamp() {
        let parsed = parse_iso8601("2024-03-01T12:30:00+02:00").expect("should parse");
        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap(), parsed);
    }

    #[tokio::test]
    async fn test_should_reject_garbage_timestamp() {
        assert!(parse_iso8601("not-a-date").is_err());
    }
}
