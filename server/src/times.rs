use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The creation and modification times of a record.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Times {
    /// The date and time it was created.
    #[serde(with = "unix")]
    pub(crate) created_at: OffsetDateTime,

    /// The date and time it was last modified.
    #[serde(with = "unix")]
    pub(crate) updated_at: OffsetDateTime,
}

impl Times {
    pub fn new(created_at: OffsetDateTime, updated_at: OffsetDateTime) -> Self {
        Times {
            created_at,
            updated_at,
        }
    }

    /// Both fields set to the current instant. Used by the in-memory mock.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();

        Times::new(now, now)
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// (De)serializes an [`OffsetDateTime`] as a Unix timestamp in seconds.
pub mod unix {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.unix_timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let seconds = i64::deserialize(deserializer)?;

        Ok(OffsetDateTime::from_unix_timestamp(seconds))
    }
}
