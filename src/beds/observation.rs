use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};

pub const ONE_MINUTE: Duration = Duration::minutes(1);

/// One bed-count reading recorded by the tracker for a hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub hospital_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub bed_count: i32,
}

impl Observation {
    pub fn new(
        hospital_name: impl Into<String>,
        timestamp: OffsetDateTime,
        bed_count: i32,
    ) -> Self {
        Self {
            hospital_name: hospital_name.into(),
            timestamp,
            bed_count,
        }
    }

    pub fn has_available_bed(&self) -> bool {
        self.bed_count > 0
    }
}

/// Hour/minute equality, ignoring seconds and below.
///
/// Both sides are normalised to UTC first so readings recorded under
/// different offsets still line up.
pub fn same_minute(a: OffsetDateTime, b: OffsetDateTime) -> bool {
    let a = a.to_offset(UtcOffset::UTC);
    let b = b.to_offset(UtcOffset::UTC);
    a.hour() == b.hour() && a.minute() == b.minute()
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(timestamp: OffsetDateTime) -> OffsetDateTime {
    timestamp
        - Duration::seconds(i64::from(timestamp.second()))
        - Duration::nanoseconds(i64::from(timestamp.nanosecond()))
}
