//! One-shot conversion of legacy start-date-only records.
//!
//! Legacy blobs hold `[{ "startDate": ... }, ...]` with an implicit period
//! length of six days. The start is either a `YYYY-MM-DD` string or the
//! number of seconds since 2001-01-01 00:00:00 UTC, which is how the old app
//! encoded dates. Migration reads the legacy key once, writes the converted
//! history under the current key and leaves the legacy blob alone.

use chrono::{DateTime, Local};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::date_range::DayRange;
use crate::day::Day;
use crate::error::Result;
use crate::period::{build_history, PeriodHistory};
use crate::types::DayCount;

use super::{encode_history, KeyValueStore, LEGACY_RECORDS_KEY, RECORDS_KEY};

/// Period length implied by every legacy record.
pub const LEGACY_PERIOD_LENGTH: DayCount = DayCount::new(6);

/// Unix timestamp of 2001-01-01 00:00:00 UTC.
const REFERENCE_EPOCH_UNIX_SECS: f64 = 978_307_200.0;

/// A legacy record: only the first day was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRecord {
    #[serde(alias = "startDate", deserialize_with = "deserialize_start")]
    pub start: Day,
}

impl LegacyRecord {
    /// The days this record stands for.
    #[must_use]
    pub fn span(&self) -> DayRange {
        DayRange::starting_at(self.start, LEGACY_PERIOD_LENGTH)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyStart {
    Day(Day),
    ReferenceSeconds(f64),
}

fn deserialize_start<'de, D>(deserializer: D) -> std::result::Result<Day, D::Error>
where
    D: Deserializer<'de>,
{
    match LegacyStart::deserialize(deserializer)? {
        LegacyStart::Day(day) => Ok(day),
        LegacyStart::ReferenceSeconds(secs) => day_from_reference_seconds(secs)
            .ok_or_else(|| de::Error::custom(format!("legacy start {secs} is out of range"))),
    }
}

/// Local calendar day of a timestamp counted from 2001-01-01 UTC.
#[allow(clippy::cast_possible_truncation)]
fn day_from_reference_seconds(secs: f64) -> Option<Day> {
    let unix = (secs + REFERENCE_EPOCH_UNIX_SECS).floor();
    if !unix.is_finite() {
        return None;
    }
    let at = DateTime::from_timestamp(unix as i64, 0)?;
    Day::from_datetime(&at.with_timezone(&Local))
}

/// Expand legacy records into a history.
///
/// Spans are regrouped by the history builder, so legacy records that
/// overlapped or touched become a single period.
#[must_use]
pub fn convert_legacy(records: &[LegacyRecord]) -> PeriodHistory {
    build_history(records.iter().flat_map(|r| r.span().days()))
}

/// Read and convert the legacy blob without writing anything.
///
/// Returns `Ok(None)` when there is no legacy blob.
pub fn read_legacy<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<PeriodHistory>> {
    let Some(bytes) = store.get(LEGACY_RECORDS_KEY)? else {
        return Ok(None);
    };

    let legacy: Vec<LegacyRecord> = serde_json::from_slice(&bytes)?;
    let history = convert_legacy(&legacy);
    debug!(
        legacy_records = legacy.len(),
        periods = history.len(),
        "Converted legacy period records"
    );
    Ok(Some(history))
}

/// Migrate the legacy blob if one exists.
///
/// Returns `Ok(None)` when there is no legacy blob. The caller is expected to
/// have checked that the current key is absent.
pub fn migrate_legacy<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<Option<PeriodHistory>> {
    let Some(history) = read_legacy(store)? else {
        return Ok(None);
    };
    store.set(RECORDS_KEY, &encode_history(&history)?)?;
    info!(periods = history.len(), "Migrated legacy period records");
    Ok(Some(history))
}
