use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A configured shift: clock-time start/end pair plus a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShiftWindow {
    #[serde(with = "clock")]
    #[schema(value_type = String, example = "08:00")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    #[schema(value_type = String, example = "16:00")]
    pub end: NaiveTime,
    #[serde(default)]
    #[schema(example = "08:00 - 16:00")]
    pub label: String,
}

impl ShiftWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        let label = format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"));
        Self { start, end, label }
    }

    fn from_clock(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(parse_clock(start)?, parse_clock(end)?))
    }
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// "HH:MM" wire format for shift clock times.
mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock(&raw).ok_or_else(|| serde::de::Error::custom("expected HH:MM"))
    }
}

fn shift(start: &str, end: &str) -> ShiftWindow {
    ShiftWindow::from_clock(start, end).expect("built-in shift clock literal")
}

/// Mon-Fri: 8-16, 10-18, 13-21
pub static WEEKDAY_SHIFTS: Lazy<Vec<ShiftWindow>> = Lazy::new(|| {
    vec![
        shift("08:00", "16:00"),
        shift("10:00", "18:00"),
        shift("13:00", "21:00"),
    ]
});

/// Saturday: 8-15, 10-17, 13-21
pub static SATURDAY_SHIFTS: Lazy<Vec<ShiftWindow>> = Lazy::new(|| {
    vec![
        shift("08:00", "15:00"),
        shift("10:00", "17:00"),
        shift("13:00", "21:00"),
    ]
});

/// Sunday
pub static SUNDAY_SHIFTS: Lazy<Vec<ShiftWindow>> = Lazy::new(|| vec![shift("10:00", "19:00")]);

/// Public holiday
pub static HOLIDAY_SHIFTS: Lazy<Vec<ShiftWindow>> = Lazy::new(|| vec![shift("10:00", "19:00")]);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DayClassification {
    Weekday,
    Saturday,
    Sunday,
    Holiday,
}

/// Wall-clock "now" in the configured civil timezone. Every day/shift
/// comparison goes through this; the host timezone never participates.
pub fn civil_now(tz: Tz) -> NaiveDateTime {
    civil_at(tz, Utc::now())
}

pub fn civil_at(tz: Tz, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Classifies a civil date. An admin holiday override equal to `today`
/// forces HOLIDAY; the override expires by this very comparison once the
/// date rolls over.
pub fn classify_day(today: NaiveDate, holiday_override: Option<NaiveDate>) -> DayClassification {
    if holiday_override == Some(today) {
        return DayClassification::Holiday;
    }
    match today.weekday() {
        Weekday::Sun => DayClassification::Sunday,
        Weekday::Sat => DayClassification::Saturday,
        _ => DayClassification::Weekday,
    }
}

/// Admin-curated shift subsets per day type. `None` means the admin
/// never curated that day type and the built-in catalog applies;
/// `Some(empty)` means no shifts are enabled at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledShifts {
    pub weekday: Option<Vec<ShiftWindow>>,
    pub saturday: Option<Vec<ShiftWindow>>,
    pub sunday: Option<Vec<ShiftWindow>>,
}

impl EnabledShifts {
    /// Canonical JSON for the settings column. `None` when nothing is
    /// curated, so the column stays NULL.
    pub fn to_stored_json(&self) -> Option<String> {
        let mut map = serde_json::Map::new();
        if let Some(list) = &self.weekday {
            map.insert("WEEKDAY".into(), serde_json::to_value(list).ok()?);
        }
        if let Some(list) = &self.saturday {
            map.insert("SATURDAY".into(), serde_json::to_value(list).ok()?);
        }
        if let Some(list) = &self.sunday {
            map.insert("SUNDAY".into(), serde_json::to_value(list).ok()?);
        }
        if map.is_empty() {
            return None;
        }
        serde_json::to_string(&Value::Object(map)).ok()
    }
}

fn parse_entries(value: &Value) -> Vec<ShiftWindow> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let parsed: ShiftWindow = serde_json::from_value(entry.clone()).ok()?;
            // labels are always recomputed from the clocks
            Some(ShiftWindow::new(parsed.start, parsed.end))
        })
        .collect()
}

/// Collapses the stored `enabled_shifts` column to the canonical shape.
///
/// The column has carried several shapes over time: NULL (never
/// curated), a canonical object keyed by day type, and a legacy bare
/// array that applied to weekdays and Saturdays alike. Anything else
/// collapses to empty subsets, which check-in treats as "no shifts
/// configured" until the admin fixes the settings.
pub fn parse_enabled_shifts(raw: Option<&str>) -> EnabledShifts {
    let Some(raw) = raw else {
        return EnabledShifts::default();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EnabledShifts::default();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => EnabledShifts {
            weekday: map.get("WEEKDAY").map(parse_entries),
            saturday: map.get("SATURDAY").map(parse_entries),
            sunday: map.get("SUNDAY").map(parse_entries),
        },
        Ok(value @ Value::Array(_)) => {
            let list = parse_entries(&value);
            EnabledShifts {
                weekday: Some(list.clone()),
                saturday: Some(list),
                sunday: None,
            }
        }
        _ => EnabledShifts {
            weekday: Some(Vec::new()),
            saturday: Some(Vec::new()),
            sunday: Some(Vec::new()),
        },
    }
}

/// Shifts permitted for a day classification. HOLIDAY is always the
/// fixed built-in list. An empty return means "no shifts configured" and
/// is a hard failure for check-in, never "use all".
pub fn shifts_for(classification: DayClassification, enabled: &EnabledShifts) -> Vec<ShiftWindow> {
    match classification {
        DayClassification::Holiday => HOLIDAY_SHIFTS.clone(),
        DayClassification::Sunday => enabled
            .sunday
            .clone()
            .unwrap_or_else(|| SUNDAY_SHIFTS.clone()),
        DayClassification::Saturday => enabled
            .saturday
            .clone()
            .unwrap_or_else(|| SATURDAY_SHIFTS.clone()),
        DayClassification::Weekday => enabled
            .weekday
            .clone()
            .unwrap_or_else(|| WEEKDAY_SHIFTS.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_mapping_follows_iso_weekday() {
        // 2026-08-01 is a Saturday
        assert_eq!(classify_day(date(2026, 8, 1), None), DayClassification::Saturday);
        assert_eq!(classify_day(date(2026, 8, 2), None), DayClassification::Sunday);
        assert_eq!(classify_day(date(2026, 8, 3), None), DayClassification::Weekday);
        assert_eq!(classify_day(date(2026, 8, 7), None), DayClassification::Weekday);
    }

    #[test]
    fn civil_date_follows_the_configured_zone_not_utc() {
        use chrono::TimeZone;
        let tz: Tz = "Asia/Jakarta".parse().unwrap();
        // 18:00 UTC on Saturday is already 01:00 Sunday in Jakarta
        let instant = Utc.with_ymd_and_hms(2026, 8, 1, 18, 0, 0).unwrap();
        let civil = civil_at(tz, instant);
        assert_eq!(civil.date(), date(2026, 8, 2));
        assert_eq!(classify_day(civil.date(), None), DayClassification::Sunday);
    }

    #[test]
    fn holiday_override_forces_holiday_even_on_a_tuesday() {
        let tuesday = date(2026, 8, 4);
        assert_eq!(
            classify_day(tuesday, Some(tuesday)),
            DayClassification::Holiday
        );
    }

    #[test]
    fn holiday_override_expires_at_date_rollover() {
        let yesterday = date(2026, 8, 3);
        let today = date(2026, 8, 4);
        assert_eq!(
            classify_day(today, Some(yesterday)),
            DayClassification::Weekday
        );
    }

    #[test]
    fn builtin_catalogs_match_the_published_schedule() {
        assert_eq!(WEEKDAY_SHIFTS.len(), 3);
        assert_eq!(WEEKDAY_SHIFTS[0].label, "08:00 - 16:00");
        assert_eq!(SATURDAY_SHIFTS[0].label, "08:00 - 15:00");
        assert_eq!(SUNDAY_SHIFTS.len(), 1);
        assert_eq!(HOLIDAY_SHIFTS[0].label, "10:00 - 19:00");
    }

    #[test]
    fn parses_canonical_object_form() {
        let raw = r#"{"WEEKDAY":[{"start":"09:00","end":"17:00"}]}"#;
        let enabled = parse_enabled_shifts(Some(raw));
        let weekday = enabled.weekday.unwrap();
        assert_eq!(weekday.len(), 1);
        assert_eq!(weekday[0].label, "09:00 - 17:00");
        assert_eq!(enabled.saturday, None);
        assert_eq!(enabled.sunday, None);
    }

    #[test]
    fn parses_legacy_bare_array_for_weekday_and_saturday() {
        let raw = r#"[{"start":"10:00","end":"18:00"},{"start":"13:00","end":"21:00"}]"#;
        let enabled = parse_enabled_shifts(Some(raw));
        assert_eq!(enabled.weekday.as_ref().unwrap().len(), 2);
        assert_eq!(enabled.saturday.as_ref().unwrap().len(), 2);
        assert_eq!(enabled.sunday, None);
    }

    #[test]
    fn malformed_json_collapses_to_empty_subsets() {
        let enabled = parse_enabled_shifts(Some("definitely-not-json"));
        assert_eq!(enabled.weekday, Some(Vec::new()));
        assert_eq!(enabled.saturday, Some(Vec::new()));
        assert_eq!(enabled.sunday, Some(Vec::new()));
    }

    #[test]
    fn unparseable_entries_are_skipped() {
        let raw = r#"{"WEEKDAY":[{"start":"8am","end":"16:00"},{"start":"10:00","end":"18:00"}]}"#;
        let enabled = parse_enabled_shifts(Some(raw));
        assert_eq!(enabled.weekday.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn null_or_blank_column_means_builtin_defaults() {
        assert_eq!(parse_enabled_shifts(None), EnabledShifts::default());
        assert_eq!(parse_enabled_shifts(Some("  ")), EnabledShifts::default());

        let shifts = shifts_for(DayClassification::Weekday, &EnabledShifts::default());
        assert_eq!(shifts, *WEEKDAY_SHIFTS);
    }

    #[test]
    fn holiday_catalog_ignores_curation() {
        let enabled = EnabledShifts {
            weekday: Some(Vec::new()),
            saturday: Some(Vec::new()),
            sunday: Some(Vec::new()),
        };
        assert_eq!(shifts_for(DayClassification::Holiday, &enabled), *HOLIDAY_SHIFTS);
        // while the curated (empty) subsets stay empty
        assert!(shifts_for(DayClassification::Weekday, &enabled).is_empty());
    }

    #[test]
    fn stored_json_round_trips() {
        let enabled = EnabledShifts {
            weekday: Some(vec![shift("08:00", "16:00")]),
            saturday: None,
            sunday: Some(vec![shift("10:00", "19:00")]),
        };
        let stored = enabled.to_stored_json().unwrap();
        assert_eq!(parse_enabled_shifts(Some(&stored)), enabled);

        assert_eq!(EnabledShifts::default().to_stored_json(), None);
    }
}
