//! Order placement timestamps.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};

/// Naive layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts with a space separator, which RFC 3339 parsing
/// does not cover on every chrono version.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.fZ"];

/// The moment an order was placed, as written by the backend.
///
/// Keeps the wall-clock reading separate from the offset so that calendar
/// projections (date, hour, weekday) use the timezone the timestamp was
/// encoded in, while window comparisons use the absolute instant.
///
/// ## Examples
///
/// ```
/// use sabore_core::PlacedAt;
///
/// let placed = PlacedAt::parse("2024-03-10T21:15:00-03:00").unwrap();
/// assert_eq!(placed.hour(), 21);
/// assert_eq!(placed.instant().to_rfc3339(), "2024-03-11T00:15:00+00:00");
///
/// assert!(PlacedAt::parse("yesterday").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedAt {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl PlacedAt {
    /// Parse a backend timestamp.
    ///
    /// Accepts RFC 3339 (including the `Z` suffix), naive ISO 8601 date-times
    /// with a `T` or space separator, and bare `YYYY-MM-DD` dates (midnight).
    /// Returns `None` for anything else.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::from_fixed(dt));
        }

        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Some(Self::from_fixed(dt));
            }
            // `Z` has no offset field for chrono to read; parse it as UTC.
            if format.ends_with('Z')
                && let Ok(local) = NaiveDateTime::parse_from_str(raw, format)
            {
                return Some(Self {
                    local,
                    offset: FixedOffset::east_opt(0),
                });
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Self::naive(local));
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::naive)
    }

    /// Build from a wall-clock reading without offset information.
    #[must_use]
    pub const fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    fn from_fixed(dt: DateTime<FixedOffset>) -> Self {
        Self {
            local: dt.naive_local(),
            offset: Some(*dt.offset()),
        }
    }

    /// The wall-clock date and time as written.
    #[must_use]
    pub const fn local(&self) -> NaiveDateTime {
        self.local
    }

    /// The UTC offset, if the timestamp carried one.
    #[must_use]
    pub const fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// The calendar date as written.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }

    /// Hour of day (0-23) as written.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    /// ISO weekday index, 0 = Monday through 6 = Sunday.
    #[must_use]
    pub fn weekday_index(&self) -> u32 {
        self.local.weekday().num_days_from_monday()
    }

    /// Calendar month, 1 through 12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.local.month()
    }

    /// The absolute instant. Naive timestamps are interpreted as UTC.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        match self.offset {
            Some(offset) => offset
                .from_local_datetime(&self.local)
                .single()
                .map_or_else(|| self.local.and_utc(), |dt| dt.with_timezone(&Utc)),
            None => self.local.and_utc(),
        }
    }
}
