use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use ulid::Ulid;

use crate::engine::ValidationError;
use crate::limits::*;

/// Minutes since local midnight. Fractional when a duration is not a whole
/// number of minutes.
pub type Minutes = f64;

/// Half-open interval `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: Minutes,
    pub end: Minutes,
}

impl Span {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// An empty span overlaps nothing, not even a span that surrounds it.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Wall-clock time of day, `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { minutes: hour * 60 + minute })
    }

    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u16 {
        self.minutes % 60
    }

    /// Offset from midnight.
    pub fn minutes(&self) -> u16 {
        self.minutes
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Opaque booking identifier. New bookings get a ULID; stored collections
/// may carry ids in any string format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sport {
    Football,
    Basketball,
    Tennis,
    Badminton,
    Cricket,
    Volleyball,
    /// A stored value outside the offered set. Never produced by a form.
    Other(String),
}

impl Sport {
    /// The sports a form may offer.
    pub const ALL: [Sport; 6] = [
        Sport::Football,
        Sport::Basketball,
        Sport::Tennis,
        Sport::Badminton,
        Sport::Cricket,
        Sport::Volleyball,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Sport::Football => "Football",
            Sport::Basketball => "Basketball",
            Sport::Tennis => "Tennis",
            Sport::Badminton => "Badminton",
            Sport::Cricket => "Cricket",
            Sport::Volleyball => "Volleyball",
            Sport::Other(s) => s,
        }
    }

    fn offered(s: &str) -> Option<Sport> {
        Sport::ALL.into_iter().find(|sport| sport.as_str() == s)
    }
}

impl FromStr for Sport {
    type Err = ValidationError;

    /// Only offered sports parse; `Other` comes from storage alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::offered(s.trim()).ok_or_else(|| ValidationError::UnknownSport(s.to_string()))
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Sport::offered(&s).unwrap_or(Sport::Other(s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Venue {
    CourtA,
    CourtB,
    TurfField,
    IndoorHall,
    /// A stored value outside the offered set. Never produced by a form.
    Other(String),
}

impl Venue {
    /// The venues a form may offer.
    pub const ALL: [Venue; 4] = [Venue::CourtA, Venue::CourtB, Venue::TurfField, Venue::IndoorHall];

    pub fn as_str(&self) -> &str {
        match self {
            Venue::CourtA => "Court A",
            Venue::CourtB => "Court B",
            Venue::TurfField => "Turf Field",
            Venue::IndoorHall => "Indoor Hall",
            Venue::Other(s) => s,
        }
    }

    fn offered(s: &str) -> Option<Venue> {
        Venue::ALL.into_iter().find(|venue| venue.as_str() == s)
    }
}

impl FromStr for Venue {
    type Err = ValidationError;

    /// Only offered venues parse; `Other` comes from storage alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Venue::offered(s.trim()).ok_or_else(|| ValidationError::UnknownVenue(s.to_string()))
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Venue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Venue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Venue::offered(&s).unwrap_or(Venue::Other(s)))
    }
}

/// Which venues the listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VenueFilter {
    #[default]
    All,
    Only(Venue),
}

impl VenueFilter {
    pub fn matches(&self, venue: &Venue) -> bool {
        match self {
            VenueFilter::All => true,
            VenueFilter::Only(v) => v == venue,
        }
    }
}

impl FromStr for VenueFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(VenueFilter::All);
        }
        s.parse().map(VenueFilter::Only)
    }
}

impl<'de> Deserialize<'de> for VenueFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A confirmed reservation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub name: String,
    pub phone: String,
    pub sport: Sport,
    pub venue: Venue,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    /// Hours.
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub duration: f64,
    #[serde(default)]
    pub notes: String,
}

impl Booking {
    /// The occupied interval. Negative or non-finite durations occupy nothing.
    pub fn span(&self) -> Span {
        let start = self.start_time.minutes() as Minutes;
        let len = if self.duration.is_finite() {
            (self.duration * 60.0).max(0.0)
        } else {
            0.0
        };
        Span::new(start, start + len)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn number_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}

/// Raw form input, every field as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    pub sport: String,
    pub venue: String,
    pub date: String,
    pub start_time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub duration: String,
    pub notes: String,
}

impl BookingForm {
    /// Validate every field and build a booking. Required fields are checked
    /// first so an incomplete form always reports `MissingField`.
    pub fn into_booking(self, id: BookingId, today: NaiveDate) -> Result<Booking, ValidationError> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("sport", &self.sport),
            ("venue", &self.venue),
            ("date", &self.date),
            ("startTime", &self.start_time),
            ("duration", &self.duration),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let name = self.name.trim().to_string();
        let phone = self.phone.trim().to_string();
        let notes = self.notes.trim().to_string();
        if name.len() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong("name"));
        }
        if phone.len() > MAX_PHONE_LEN {
            return Err(ValidationError::TooLong("phone"));
        }
        if notes.len() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong("notes"));
        }
        for (field, value) in [("name", &name), ("phone", &phone), ("notes", &notes)] {
            if value.chars().any(char::is_control) {
                return Err(ValidationError::ControlCharacter(field));
            }
        }

        let sport: Sport = self.sport.parse()?;
        let venue: Venue = self.venue.parse()?;

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;
        if date < today {
            return Err(ValidationError::DateInPast(date));
        }

        let start_time: TimeOfDay = self.start_time.parse()?;

        let duration: f64 = self
            .duration
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDuration(self.duration.clone()))?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::InvalidDuration(self.duration.clone()));
        }

        let end = start_time.minutes() as Minutes + duration * 60.0;
        if end > MINUTES_PER_DAY as Minutes {
            return Err(ValidationError::CrossesMidnight { start_time, duration });
        }

        Ok(Booking {
            id,
            name,
            phone,
            sport,
            venue,
            date,
            start_time,
            duration,
            notes,
        })
    }
}

// ── View types ──────────────────────────────────────────────────

/// Aggregate counts over the unfiltered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub bookings: usize,
    pub venues: usize,
    pub sports: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Ok, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }
}

/// Everything the presentation layer needs after one command.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub filter: VenueFilter,
    pub stats: Stats,
    /// Sorted by `(date, start_time)` and filtered by `filter`.
    pub bookings: Vec<Booking>,
    /// Earliest date the date picker may offer.
    pub min_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Option<Status>,
    pub view: View,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn form() -> BookingForm {
        BookingForm {
            name: "  Ana  ".into(),
            phone: "555-0101".into(),
            sport: "Tennis".into(),
            venue: "Court A".into(),
            date: "2025-06-10".into(),
            start_time: "10:00".into(),
            duration: "1.5".into(),
            notes: "".into(),
        }
    }

    #[test]
    fn span_half_open() {
        let a = Span::new(600.0, 660.0);
        let b = Span::new(630.0, 690.0);
        let c = Span::new(660.0, 720.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert_eq!(a.duration(), 60.0);
    }

    #[test]
    fn empty_span_overlaps_nothing() {
        let empty = Span::new(630.0, 630.0);
        let around = Span::new(600.0, 700.0);
        assert!(empty.is_empty());
        assert!(!empty.overlaps(&around));
        assert!(!around.overlaps(&empty));
    }

    #[test]
    fn time_of_day_parse_and_display() {
        let t: TimeOfDay = "09:05".parse().unwrap();
        assert_eq!(t.minutes(), 9 * 60 + 5);
        assert_eq!(t.to_string(), "09:05");
        let t: TimeOfDay = "7:30".parse().unwrap();
        assert_eq!(t.to_string(), "07:30");
    }

    #[test]
    fn time_of_day_rejects_garbage() {
        for bad in ["", "10", "24:00", "10:60", "10:5", "ab:cd", "-1:00", "10:00:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn venue_and_sport_names() {
        assert_eq!("Court A".parse::<Venue>().unwrap(), Venue::CourtA);
        assert_eq!("Indoor Hall".parse::<Venue>().unwrap().to_string(), "Indoor Hall");
        assert!("Court Z".parse::<Venue>().is_err());
        assert_eq!("Cricket".parse::<Sport>().unwrap(), Sport::Cricket);
        assert!("Chess".parse::<Sport>().is_err());
    }

    #[test]
    fn stored_unknown_venue_and_sport_are_kept() {
        let venue: Venue = serde_json::from_str(r#""Rooftop""#).unwrap();
        let sport: Sport = serde_json::from_str(r#""Padel""#).unwrap();
        assert_eq!(venue, Venue::Other("Rooftop".into()));
        assert_eq!(sport, Sport::Other("Padel".into()));
        assert_eq!(serde_json::to_string(&venue).unwrap(), r#""Rooftop""#);
        assert_eq!(serde_json::to_string(&Venue::CourtB).unwrap(), r#""Court B""#);
        // A form still cannot pick them.
        assert!("Rooftop".parse::<Venue>().is_err());
    }

    #[test]
    fn venue_filter_parse() {
        assert_eq!("all".parse::<VenueFilter>().unwrap(), VenueFilter::All);
        assert_eq!(
            "Court B".parse::<VenueFilter>().unwrap(),
            VenueFilter::Only(Venue::CourtB)
        );
        assert!(VenueFilter::All.matches(&Venue::TurfField));
        assert!(!VenueFilter::Only(Venue::CourtA).matches(&Venue::CourtB));
    }

    #[test]
    fn form_builds_trimmed_booking() {
        let id = BookingId::generate();
        let b = form().into_booking(id.clone(), date("2025-06-01")).unwrap();
        assert_eq!(b.id, id);
        assert_eq!(b.name, "Ana");
        assert_eq!(b.venue, Venue::CourtA);
        assert_eq!(b.sport, Sport::Tennis);
        assert_eq!(b.duration, 1.5);
        assert_eq!(b.span(), Span::new(600.0, 690.0));
    }

    #[test]
    fn form_missing_field() {
        let f = BookingForm { phone: "   ".into(), ..form() };
        let err = f.into_booking(BookingId::generate(), date("2025-06-01")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("phone"));
    }

    #[test]
    fn form_date_today_allowed_past_rejected() {
        assert!(form().into_booking(BookingId::generate(), date("2025-06-10")).is_ok());
        let err = form().into_booking(BookingId::generate(), date("2025-06-11")).unwrap_err();
        assert!(matches!(err, ValidationError::DateInPast(_)));
    }

    #[test]
    fn form_rejects_bad_duration() {
        for bad in ["abc", "0", "-1", "NaN", "inf"] {
            let f = BookingForm { duration: bad.into(), ..form() };
            let err = f.into_booking(BookingId::generate(), date("2025-06-01")).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidDuration(_)), "{bad}");
        }
    }

    #[test]
    fn form_rejects_bad_time_and_date() {
        let f = BookingForm { start_time: "25:00".into(), ..form() };
        assert!(matches!(
            f.into_booking(BookingId::generate(), date("2025-06-01")),
            Err(ValidationError::InvalidTime(_))
        ));
        let f = BookingForm { date: "10/06/2025".into(), ..form() };
        assert!(matches!(
            f.into_booking(BookingId::generate(), date("2025-06-01")),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn form_rejects_control_characters() {
        let f = BookingForm { notes: "hi\nok: Booking confirmed".into(), ..form() };
        let err = f.into_booking(BookingId::generate(), date("2025-06-01")).unwrap_err();
        assert_eq!(err, ValidationError::ControlCharacter("notes"));

        let f = BookingForm { name: "A\u{1b}[2Jna".into(), ..form() };
        let err = f.into_booking(BookingId::generate(), date("2025-06-01")).unwrap_err();
        assert_eq!(err, ValidationError::ControlCharacter("name"));
    }

    #[test]
    fn form_rejects_crossing_midnight() {
        let f = BookingForm { start_time: "23:00".into(), duration: "2".into(), ..form() };
        let err = f.into_booking(BookingId::generate(), date("2025-06-01")).unwrap_err();
        assert!(matches!(err, ValidationError::CrossesMidnight { .. }));

        // Ending exactly at midnight is fine.
        let f = BookingForm { start_time: "23:00".into(), duration: "1".into(), ..form() };
        assert!(f.into_booking(BookingId::generate(), date("2025-06-01")).is_ok());
    }

    #[test]
    fn booking_wire_format() {
        let b = form().into_booking(BookingId::generate(), date("2025-06-01")).unwrap();
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["startTime"], "10:00");
        assert_eq!(json["date"], "2025-06-10");
        assert_eq!(json["venue"], "Court A");
        assert_eq!(json["duration"], 1.5);
    }

    #[test]
    fn booking_accepts_string_duration_and_missing_notes() {
        let json = String::from(
            r#"{"id":"3f2b8c1e-9a4d-4c1b-8e2f-0a1b2c3d4e5f","name":"Bo","phone":"1","sport":"Football","venue":"Turf Field",
                "date":"2025-06-10","startTime":"18:30","duration":"2"}"#,
        );
        let b: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(b.id.as_str(), "3f2b8c1e-9a4d-4c1b-8e2f-0a1b2c3d4e5f");
        assert_eq!(b.duration, 2.0);
        assert_eq!(b.notes, "");
        assert_eq!(b.span(), Span::new(1110.0, 1230.0));
    }

    #[test]
    fn negative_stored_duration_occupies_nothing() {
        let mut b = form().into_booking(BookingId::generate(), date("2025-06-01")).unwrap();
        b.duration = -3.0;
        assert!(b.span().is_empty());
    }

    #[test]
    fn form_accepts_numeric_duration() {
        let f: BookingForm = serde_json::from_str(r#"{"duration": 2}"#).unwrap();
        assert_eq!(f.duration, "2");
    }
}
