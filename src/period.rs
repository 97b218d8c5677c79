/// Monthly period arithmetic and the display date window.
///
/// All series in this service are regular monthly records, so time is kept
/// as a flat month index rather than a full datetime: cheap to compare, trim
/// and subtract, with the calendar recoverable when month lengths matter.
///
/// Water-year convention (USGS): October through December belong to the
/// water year of the *following* calendar year; January through September
/// to the current one. A point dated Sep 1921 is in water year 1921, a
/// point dated Oct 1921 is in water year 1922.

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Month stamps
// ---------------------------------------------------------------------------

/// A month stamp: months elapsed since January 1900.
///
/// `stamp(1900, 1) == 0`, `stamp(1921, 10) == 261`. Ordinary integer
/// ordering is chronological ordering.
pub type MonthStamp = i32;

/// Builds the stamp for a calendar (year, month). `month` is 1-based.
pub fn stamp(year: i32, month: u32) -> MonthStamp {
    (year - 1900) * 12 + (month as i32 - 1)
}

/// Calendar year of a stamp.
pub fn year_of(t: MonthStamp) -> i32 {
    1900 + t.div_euclid(12)
}

/// Calendar month of a stamp, 1-based.
pub fn month_of(t: MonthStamp) -> u32 {
    (t.rem_euclid(12) + 1) as u32
}

/// Water year containing a stamp.
pub fn water_year(t: MonthStamp) -> i32 {
    let y = year_of(t);
    if month_of(t) < 10 { y } else { y + 1 }
}

/// True number of days in a calendar month, from real calendar arithmetic.
/// Returns 0.0 for an unrepresentable month rather than panicking.
pub fn days_in_month(year: i32, month: u32) -> f64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as f64,
        _ => 0.0,
    }
}

/// Parses a three-letter month name ("Oct", "oct", "OCT") to 1..=12.
pub fn month_to_int(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Inclusive display window in months, with derived water-year bounds.
///
/// Fetched series are trimmed to `[start, end]`; annual accumulation and
/// the annual exceedance slice run over water years `start_wy..=end_wy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: MonthStamp,
    pub end: MonthStamp,
    pub start_wy: i32,
    pub end_wy: i32,
}

impl DateWindow {
    /// Builds a window from inclusive (year, month) endpoints.
    pub fn new(start_year: i32, start_month: u32, end_year: i32, end_month: u32) -> DateWindow {
        DateWindow {
            start: stamp(start_year, start_month),
            end: stamp(end_year, end_month),
            start_wy: if start_month < 10 { start_year } else { start_year + 1 },
            end_wy: if end_month < 10 { end_year } else { end_year + 1 },
        }
    }

    /// Parses a range string in the form "mmmyyyy-mmmyyyy", for example
    /// "Oct1921-Sep2003".
    ///
    /// Malformed input returns `None` — the unset sentinel. Callers keep the
    /// window unset and the readiness check reports it before any read; no
    /// error is raised here.
    pub fn parse(range: &str) -> Option<DateWindow> {
        let (a, b) = range.trim().split_once('-')?;
        let (sy, sm) = parse_month_year(a)?;
        let (ey, em) = parse_month_year(b)?;
        Some(DateWindow::new(sy, sm, ey, em))
    }

    /// Number of water years covered, `end_wy - start_wy + 1`.
    pub fn water_years(&self) -> usize {
        (self.end_wy - self.start_wy + 1).max(0) as usize
    }

    pub fn contains(&self, t: MonthStamp) -> bool {
        t >= self.start && t <= self.end
    }
}

fn parse_month_year(part: &str) -> Option<(i32, u32)> {
    let part = part.trim();
    if part.len() < 4 {
        return None;
    }
    let month = month_to_int(part.get(..3)?)?;
    let year: i32 = part.get(3..)?.parse().ok()?;
    Some((year, month))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
