//! Solar Hijri (Jalali) calendar arithmetic.
//!
//! Editions on the archive site are labelled with Jalali dates, so all
//! externally visible dates stay in that calendar. Conversion to a continuous
//! day count (Julian day number) exists only for range arithmetic and uses
//! the standard 33-year-cycle algorithm with the published break years.

use crate::error::CrawlError;
use std::fmt;

/// Years for which the 33-year cycle table below is exact.
const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 3176;

/// Break years of the arithmetic Jalali calendar (Birashk / jalaali).
const BREAKS: [i64; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// One calendar date in the Jalali system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl SolarDate {
    /// Construct a validated date. Month and day must exist in the given year.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CrawlError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CrawlError::BadDate(format!(
                "year {year} outside supported range {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(CrawlError::BadDate(format!("month {month} out of range")));
        }
        if day < 1 || day > month_length(year, month) {
            return Err(CrawlError::BadDate(format!(
                "day {day} out of range for {year:04}-{month:02}"
            )));
        }
        Ok(SolarDate { year, month, day })
    }

    /// Parse the 8-digit compact form, e.g. `"14040401"`.
    pub fn parse_compact(s: &str) -> Result<Self, CrawlError> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CrawlError::BadDate(format!(
                "expected 8-digit YYYYMMDD date, got {s:?}"
            )));
        }
        let year: i32 = s[0..4]
            .parse()
            .map_err(|_| CrawlError::BadDate(s.to_string()))?;
        let month: u32 = s[4..6]
            .parse()
            .map_err(|_| CrawlError::BadDate(s.to_string()))?;
        let day: u32 = s[6..8]
            .parse()
            .map_err(|_| CrawlError::BadDate(s.to_string()))?;
        SolarDate::new(year, month, day)
    }

    /// Canonical 8-digit serial form (`year*10000 + month*100 + day`).
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Julian day number of this date.
    pub fn day_number(&self) -> i64 {
        let (_, gy, march) = jal_cal(self.year as i64);
        let jm = self.month as i64;
        gregorian_to_jdn(gy, 3, march) + (jm - 1) * 31 - (jm / 7) * (jm - 7) + self.day as i64 - 1
    }

    /// Inverse of [`day_number`](Self::day_number).
    pub fn from_day_number(jdn: i64) -> Self {
        let (gy, _, _) = jdn_to_gregorian(jdn);
        let mut jy = gy - 621;
        let (leap, _, march) = jal_cal(jy);
        let first_of_year = gregorian_to_jdn(gy, 3, march);
        let mut k = jdn - first_of_year;
        if k >= 0 {
            if k <= 185 {
                return SolarDate {
                    year: jy as i32,
                    month: (1 + k / 31) as u32,
                    day: (k % 31 + 1) as u32,
                };
            }
            k -= 186;
        } else {
            jy -= 1;
            k += 179;
            if leap == 1 {
                k += 1;
            }
        }
        SolarDate {
            year: jy as i32,
            month: (7 + k / 30) as u32,
            day: (k % 30 + 1) as u32,
        }
    }

    /// The date `n` days later (earlier for negative `n`).
    pub fn add_days(&self, n: i64) -> Self {
        Self::from_day_number(self.day_number() + n)
    }
}

impl fmt::Display for SolarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// True when Esfand has 30 days in `year`.
pub fn is_leap_year(year: i32) -> bool {
    let (leap, _, _) = jal_cal(year as i64);
    leap == 0
}

/// Number of days in `month` of `year`.
pub fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 => {
            if is_leap_year(year) {
                30
            } else {
                29
            }
        }
        _ => 0,
    }
}

/// Leap status of `jy`, the matching Gregorian year, and the Gregorian March
/// day of Farvardin 1. `leap == 0` means a leap year.
fn jal_cal(jy: i64) -> (i64, i64, i64) {
    let gy = jy + 621;
    let mut leap_j: i64 = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;
    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + (jump % 33) / 4;
        jp = jm;
    }
    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }
    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;
    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }
    (leap, gy, march)
}

/// Gregorian date to Julian day number (Fliegel & Van Flandern).
fn gregorian_to_jdn(gy: i64, gm: i64, gd: i64) -> i64 {
    let a = (gm - 14) / 12;
    (1461 * (gy + 4800 + a)) / 4 + (367 * (gm - 2 - 12 * a)) / 12
        - (3 * ((gy + 4900 + a) / 100)) / 4
        + gd
        - 32075
}

/// Julian day number to Gregorian (year, month, day).
fn jdn_to_gregorian(jdn: i64) -> (i64, i64, i64) {
    let mut l = jdn + 68569;
    let n = (4 * l) / 146097;
    l -= (146097 * n + 3) / 4;
    let i = (4000 * (l + 1)) / 1461001;
    l = l - (1461 * i) / 4 + 31;
    let j = (80 * l) / 2447;
    let gd = l - (2447 * j) / 80;
    l = j / 11;
    let gm = j + 2 - 12 * l;
    let gy = 100 * (n - 49) + i + l;
    (gy, gm, gd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let d = SolarDate::parse_compact("14040401").unwrap();
        assert_eq!(d.year(), 1404);
        assert_eq!(d.month(), 4);
        assert_eq!(d.day(), 1);
        assert_eq!(d.compact(), "14040401");
        assert_eq!(d.to_string(), "1404-04-01");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(SolarDate::parse_compact("1404041").is_err());
        assert!(SolarDate::parse_compact("140404010").is_err());
        assert!(SolarDate::parse_compact("1404x401").is_err());
        assert!(SolarDate::parse_compact("14041301").is_err());
        assert!(SolarDate::parse_compact("14040132").is_err());
        // Esfand 30 only exists in leap years; 1404 is not one.
        assert!(SolarDate::parse_compact("14041230").is_err());
        assert!(SolarDate::parse_compact("14031230").is_ok());
    }

    #[test]
    fn farvardin_first_matches_march_equinox() {
        // 1404-01-01 is 2025-03-21, JDN 2460756.
        let d = SolarDate::new(1404, 1, 1).unwrap();
        assert_eq!(d.day_number(), 2460756);
        // 1403-01-01 is 2024-03-20.
        let d = SolarDate::new(1403, 1, 1).unwrap();
        assert_eq!(d.day_number(), gregorian_to_jdn(2024, 3, 20));
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(1403));
        assert!(!is_leap_year(1404));
        assert!(!is_leap_year(1402));
        assert_eq!(month_length(1403, 12), 30);
        assert_eq!(month_length(1404, 12), 29);
        assert_eq!(month_length(1404, 6), 31);
        assert_eq!(month_length(1404, 7), 30);
    }

    #[test]
    fn add_days_crosses_year_boundary() {
        let last = SolarDate::new(1403, 12, 30).unwrap();
        let next = last.add_days(1);
        assert_eq!(next, SolarDate::new(1404, 1, 1).unwrap());
        assert_eq!(next.add_days(-1), last);
    }

    #[test]
    fn day_number_roundtrip_over_two_years() {
        let start = SolarDate::new(1403, 1, 1).unwrap();
        let first = start.day_number();
        for offset in 0..730 {
            let d = SolarDate::from_day_number(first + offset);
            assert_eq!(d.day_number(), first + offset);
            let reparsed = SolarDate::parse_compact(&d.compact()).unwrap();
            assert_eq!(reparsed, d);
        }
    }

    #[test]
    fn ordering_follows_calendar() {
        let a = SolarDate::new(1404, 4, 1).unwrap();
        let b = SolarDate::new(1404, 4, 2).unwrap();
        let c = SolarDate::new(1405, 1, 1).unwrap();
        assert!(a < b);
        assert!(b < c);
    }
}
