//! 24-hour clock arithmetic for the prediction dial.
//!
//! The dial places midnight at the top and runs clockwise, so 6:00 AM sits at
//! three o'clock, noon at the bottom and 6:00 PM on the left. Pointer positions
//! are turned into an angle around the dial centre and then into a [`ClockTime`]
//! snapped to the nearest minute.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};

pub const MINUTES_PER_DAY: i32 = 1440;
const HALF_DAY: i32 = MINUTES_PER_DAY / 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("empty time string")]
    Empty,
    #[error("malformed time '{0}'")]
    Malformed(String),
    #[error("time '{0}' is out of range")]
    OutOfRange(String),
}

/// Time of day with minute resolution (minutes since midnight, `0..1440`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Build from a 24-hour hour / minute pair. Out-of-range parts wrap.
    pub const fn hm(hour: u8, minute: u8) -> Self {
        Self((hour as u16 % 24) * 60 + minute as u16 % 60)
    }

    /// Any integer minute count, wrapped into a single day.
    pub fn from_minutes(minutes: i32) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    pub fn from_datetime(ts: &NaiveDateTime) -> Self {
        Self::hm(ts.hour() as u8, ts.minute() as u8)
    }

    /// Dial angle in degrees (0 = top, clockwise) to the nearest minute.
    pub fn from_angle(angle_deg: f64) -> Self {
        let turn = angle_deg.rem_euclid(360.0) / 360.0;
        Self::from_minutes((turn * MINUTES_PER_DAY as f64).round() as i32)
    }

    pub fn minutes(self) -> i32 {
        self.0 as i32
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn angle(self) -> f64 {
        self.0 as f64 / MINUTES_PER_DAY as f64 * 360.0
    }

    /// Signed minutes from `self` forward to `later`, folded into (-720, 720]
    /// so that 11:30 PM -> 12:30 AM reads as +60 rather than -1380.
    pub fn minutes_until(self, later: ClockTime) -> i32 {
        wrap_delta(later.minutes() - self.minutes())
    }

    /// Parse `"1:10 PM"`, `"1:10pm"`, `"12:05 AM"` or 24-hour `"13:10"`.
    pub fn parse(s: &str) -> Result<Self, ClockError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ClockError::Empty);
        }
        let upper = trimmed.to_ascii_uppercase();
        let (body, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim_end(), Some(false))
        } else if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim_end(), Some(true))
        } else {
            (upper.as_str(), None)
        };

        let (h, m) = body
            .split_once(':')
            .ok_or_else(|| ClockError::Malformed(trimmed.to_string()))?;
        let hour: u8 = h
            .trim()
            .parse()
            .map_err(|_| ClockError::Malformed(trimmed.to_string()))?;
        let minute: u8 = m
            .trim()
            .parse()
            .map_err(|_| ClockError::Malformed(trimmed.to_string()))?;
        if minute > 59 {
            return Err(ClockError::OutOfRange(trimmed.to_string()));
        }

        let hour24 = match meridiem {
            Some(pm) => {
                if !(1..=12).contains(&hour) {
                    return Err(ClockError::OutOfRange(trimmed.to_string()));
                }
                hour % 12 + if pm { 12 } else { 0 }
            }
            None => {
                if hour > 23 {
                    return Err(ClockError::OutOfRange(trimmed.to_string()));
                }
                hour
            }
        };
        Ok(Self::hm(hour24, minute))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.hour();
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let h12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{}:{:02} {}", h12, self.minute(), suffix)
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fold a minute difference into (-720, 720].
pub fn wrap_delta(delta: i32) -> i32 {
    let wrapped = delta.rem_euclid(MINUTES_PER_DAY);
    if wrapped > HALF_DAY {
        wrapped - MINUTES_PER_DAY
    } else {
        wrapped
    }
}

// --- Dial geometry ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Screen-space point at `radius` from `center`; angle 0 is straight up and
/// grows clockwise (y axis points down).
pub fn polar_to_cartesian(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = (angle_deg - 90.0).to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Inverse of [`polar_to_cartesian`]: angle of `p` around `center` in `[0, 360)`.
pub fn angle_from_center(center: Point, p: Point) -> f64 {
    let deg = (p.y - center.y).atan2(p.x - center.x).to_degrees() + 90.0;
    deg.rem_euclid(360.0)
}

/// Circular drop area of the clock face in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dial {
    pub center: Point,
    pub radius: f64,
}

impl Dial {
    /// Dial inscribed in a bounding box (as returned by `getBoundingClientRect`).
    pub fn from_box(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            center: Point::new(left + width / 2.0, top + height / 2.0),
            radius: width / 2.0,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.center.distance_to(p) <= self.radius
    }

    pub fn angle_of(&self, p: Point) -> f64 {
        angle_from_center(self.center, p)
    }

    /// Clock time under `p`, or `None` outside the face.
    pub fn time_at(&self, p: Point) -> Option<ClockTime> {
        self.contains(p).then(|| ClockTime::from_angle(self.angle_of(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_twelve_hour_times() {
        assert_eq!(ClockTime::parse("1:10 PM").unwrap(), ClockTime::hm(13, 10));
        assert_eq!(ClockTime::parse("12:05 AM").unwrap(), ClockTime::hm(0, 5));
        assert_eq!(ClockTime::parse("12:00 PM").unwrap(), ClockTime::hm(12, 0));
        assert_eq!(ClockTime::parse(" 9:45am ").unwrap(), ClockTime::hm(9, 45));
    }

    #[test]
    fn parses_twenty_four_hour_times() {
        assert_eq!(ClockTime::parse("23:59").unwrap(), ClockTime::hm(23, 59));
        assert_eq!(ClockTime::parse("00:00").unwrap(), ClockTime::MIDNIGHT);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ClockTime::parse(""), Err(ClockError::Empty));
        assert!(matches!(ClockTime::parse("noon"), Err(ClockError::Malformed(_))));
        assert!(matches!(ClockTime::parse("13:10 PM"), Err(ClockError::OutOfRange(_))));
        assert!(matches!(ClockTime::parse("10:75"), Err(ClockError::OutOfRange(_))));
        assert!(matches!(ClockTime::parse("24:00"), Err(ClockError::OutOfRange(_))));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for t in [ClockTime::hm(0, 0), ClockTime::hm(11, 15), ClockTime::hm(12, 0), ClockTime::hm(19, 45)] {
            assert_eq!(ClockTime::parse(&t.to_string()).unwrap(), t);
        }
        assert_eq!(ClockTime::hm(14, 0).to_string(), "2:00 PM");
        assert_eq!(ClockTime::hm(0, 7).to_string(), "12:07 AM");
    }

    #[test]
    fn minutes_until_wraps_midnight() {
        let late = ClockTime::hm(23, 30);
        let early = ClockTime::hm(0, 30);
        assert_eq!(late.minutes_until(early), 60);
        assert_eq!(early.minutes_until(late), -60);
        assert_eq!(wrap_delta(720), 720);
        assert_eq!(wrap_delta(-720), 720);
        assert_eq!(wrap_delta(-721), 719);
    }

    #[test]
    fn angles_map_onto_the_day() {
        assert_eq!(ClockTime::from_angle(0.0), ClockTime::MIDNIGHT);
        assert_eq!(ClockTime::from_angle(90.0), ClockTime::hm(6, 0));
        assert_eq!(ClockTime::from_angle(180.0), ClockTime::hm(12, 0));
        assert_eq!(ClockTime::from_angle(-90.0), ClockTime::hm(18, 0));
        assert_eq!(ClockTime::from_angle(359.99), ClockTime::MIDNIGHT);
        assert!((ClockTime::hm(18, 0).angle() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn polar_and_angle_are_inverse() {
        let c = Point::new(300.0, 300.0);
        for deg in [0.0, 45.0, 135.0, 200.0, 310.0] {
            let p = polar_to_cartesian(c, 270.0, deg);
            assert!((angle_from_center(c, p) - deg).abs() < 1e-9);
        }
        let top = polar_to_cartesian(c, 100.0, 0.0);
        assert!((top.x - 300.0).abs() < 1e-9 && (top.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn dial_hit_testing() {
        let dial = Dial::from_box(100.0, 50.0, 400.0, 400.0);
        assert_eq!(dial.center, Point::new(300.0, 250.0));
        assert_eq!(dial.time_at(Point::new(500.0, 250.0)), Some(ClockTime::hm(6, 0)));
        assert_eq!(dial.time_at(Point::new(300.0, 449.0)), Some(ClockTime::hm(12, 0)));
        assert_eq!(dial.time_at(Point::new(520.0, 250.0)), None);
    }
}
