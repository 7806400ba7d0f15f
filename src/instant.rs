// edn-codec - RFC 3339 instant parsing
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Parsing and rendering of `#inst` timestamps.
//!
//! An `#inst` payload is an RFC 3339 style timestamp in which everything
//! after the year is optional:
//!
//! ```text
//! yyyy[-MM[-dd[Thh[:mm[:ss[.f{1,9}]]]]]][Z|(+|-)hh:mm]
//! ```
//!
//! [`parse`] decomposes such a string into a [`ParsedInstant`] without
//! committing to any particular date-time library; converting the fields
//! into a richer representation is the job of whatever tag handler the
//! embedding application registers for `#inst`.

use crate::error::{EdnError, Result};

/// The decomposed fields of an `#inst` timestamp.
///
/// Omitted fields carry their defaults: month and day default to 1, all
/// time fields to 0. `offset_sign` is -1, 0 or 1, where 0 means the
/// timestamp had no offset (or `Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParsedInstant {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
    pub nanoseconds: i32,
    pub offset_sign: i32,
    pub offset_hours: i32,
    pub offset_minutes: i32,
}

/// Parse an `#inst` payload, enforcing the RFC 3339 field ranges.
pub fn parse(value: &str) -> Result<ParsedInstant> {
    let mut c = Cursor::new(value);

    let years = c.digits(4).ok_or_else(|| cant_parse(value))? as i32;
    let mut months = 1;
    let mut days = 1;
    let mut hours = 0;
    let mut minutes = 0;
    let mut seconds = 0;
    let mut nanoseconds = 0;

    if c.eat('-') {
        months = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
        // A '-' here is a day only if it is not the hour part of a
        // negative offset ("-hh:").
        if c.peek() == Some('-') && c.peek_at(3) != Some(':') {
            c.eat('-');
            days = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
            if c.eat('T') {
                hours = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
                if c.eat(':') {
                    minutes = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
                    if c.eat(':') {
                        seconds = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
                        if c.eat('.') {
                            let frac = c.digit_run(9).ok_or_else(|| cant_parse(value))?;
                            nanoseconds = pad_nanoseconds(&frac);
                        }
                    }
                }
            }
        }
    }

    let mut offset_sign = 0;
    let mut offset_hours = 0;
    let mut offset_minutes = 0;
    if c.eat('Z') {
        // UTC, sign stays 0
    } else if let Some(sign) = c.eat_sign() {
        offset_sign = sign;
        offset_hours = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
        if !c.eat(':') {
            return Err(cant_parse(value));
        }
        offset_minutes = c.digits(2).ok_or_else(|| cant_parse(value))? as i32;
    }

    if !c.at_end() {
        return Err(cant_parse(value));
    }

    // Extra-grammatical restrictions from RFC 3339.
    if !(1..=12).contains(&months) {
        return Err(field_error("month", months, value));
    }
    if days < 1 || days > days_in_month(months, is_leap_year(years)) {
        return Err(field_error("day", days, value));
    }
    if !(0..=23).contains(&hours) {
        return Err(field_error("hour", hours, value));
    }
    if !(0..=59).contains(&minutes) {
        return Err(field_error("minute", minutes, value));
    }
    let max_seconds = if minutes == 59 { 60 } else { 59 };
    if seconds < 0 || seconds > max_seconds {
        return Err(field_error("second", seconds, value));
    }
    if !(0..=23).contains(&offset_hours) {
        return Err(field_error("offset hour", offset_hours, value));
    }
    if !(0..=59).contains(&offset_minutes) {
        return Err(field_error("offset minute", offset_minutes, value));
    }

    Ok(ParsedInstant {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
        nanoseconds,
        offset_sign,
        offset_hours,
        offset_minutes,
    })
}

/// Render the canonical `#inst` payload for a parsed instant.
pub fn to_rfc3339(pi: &ParsedInstant) -> String {
    let mut s = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}",
        pi.years, pi.months, pi.days, pi.hours, pi.minutes, pi.seconds, pi.nanoseconds
    );
    if pi.offset_sign == 0 {
        s.push('Z');
    } else {
        let sign = if pi.offset_sign < 0 { '-' } else { '+' };
        s.push(sign);
        s.push_str(&format!("{:02}:{:02}", pi.offset_hours, pi.offset_minutes));
    }
    s
}

fn cant_parse(value: &str) -> EdnError {
    EdnError::syntax(format!("Can't parse \"{}\"", value))
}

fn field_error(label: &str, n: i32, value: &str) -> EdnError {
    EdnError::syntax(format!(
        "'{:02}' is not a valid {} in '{}'",
        n, label, value
    ))
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn days_in_month(month: i32, leap: bool) -> i32 {
    const DAYS_IN_MONTH: [i32; 24] = [
        31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31, // non-leap year
        31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31, // leap year
    ];
    DAYS_IN_MONTH[(month - 1 + if leap { 12 } else { 0 }) as usize]
}

/// Right-pad a 1..=9 digit fraction to nanoseconds.
fn pad_nanoseconds(frac: &str) -> i32 {
    let mut n: i32 = frac.parse().unwrap_or(0);
    for _ in frac.len()..9 {
        n *= 10;
    }
    n
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|b| *b as char)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.bytes.get(self.pos + offset).map(|b| *b as char)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_sign(&mut self) -> Option<i32> {
        match self.peek() {
            Some('+') => {
                self.pos += 1;
                Some(1)
            }
            Some('-') => {
                self.pos += 1;
                Some(-1)
            }
            _ => None,
        }
    }

    /// Exactly `n` ASCII digits.
    fn digits(&mut self, n: usize) -> Option<u32> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return None;
        }
        let mut value = 0u32;
        for &b in &self.bytes[self.pos..end] {
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
        }
        self.pos = end;
        Some(value)
    }

    /// A run of 1..=max ASCII digits, returned as text.
    fn digit_run(&mut self, max: usize) -> Option<String> {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && self.pos - start < max
            && self.bytes[self.pos].is_ascii_digit()
        {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
