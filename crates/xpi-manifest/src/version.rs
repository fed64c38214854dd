//! Extension-platform version ordering.
//!
//! Add-on versions are not semver. A version is a `.`-separated list of
//! parts, and every part has the shape
//!
//! ```text
//! <number-a><string-b><number-c><extra-d>
//! ```
//!
//! Parts are compared field by field: numbers numerically, strings
//! byte-wise. An absent string sorts *after* any present one, so `1.0a1`
//! (a pre-release) is lower than `1.0`. A missing part is read as `0`, which
//! makes `1.0` and `1.0.0` equal. A part of `*` is larger than any number,
//! and a trailing `+` (`1.0+`) means "pre-release of the next number"
//! (`1.1pre`).
//!
//! Numbers may be arbitrarily long. Anything that does not fit the grammar
//! ends up in `extra-d` and is compared lexically.
//!
//! ```
//! use std::cmp::Ordering;
//! use xpi_manifest::version::compare;
//!
//! assert_eq!(compare("1.0.10", "1.0.2"), Ordering::Greater);
//! assert_eq!(compare("1.0b1", "1.0"), Ordering::Less);
//! assert_eq!(compare("1.0", "1.0.0"), Ordering::Equal);
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;

/// Compare two version strings under extension-platform ordering.
///
/// Total over all inputs; malformed versions never panic or fail.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        let (l, r) = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => (l.unwrap_or(""), r.unwrap_or("")),
        };

        match VersionPart::parse(l).cmp(&VersionPart::parse(r)) {
            Ordering::Equal => continue,
            non_eq => return non_eq,
        }
    }
}

/// One `.`-separated part of a version.
#[derive(Debug, Default, PartialEq, Eq)]
struct VersionPart<'a> {
    num_a: Number<'a>,
    str_b: Option<&'a str>,
    num_c: Number<'a>,
    extra_d: Option<&'a str>,
}

impl<'a> VersionPart<'a> {
    fn parse(part: &'a str) -> Self {
        if part == "*" {
            return Self {
                num_a: Number::Infinite,
                str_b: Some(""),
                ..Self::default()
            };
        }

        let (num_a, rest) = Number::parse_prefix(part);
        if rest.is_empty() {
            return Self {
                num_a,
                ..Self::default()
            };
        }

        if rest.starts_with('+') {
            return Self {
                num_a: num_a.increment(),
                str_b: Some("pre"),
                ..Self::default()
            };
        }

        match rest.find(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
            None => Self {
                num_a,
                str_b: Some(rest),
                ..Self::default()
            },
            Some(idx) => {
                let (num_c, extra) = Number::parse_prefix(&rest[idx..]);
                Self {
                    num_a,
                    str_b: Some(&rest[..idx]),
                    num_c,
                    extra_d: (!extra.is_empty()).then_some(extra),
                }
            }
        }
    }
}

impl Ord for VersionPart<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.num_a
            .cmp(&other.num_a)
            .then_with(|| compare_optional(self.str_b, other.str_b))
            .then_with(|| self.num_c.cmp(&other.num_c))
            .then_with(|| compare_optional(self.extra_d, other.extra_d))
    }
}

impl PartialOrd for VersionPart<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An absent string is greater than any present one.
fn compare_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// An integer of any length, or `*`.
///
/// Finite values keep their magnitude as a decimal string without leading
/// zeros; zero is the empty string and is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Number<'a> {
    Finite {
        negative: bool,
        magnitude: Cow<'a, str>,
    },
    Infinite,
}

impl Default for Number<'_> {
    fn default() -> Self {
        Number::Finite {
            negative: false,
            magnitude: Cow::Borrowed(""),
        }
    }
}

impl<'a> Number<'a> {
    /// Read a leading integer (optional whitespace and sign, then digits).
    ///
    /// Without any digits the result is zero and nothing is consumed.
    fn parse_prefix(s: &'a str) -> (Self, &'a str) {
        let trimmed = s.trim_start();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digit_len = unsigned
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digit_len == 0 {
            return (Self::default(), s);
        }

        let magnitude = unsigned[..digit_len].trim_start_matches('0');
        let number = Number::Finite {
            negative: negative && !magnitude.is_empty(),
            magnitude: Cow::Borrowed(magnitude),
        };
        (number, &unsigned[digit_len..])
    }

    fn increment(self) -> Self {
        match self {
            Number::Infinite => Number::Infinite,
            Number::Finite {
                negative: false,
                magnitude,
            } => Number::Finite {
                negative: false,
                magnitude: Cow::Owned(add_one(&magnitude)),
            },
            Number::Finite {
                negative: true,
                magnitude,
            } => {
                let magnitude = subtract_one(&magnitude);
                Number::Finite {
                    negative: !magnitude.is_empty(),
                    magnitude: Cow::Owned(magnitude),
                }
            }
        }
    }
}

impl Ord for Number<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Infinite, Number::Infinite) => Ordering::Equal,
            (Number::Infinite, _) => Ordering::Greater,
            (_, Number::Infinite) => Ordering::Less,
            (
                Number::Finite {
                    negative: a_neg,
                    magnitude: a,
                },
                Number::Finite {
                    negative: b_neg,
                    magnitude: b,
                },
            ) => match (a_neg, b_neg) {
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (false, false) => compare_magnitude(a, b),
                (true, true) => compare_magnitude(b, a),
            },
        }
    }
}

impl PartialOrd for Number<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_magnitude(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// `magnitude + 1` for a decimal string without leading zeros.
fn add_one(magnitude: &str) -> String {
    let mut digits: Vec<u8> = magnitude.bytes().collect();
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return String::from_utf8_lossy(&digits).into_owned();
        }
    }
    let mut carried = String::with_capacity(digits.len() + 1);
    carried.push('1');
    carried.push_str(&String::from_utf8_lossy(&digits));
    carried
}

/// `magnitude - 1` for a non-zero decimal string without leading zeros.
fn subtract_one(magnitude: &str) -> String {
    let mut digits: Vec<u8> = magnitude.bytes().collect();
    for digit in digits.iter_mut().rev() {
        if *digit == b'0' {
            *digit = b'9';
        } else {
            *digit -= 1;
            break;
        }
    }
    String::from_utf8_lossy(&digits)
        .trim_start_matches('0')
        .to_string()
}
