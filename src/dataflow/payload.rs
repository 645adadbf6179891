//! Parsing of literal pin and parameter values.
//!
//! Values travel as text. Parsing is forgiving: a value that does not parse
//! maps to a neutral default instead of an error, so one bad publish never
//! wedges a handler.

/// `true` iff the value is the token `true`, ignoring ASCII case.
pub fn parse_bool(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

/// Leading decimal integer of `s`, after optional whitespace and sign.
///
/// Trailing garbage is ignored and a value without digits is `0`; out of range
/// values saturate.
///
/// ```
/// use pinwire::dataflow::payload::parse_int;
///
/// assert_eq!(parse_int("42"), 42);
/// assert_eq!(parse_int("  -7px"), -7);
/// assert_eq!(parse_int("abc"), 0);
/// ```
pub fn parse_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }
    if negative { value.saturating_neg() } else { value }
}

/// Non-negative millisecond period; negative or missing values are `0`.
pub fn parse_period(s: &str) -> u64 {
    u64::try_from(parse_int(s)).unwrap_or(0)
}
