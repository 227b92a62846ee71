//! Boot-monitor flavoured integer parsing.
//!
//! Config files and environment variables are parsed the way the boot monitor
//! has always parsed them: leading digits win and trailing garbage is ignored
//! ([simple_strtoul]), unless the caller asks for a strict parse
//! ([strict_strtoul]) where the whole string has to be a number.

/// Value of `c` as a digit in `base`, if it is one.
fn digit_value(c: u8, base: u32) -> Option<u64> {
    let value = match c {
        b'0'..=b'9' => (c - b'0') as u32,
        b'a'..=b'z' => (c - b'a') as u32 + 10,
        b'A'..=b'Z' => (c - b'A') as u32 + 10,
        _ => return None,
    };
    if value < base { Some(value as u64) } else { None }
}

/// Parse leading digits of `s` in `base`.
///
/// A base of `16` (or `0`) accepts an optional `0x`/`0X` prefix; a base of `0`
/// picks hex for `0x`, octal for a leading `0` and decimal otherwise.
///
/// Returns the value and the number of bytes consumed. When no digit is found
/// the value is `0` and nothing is consumed.
pub fn simple_strtoul(s: &str, base: u32) -> (u64, usize) {
    let bytes = s.as_bytes();
    let mut base = base;
    let mut pos = 0;
    let has_hex_prefix = bytes.len() > 2
        && bytes[0] == b'0'
        && (bytes[1] | 0x20) == b'x'
        && digit_value(bytes[2], 16).is_some();
    if base == 0 {
        base = if has_hex_prefix {
            16
        } else if bytes.first() == Some(&b'0') {
            8
        } else {
            10
        };
    }
    if base == 16 && has_hex_prefix {
        pos = 2;
    }
    let start = pos;
    let mut result: u64 = 0;
    while let Some(value) = bytes.get(pos).and_then(|c| digit_value(*c, base)) {
        result = result.wrapping_mul(base as u64).wrapping_add(value);
        pos += 1;
    }
    if pos == start {
        return (0, 0);
    }
    (result, pos)
}

/// Signed variant of [simple_strtoul] accepting a single leading `-`.
pub fn simple_strtol(s: &str, base: u32) -> i64 {
    match s.strip_prefix('-') {
        Some(rest) => (simple_strtoul(rest, base).0 as i64).wrapping_neg(),
        None => simple_strtoul(s, base).0 as i64,
    }
}

/// Parse a hex string, ignoring anything after the leading digits.
pub fn hextoul(s: &str) -> u64 {
    simple_strtoul(s, 16).0
}

/// Parse `s` as a whole number in `base`.
///
/// A single trailing newline is tolerated. Empty strings and strings with
/// anything other than digits are rejected.
pub fn strict_strtoul(s: &str, base: u32) -> Option<u64> {
    let s = s.strip_suffix('\n').unwrap_or(s);
    let (value, consumed) = simple_strtoul(s, base);
    if consumed == 0 || consumed != s.len() {
        return None;
    }
    Some(value)
}
