//! Stateless string and display helpers.

use std::time::Duration;

/// Copy of `s` without any of the characters in `strip`.
pub fn strip_chars(s: &str, strip: &[char]) -> String {
    s.chars().filter(|c| !strip.contains(c)).collect()
}

/// Parse the leading floating-point number of `s`, `atof` style.
///
/// Leading whitespace is skipped and everything after the longest numeric
/// prefix is ignored. Returns `0.0` when no prefix parses.
pub fn parse_leading_f64(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Turn a currency string such as `"$1,234.56"` into a number.
pub fn parse_amount(raw: &str) -> f64 {
    parse_leading_f64(&strip_chars(raw, &['$', ',']))
}

/// Two-line elapsed time display: microseconds, then seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!(
        "time: {} microseconds\ntime: {} seconds",
        elapsed.as_micros(),
        elapsed.as_secs_f64()
    )
}
