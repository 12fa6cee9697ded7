//! Numeric field parsing.
//!
//! GC logs print decimals with either `.` or `,` depending on the JVM locale.
//! Everything here works on the decimal text directly so that rounding is
//! exact; anything that does not parse or overflows yields `None`.

/// Parse `text` as a non-negative decimal and scale it by `10^digits`,
/// rounding half up on the first dropped digit.
fn scaled(text: &str, digits: u32) -> Option<u64> {
    let text = text.trim();
    let (int_part, frac_part) = match text.find(['.', ',']) {
        Some(idx) => (&text[..idx], &text[idx + 1..]),
        None => (text, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut value: u64 = int_part.parse().ok()?;
    let frac = frac_part.as_bytes();
    for i in 0..digits as usize {
        let digit = frac.get(i).map(|b| u64::from(b - b'0')).unwrap_or(0);
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    if frac.get(digits as usize).is_some_and(|b| *b >= b'5') {
        value = value.checked_add(1)?;
    }
    Some(value)
}

/// `"2127.343"` (milliseconds) to microseconds.
pub(crate) fn micros_from_millis(text: &str) -> Option<u64> {
    scaled(text, 3)
}

/// `"0.0012345"` (seconds) to microseconds.
pub(crate) fn micros_from_secs(text: &str) -> Option<u64> {
    scaled(text, 6)
}

/// Nanoseconds to microseconds, rounded.
pub(crate) fn micros_from_nanos(text: &str) -> Option<u64> {
    let nanos = scaled(text, 0)?;
    Some(nanos / 1000 + u64::from(nanos % 1000 >= 500))
}

/// `"89968.517"` (seconds) to milliseconds.
pub(crate) fn millis_from_secs(text: &str) -> Option<u64> {
    scaled(text, 3)
}

/// Microseconds to milliseconds, rounded.
pub(crate) fn micros_to_millis(micros: u64) -> u64 {
    micros / 1000 + u64::from(micros % 1000 >= 500)
}

/// CPU time in seconds (`"16.40"`) to centiseconds.
pub(crate) fn centis(text: &str) -> Option<u32> {
    scaled(text, 2).and_then(|v| u32::try_from(v).ok())
}

/// Size with unit suffix (`8186M`, `3072.0K`, `0.0B`, `1 K`) to kilobytes.
pub(crate) fn kilobytes(size: &str) -> Option<u64> {
    let size = size.trim();
    let unit = size.chars().last()?;
    let factor: f64 = match unit.to_ascii_uppercase() {
        'B' => 1.0 / 1024.0,
        'K' => 1.0,
        'M' => 1024.0,
        'G' => 1024.0 * 1024.0,
        _ => return None,
    };
    let number = size[..size.len() - 1].trim().replace(',', ".");
    let value: f64 = number.parse().ok()?;
    let kb = (value * factor).round();
    if !kb.is_finite() || kb < 0.0 || kb > u64::MAX as f64 {
        return None;
    }
    Some(kb as u64)
}

/// CPU-to-wall ratio in percent, rounded up; `None` when real time is zero.
pub(crate) fn parallelism(user: u32, sys: u32, real: u32) -> Option<u32> {
    if real == 0 {
        return None;
    }
    let cpu = (u64::from(user) + u64::from(sys)) * 100;
    let real = u64::from(real);
    u32::try_from(cpu.div_ceil(real)).ok()
}

/// Percentage of `part` in `whole`, rounded half up.
pub(crate) fn percent(part: u64, whole: u64) -> Option<u64> {
    if whole == 0 {
        return None;
    }
    let scaled = u128::from(part) * 100;
    let whole = u128::from(whole);
    let rounded = (scaled * 2 + whole) / (whole * 2);
    u64::try_from(rounded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_exact() {
        assert_eq!(micros_from_millis("2127.343"), Some(2_127_343));
        assert_eq!(micros_from_millis("0.004"), Some(4));
        assert_eq!(micros_from_millis("6796,352"), Some(6_796_352));
        assert_eq!(micros_from_secs("0.0012345"), Some(1235));
        assert_eq!(micros_from_secs("4.336"), Some(4_336_000));
        assert_eq!(micros_from_nanos("1499"), Some(1));
        assert_eq!(micros_from_nanos("1500"), Some(2));
        assert_eq!(millis_from_secs("89968.517"), Some(89_968_517));
        assert_eq!(micros_to_millis(6_796_352), 6796);
    }

    #[test]
    fn malformed_numbers_are_absent() {
        assert_eq!(micros_from_millis(""), None);
        assert_eq!(micros_from_millis("1.2.3"), None);
        assert_eq!(micros_from_millis("99999999999999999999.000"), None);
        assert_eq!(centis("-1.00"), None);
        assert_eq!(kilobytes("12X"), None);
    }

    #[test]
    fn cpu_times_to_centis() {
        assert_eq!(centis("16.40"), Some(1640));
        assert_eq!(centis("0.09"), Some(9));
        assert_eq!(centis("2,13"), Some(213));
    }

    #[test]
    fn sizes_normalise_to_kilobytes() {
        assert_eq!(kilobytes("8186M"), Some(8_382_464));
        assert_eq!(kilobytes("3072.0K"), Some(3072));
        assert_eq!(kilobytes("0.0B"), Some(0));
        assert_eq!(kilobytes("2048B"), Some(2));
        assert_eq!(kilobytes("1G"), Some(1_048_576));
        assert_eq!(kilobytes("21,9M"), Some(22_426));
        assert_eq!(kilobytes("1 K"), Some(1));
    }

    #[test]
    fn parallelism_rounds_up() {
        assert_eq!(parallelism(1640, 9, 213), Some(775));
        assert_eq!(parallelism(1, 0, 1), Some(100));
        assert_eq!(parallelism(0, 0, 3), Some(0));
        assert_eq!(parallelism(5, 5, 0), None);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 2), Some(50));
        assert_eq!(percent(1, 200), Some(1));
        assert_eq!(percent(1, 201), Some(0));
        assert_eq!(percent(5, 0), None);
    }
}
