//! Shared integer-literal grammar: `[+-]?(decimal|0[xX]hex|0[oO]octal)`.
//!
//! Used both by the XML loader (where a parse failure is a load-time
//! structural error, 32) and by `READ int` (where a parse failure yields
//! `nil` rather than an error).

pub fn parse_ippcode_int(s: &str) -> Option<i64> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else {
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse::<i64>().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_hex_and_octal() {
        assert_eq!(parse_ippcode_int("42"), Some(42));
        assert_eq!(parse_ippcode_int("-42"), Some(-42));
        assert_eq!(parse_ippcode_int("+42"), Some(42));
        assert_eq!(parse_ippcode_int("0x1F"), Some(31));
        assert_eq!(parse_ippcode_int("0X1f"), Some(31));
        assert_eq!(parse_ippcode_int("0o17"), Some(15));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_ippcode_int("abc"), None);
        assert_eq!(parse_ippcode_int(""), None);
        assert_eq!(parse_ippcode_int("0x"), None);
        assert_eq!(parse_ippcode_int("12.5"), None);
        assert_eq!(parse_ippcode_int("1 2"), None);
    }
}
