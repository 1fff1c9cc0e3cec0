//! Display units: balances are integers with two implied decimals.

use crate::BalanceError;

pub const DECIMALS: u32 = 2;
const SCALE: u64 = 10u64.pow(DECIMALS);

/// `150` -> `"1.50"`.
pub fn format_amount(units: u64) -> String {
    format!("{}.{:0width$}", units / SCALE, units % SCALE, width = DECIMALS as usize)
}

/// `"1.5"` -> `150`. At most two fractional digits; no sign.
pub fn parse_amount(s: &str) -> Result<u64, BalanceError> {
    let invalid = || BalanceError::InvalidAmount(s.to_string());
    let t = s.trim();
    let (whole, frac) = match t.split_once('.') {
        Some((w, f)) => (w, f),
        None => (t, ""),
    };
    if (whole.is_empty() && frac.is_empty())
        || frac.len() > DECIMALS as usize
        || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let mut frac_units: u64 = if frac.is_empty() { 0 } else { frac.parse().map_err(|_| invalid())? };
    for _ in frac.len()..DECIMALS as usize {
        frac_units *= 10;
    }
    whole
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(BalanceError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_amount(150), "1.50");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(100_000), "1000.00");
    }

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_amount("1.5").unwrap(), 150);
        assert_eq!(parse_amount("1.50").unwrap(), 150);
        assert_eq!(parse_amount("2").unwrap(), 200);
        assert_eq!(parse_amount(".05").unwrap(), 5);
        assert_eq!(parse_amount("0").unwrap(), 0);
    }

    #[test]
    fn rejects_bad_input() {
        for bad in ["", ".", "1.234", "-1", "1e3", "abc", "1.2.3"] {
            assert!(parse_amount(bad).is_err(), "{bad}");
        }
        assert_eq!(parse_amount("184467440737095517"), Err(BalanceError::Overflow));
    }
}
