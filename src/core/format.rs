//! Display scaling for on-chain amounts

use alloy_primitives::{I256, U256};

/// Symbol appended to ether amounts
pub const ETHER_TAG: &str = "ΞTH";

/// Decimal places shown for ether and token amounts
pub const AMOUNT_PLACES: u32 = 5;

/// Wei per ether
pub fn wei_per_ether() -> U256 {
    U256::from(1_000_000_000_000_000_000u64)
}

/// `value / divisor` with `places` decimals, rounded half up, grouped by
/// thousands (e.g. `1,234.50000`)
///
/// A zero divisor is treated as one.
pub fn format_scaled(value: U256, divisor: U256, places: u32) -> String {
    let divisor = if divisor.is_zero() { U256::from(1) } else { divisor };
    let scale = U256::from(10u64).pow(U256::from(places));

    let mut whole = value / divisor;
    let rem = value % divisor;

    let mut frac = match rem.checked_mul(scale) {
        Some(numerator) => {
            let quotient = numerator / divisor;
            let remainder = numerator % divisor;
            // remainder * 2 >= divisor, without overflowing
            if remainder >= divisor - remainder {
                quotient + U256::from(1)
            } else {
                quotient
            }
        }
        None => rem / (divisor / scale),
    };

    if frac >= scale {
        whole += U256::from(1);
        frac -= scale;
    }

    let whole = group_thousands(&whole.to_string());
    if places == 0 {
        whole
    } else {
        format!("{whole}.{frac:0>width$}", frac = frac.to_string(), width = places as usize)
    }
}

/// Ether amount with five decimals and the ether symbol
pub fn format_ether(wei: U256) -> String {
    format!("{}{}", format_scaled(wei, wei_per_ether(), AMOUNT_PLACES), ETHER_TAG)
}

/// Unsigned integer grouped by thousands
pub fn format_integer(value: U256) -> String {
    group_thousands(&value.to_string())
}

/// Signed integer grouped by thousands
pub fn format_signed(value: I256) -> String {
    let text = value.to_string();
    match text.strip_prefix('-') {
        Some(digits) => format!("-{}", group_thousands(digits)),
        None => group_thousands(&text),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_scaled() {
        assert_eq!(format_scaled(U256::from(500), U256::from(100), 5), "5.00000");
        assert_eq!(format_scaled(U256::from(1), U256::from(3), 5), "0.33333");
        assert_eq!(format_scaled(U256::from(2), U256::from(3), 5), "0.66667");
        assert_eq!(format_scaled(U256::ZERO, U256::from(100), 5), "0.00000");
        assert_eq!(format_scaled(U256::from(7), U256::ZERO, 2), "7.00");
    }

    #[test]
    fn test_rounding_carries() {
        // 0.999999 rounds up to 1.00000
        assert_eq!(
            format_scaled(U256::from(999_999), U256::from(1_000_000), 5),
            "1.00000"
        );
        assert_eq!(format_scaled(U256::from(25), U256::from(10), 0), "3");
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(wei_per_ether()), "1.00000ΞTH");
        assert_eq!(
            format_ether(wei_per_ether() * U256::from(1234) + wei_per_ether() / U256::from(2)),
            "1,234.50000ΞTH"
        );
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_integer(U256::from(0)), "0");
        assert_eq!(format_integer(U256::from(999)), "999");
        assert_eq!(format_integer(U256::from(1000)), "1,000");
        assert_eq!(format_integer(U256::from(21_000_000)), "21,000,000");
        assert_eq!(format_signed(I256::try_from(-1_234_567i64).unwrap()), "-1,234,567");
    }

    #[test]
    fn test_huge_divisor() {
        let value = U256::MAX;
        // must not overflow
        let text = format_scaled(value, U256::MAX, 5);
        assert_eq!(text, "1.00000");
    }
}
