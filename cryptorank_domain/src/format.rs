//! Human-readable rendering of the numbers on the board.
//!
//! Every function here is pure. Rounding is half away from zero.

use bigdecimal::{BigDecimal, Signed, Zero};
use num_bigint::BigInt;
use num_integer::Integer;

pub const CURRENCY_SYMBOL: &str = "$";

/// Suffixes by power of ten, largest first.
const MAGNITUDES: [(i64, &str); 4] = [
    (12, "T"),
    (9, "B"),
    (6, "M"),
    (3, "K"),
];

/// Which way a 24h change points. Zero counts as `Up`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ChangeDirection {
    Up,
    Down,
}

impl ChangeDirection {
    pub fn of(change: &BigDecimal) -> ChangeDirection {
        if *change >= BigDecimal::zero() {
            ChangeDirection::Up
        } else {
            ChangeDirection::Down
        }
    }
}

/// Market cap and volume: `$1.50B`, `$2.30T`, `$999.00`.
pub fn format_magnitude(value: &BigDecimal) -> String {
    for &(exponent, suffix) in MAGNITUDES.iter() {
        if *value >= ten_to_the_decimal(exponent) {
            let quotient = shift_point_left(value, exponent);
            return format!("{}{}{}", CURRENCY_SYMBOL, to_fixed(&quotient, 2), suffix);
        }
    }

    format!("{}{}", CURRENCY_SYMBOL, to_fixed(value, 2))
}

/// Prices of a dollar or more get grouping and cents; anything smaller keeps
/// four fractional digits so sub-cent assets stay readable.
pub fn format_price(price: &BigDecimal) -> String {
    if *price >= BigDecimal::from(1) {
        format!("{}{}", CURRENCY_SYMBOL, group_thousands(&to_fixed(price, 2)))
    } else {
        format!("{}{}", CURRENCY_SYMBOL, to_fixed(price, 4))
    }
}

/// `+1.23%` / `-3.46%`. The sign always agrees with [`ChangeDirection::of`].
pub fn format_change(change: &BigDecimal) -> String {
    let digits = to_fixed(change, 2);
    match ChangeDirection::of(change) {
        ChangeDirection::Up => format!("+{}%", digits),
        // -0.001 rounds to zero, which prints unsigned
        ChangeDirection::Down if !digits.starts_with('-') => format!("-{}%", digits),
        ChangeDirection::Down => format!("{}%", digits),
    }
}

/// Renders with exactly `digits` fractional digits.
pub fn to_fixed(value: &BigDecimal, digits: i64) -> String {
    round_half_away_from_zero(value, digits).to_string()
}

fn round_half_away_from_zero(value: &BigDecimal, digits: i64) -> BigDecimal {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    if scale <= digits {
        return value.with_scale(digits);
    }

    let divisor = ten_to_the((scale - digits) as u64);
    let (quotient, remainder) = mantissa.div_rem(&divisor);

    let rounded = if remainder.abs() * 2u32 >= divisor {
        if mantissa.is_negative() { quotient - 1u32 } else { quotient + 1u32 }
    } else {
        quotient
    };

    BigDecimal::new(rounded, digits)
}

fn shift_point_left(value: &BigDecimal, places: i64) -> BigDecimal {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    BigDecimal::new(mantissa, scale + places)
}

fn ten_to_the_decimal(exponent: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -exponent)
}

// Source: `bigdecimal/lib.rs`
fn ten_to_the(pow: u64) -> BigInt {
    if pow < 20 {
        BigInt::from(10u64.pow(pow as u32))
    } else {
        let (half, rem) = pow.div_rem(&16);

        let mut x = ten_to_the(half);

        for _ in 0..4 {
            x = &x * &x;
        }

        if rem == 0 {
            x
        } else {
            x * ten_to_the(rem)
        }
    }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };

    let (integer, fraction) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}{}", sign, grouped, fraction)
}
