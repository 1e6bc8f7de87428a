use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::MoneyError;

/// A whole-number amount expressed in base units (e.g. mutez), as it appears
/// on the wire and in balances returned by the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUnit(BigInt);

/// An amount expressed in display units (e.g. tez), with up to the full
/// 10^6 base-unit precision of fractional digits.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUnit(BigDecimal);

/// Ratio between a display unit and its base unit: 1 display unit = 10^6 base units.
const SCALE: i64 = 6;

impl BaseUnit {
    /// Parses a base-unit decimal string. The value must be an integer; a
    /// fractional base-unit amount is never meaningful.
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        let decimal = BigDecimal::from_str(text)
            .map_err(|_| MoneyError::InvalidQuantity(text.to_string()))?;
        if !decimal.is_integer() {
            return Err(MoneyError::InvalidQuantity(text.to_string()));
        }
        Ok(BaseUnit(to_bigint(&decimal)))
    }

    pub fn add(&self, other: &Self) -> Self {
        BaseUnit(&self.0 + &other.0)
    }

    /// Renders the integer base-unit form, e.g. `"1500000"`.
    pub fn print(&self) -> String {
        self.0.to_string()
    }

    /// Converts to the equivalent display-unit amount. Exact: dividing by
    /// 10^6 never loses precision.
    pub fn to_display(&self) -> DisplayUnit {
        DisplayUnit(BigDecimal::new(self.0.clone(), SCALE))
    }
}

impl DisplayUnit {
    /// Parses a display-unit decimal string, e.g. `"1.5"`.
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        let decimal = BigDecimal::from_str(text)
            .map_err(|_| MoneyError::InvalidQuantity(text.to_string()))?;
        Ok(DisplayUnit(decimal))
    }

    /// Renders the display-unit form with exactly 6 fractional digits, e.g. `"1.500000"`.
    pub fn print(&self) -> String {
        self.0.with_scale(SCALE).to_string()
    }

    /// Converts to the equivalent base-unit amount. Fails rather than round
    /// if the value carries more than 6 fractional digits of precision.
    pub fn to_base(&self) -> Result<BaseUnit, MoneyError> {
        let scaled = &self.0 * BigDecimal::from(10i64.pow(SCALE as u32));
        if !scaled.is_integer() {
            return Err(MoneyError::Precision(self.print()));
        }
        Ok(BaseUnit(to_bigint(&scaled)))
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

/// Rescales `decimal` to an integral `BigDecimal` and lifts its digits out as
/// a `BigInt`. Caller must have already verified `decimal.is_integer()`.
fn to_bigint(decimal: &BigDecimal) -> BigInt {
    let normalized = decimal.with_scale(0);
    BigInt::from_str(&normalized.to_string()).expect("integral BigDecimal always parses as BigInt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_to_display_round_trip() {
        let base = BaseUnit::parse("1500000").unwrap();
        assert_eq!(base.to_display().print(), "1.500000");
    }

    #[test]
    fn display_to_base_round_trip() {
        let display = DisplayUnit::parse("0.000001").unwrap();
        assert_eq!(display.to_base().unwrap().print(), "1");
    }

    #[test]
    fn base_must_be_integral() {
        assert!(BaseUnit::parse("1.5").is_err());
        assert!(BaseUnit::parse("abc").is_err());
    }

    #[test]
    fn display_rejects_sub_micro_precision() {
        let display = DisplayUnit::parse("0.0000001").unwrap();
        assert!(display.to_base().is_err());
    }

    #[test]
    fn add_is_exact() {
        let a = BaseUnit::parse("100").unwrap();
        let b = BaseUnit::parse("250").unwrap();
        assert_eq!(a.add(&b).print(), "350");
    }

    #[test]
    fn display_print_pads_to_six_digits() {
        let display = DisplayUnit::parse("2").unwrap();
        assert_eq!(display.print(), "2.000000");
    }
}
