// Conversion between field values and decimal fractions of the field range.
//
// Only fields with a fixed value set starting at zero can be converted. A
// value v of a field with maximum m is the fraction v / (m + 1), truncated to
// nine significant digits, so the fraction is always in [0, 1).

// used for decimal numbers of arbitrary size
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

use std::num::NonZeroU64;

use crate::error::{FieldRuleError, Result};
use crate::rule::FieldRule;

const FRACTION_DIGITS: u64 = 9;

impl FieldRule {
    fn check_fractional(&self, action: &str) -> Result<BigDecimal> {
        if !self.is_fixed_value_set() {
            return Err(self.unsupported(format!(
                "The fractional value of {} cannot be {action} as the range is not fixed",
                self.name()
            )));
        }
        if self.minimum_value() != 0 {
            return Err(self.unsupported(format!(
                "The fractional value of {} cannot be {action} as the minimum field value is not zero",
                self.name()
            )));
        }
        Ok(BigDecimal::from(i64::from(self.maximum_value()) + 1))
    }

    /// Converts a value to a fraction between 0 (inclusive) and 1 (exclusive).
    ///
    /// For example the second of minute 15 is 0.25.
    pub fn to_fraction(&self, value: i32) -> Result<BigDecimal> {
        let range = self.check_fractional("obtained")?;
        self.check_value(value)?;
        let digits = NonZeroU64::new(FRACTION_DIGITS).unwrap_or(NonZeroU64::MIN);
        let fraction = BigDecimal::from(i64::from(value)) / range;
        Ok(fraction.with_precision_round(digits, RoundingMode::Floor))
    }

    /// Converts a fraction between 0 (inclusive) and 1 (exclusive) to a value.
    ///
    /// The fraction must be an exact multiple of the field granularity, or the
    /// truncated form of one as produced by [`FieldRule::to_fraction`].
    ///
    /// Nine digits tell apart at most 10^9 values, so `from_fraction` undoes
    /// `to_fraction` only for ranges up to that size. Wider ranges come back
    /// as the lowest value sharing the truncated fraction.
    pub fn from_fraction(&self, fraction: &BigDecimal) -> Result<i32> {
        let range = self.check_fractional("converted")?;
        let malformed = || FieldRuleError::MalformedFraction {
            id: self.id().to_owned(),
            fraction: fraction.to_string(),
        };
        let product = fraction * &range;
        // a truncated fraction lands just below the value it came from
        let candidate = product.with_scale_round(0, RoundingMode::Ceiling);
        let value = candidate.to_i64().ok_or_else(malformed)?;
        let value = self.check_value(value).map_err(|_| malformed())?;
        if product.is_integer() || self.to_fraction(value)? == *fraction {
            Ok(value)
        } else {
            Err(malformed())
        }
    }
}
