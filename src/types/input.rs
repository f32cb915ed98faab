//! Raw form submission

use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};

/// One form submission, exactly as entered.
///
/// Integer fields are wide on purpose so out-of-range values reach
/// [`RawInput::validate`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    /// Transaction amount in dollars
    #[serde(alias = "amt")]
    pub amount: f64,

    /// Hour of day (0-23)
    pub hour: i64,

    /// Day of month (1-31)
    pub day: i64,

    /// Month (1-12)
    pub month: i64,

    /// Customer age in years (0-120)
    pub age: i64,

    /// Gender display value ("Male" / "Female")
    pub gender: String,

    /// Category display value, e.g. "Grocery (POS)"
    pub category: String,

    /// State display value, e.g. "California"
    pub state: String,
}

impl RawInput {
    /// Check numeric fields against the ranges the form widgets enforce.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(FormError::InputOutOfRange {
                field: "amount",
                value: self.amount,
                min: 0.0,
                max: f64::INFINITY,
            });
        }

        check_range("hour", self.hour, 0, 23)?;
        check_range("day", self.day, 1, 31)?;
        check_range("month", self.month, 1, 12)?;
        check_range("age", self.age, 0, 120)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FormError::InputOutOfRange {
            field,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        })
    }
}

impl Default for RawInput {
    /// The values the form shows before the user touches anything.
    fn default() -> Self {
        Self {
            amount: 100.0,
            hour: 12,
            day: 1,
            month: 1,
            age: 30,
            gender: "Male".to_string(),
            category: "Food & Dining".to_string(),
            state: "Alabama".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RawInput::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_fields() {
        let mut input = RawInput {
            hour: 24,
            ..RawInput::default()
        };
        assert!(matches!(
            input.validate(),
            Err(FormError::InputOutOfRange { field: "hour", .. })
        ));

        input.hour = 23;
        input.day = 0;
        assert!(matches!(
            input.validate(),
            Err(FormError::InputOutOfRange { field: "day", .. })
        ));

        input.day = 31;
        input.age = 121;
        assert!(matches!(
            input.validate(),
            Err(FormError::InputOutOfRange { field: "age", .. })
        ));
    }

    #[test]
    fn test_negative_or_nan_amount_rejected() {
        let negative = RawInput {
            amount: -0.01,
            ..RawInput::default()
        };
        assert!(negative.validate().is_err());

        let nan = RawInput {
            amount: f64::NAN,
            ..RawInput::default()
        };
        assert!(nan.validate().is_err());

        let zero = RawInput {
            amount: 0.0,
            ..RawInput::default()
        };
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_form_defaults() {
        let input: RawInput =
            serde_json::from_str(r#"{"amt": 750.5, "state": "Texas"}"#).unwrap();
        assert_eq!(input.amount, 750.5);
        assert_eq!(input.state, "Texas");
        assert_eq!(input.hour, 12);
        assert_eq!(input.category, "Food & Dining");
    }
}
