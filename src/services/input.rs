use super::compute::MAX_SAFE_INPUT;
use thiserror::Error;

/// Reasons a raw input string is refused before any computation starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter a number")]
    Empty,

    #[error("'{0}' is not a non-negative whole number")]
    NotANumber(String),

    #[error("{value} is too large (maximum is {max})")]
    OutOfRange { value: u64, max: u32 },
}

/// Validates and parses the text of the numeric input field.
///
/// The limit is clamped to [`MAX_SAFE_INPUT`] so that an accepted input can
/// never overflow the `u64` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCollector {
    max_input: u32,
}

impl InputCollector {
    pub fn new(max_input: u32) -> Self {
        Self {
            max_input: max_input.min(MAX_SAFE_INPUT),
        }
    }

    /// Effective upper bound (inclusive)
    pub fn max_input(&self) -> u32 {
        self.max_input
    }

    /// Parse `raw` into an input number.
    ///
    /// Surrounding whitespace is ignored. Empty or blank input yields
    /// [`InputError::Empty`].
    pub fn parse(&self, raw: &str) -> Result<u32, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }

        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::NotANumber(trimmed.to_string()));
        }

        // All digits: the only way parsing fails now is a value beyond u64
        let value: u64 = trimmed.parse().unwrap_or(u64::MAX);

        if value > u64::from(self.max_input) {
            return Err(InputError::OutOfRange {
                value,
                max: self.max_input,
            });
        }

        Ok(value as u32)
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new(MAX_SAFE_INPUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let collector = InputCollector::new(1000);
        assert_eq!(collector.parse("2"), Ok(2));
        assert_eq!(collector.parse("0"), Ok(0));
        assert_eq!(collector.parse("  20 \n"), Ok(20));
        assert_eq!(collector.parse("1000"), Ok(1000));
    }

    #[test]
    fn test_parse_empty_and_blank() {
        let collector = InputCollector::default();
        assert_eq!(collector.parse(""), Err(InputError::Empty));
        assert_eq!(collector.parse("   "), Err(InputError::Empty));
        assert_eq!(collector.parse("\t\n"), Err(InputError::Empty));
    }

    #[test]
    fn test_parse_not_a_number() {
        let collector = InputCollector::default();
        assert!(matches!(collector.parse("abc"), Err(InputError::NotANumber(_))));
        assert!(matches!(collector.parse("-5"), Err(InputError::NotANumber(_))));
        assert!(matches!(collector.parse("+5"), Err(InputError::NotANumber(_))));
        assert!(matches!(collector.parse("1.5"), Err(InputError::NotANumber(_))));
        assert!(matches!(collector.parse("1 2"), Err(InputError::NotANumber(_))));
    }

    #[test]
    fn test_parse_out_of_range() {
        let collector = InputCollector::new(100);
        assert_eq!(
            collector.parse("101"),
            Err(InputError::OutOfRange { value: 101, max: 100 })
        );

        // Longer than any u64
        let huge = "9".repeat(40);
        assert!(matches!(
            collector.parse(&huge),
            Err(InputError::OutOfRange { value: u64::MAX, max: 100 })
        ));
    }

    #[test]
    fn test_max_input_clamped() {
        let collector = InputCollector::new(u32::MAX);
        assert_eq!(collector.max_input(), MAX_SAFE_INPUT);
        assert!(collector.parse(&MAX_SAFE_INPUT.to_string()).is_ok());
        assert!(collector.parse(&(MAX_SAFE_INPUT + 1).to_string()).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(InputError::Empty.to_string(), "Please enter a number");
        assert_eq!(
            InputError::OutOfRange { value: 5, max: 4 }.to_string(),
            "5 is too large (maximum is 4)"
        );
    }
}
