//! Check helpers used by scenario bodies. Each returns
//! `HarnessError::AssertionMismatch` on failure so the scenario runner can
//! tell a failed check apart from a broken harness.

use std::fmt::Debug;

use super::errors::HarnessError;

pub fn expect_eq<T: PartialEq + Debug>(
    check: &str,
    expected: T,
    actual: T,
) -> Result<(), HarnessError> {
    if expected == actual {
        Ok(())
    } else {
        Err(HarnessError::AssertionMismatch {
            check: check.to_string(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

pub fn expect_contains(check: &str, haystack: &str, needle: &str) -> Result<(), HarnessError> {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(HarnessError::AssertionMismatch {
            check: check.to_string(),
            expected: format!("contains {needle:?}"),
            actual: format!("{haystack:?}"),
        })
    }
}

pub fn expect_non_empty(check: &str, actual: &str) -> Result<(), HarnessError> {
    if !actual.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionMismatch {
            check: check.to_string(),
            expected: "non-empty string".to_string(),
            actual: "\"\"".to_string(),
        })
    }
}

pub fn expect_positive(check: &str, actual: Option<i64>) -> Result<(), HarnessError> {
    match actual {
        Some(v) if v > 0 => Ok(()),
        other => Err(HarnessError::AssertionMismatch {
            check: check.to_string(),
            expected: "a positive number".to_string(),
            actual: format!("{other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_eq() {
        assert!(expect_eq("protocolVersion", "1.3", "1.3").is_ok());
        let err = expect_eq("protocolVersion", "1.3", "1.2").unwrap_err();
        assert!(err.is_assertion());
        assert!(err.to_string().contains("protocolVersion"));
    }

    #[test]
    fn test_expect_contains() {
        assert!(expect_contains("product", "HeadlessChrome/127.0.0.0", "Chrome/").is_ok());
        assert!(expect_contains("product", "Firefox/126", "Chrome/").is_err());
    }

    #[test]
    fn test_expect_non_empty() {
        assert!(expect_non_empty("revision", "abc123").is_ok());
        assert!(expect_non_empty("revision", "").is_err());
    }

    #[test]
    fn test_expect_positive() {
        assert!(expect_positive("width", Some(1200)).is_ok());
        assert!(expect_positive("width", Some(0)).is_err());
        assert!(expect_positive("width", None).is_err());
    }
}
