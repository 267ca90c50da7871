use crate::errors::ServiceError;
use validator::ValidationError;

/// Enforces the currency-consistency rule: a cart's currency is fixed by its
/// first item and every further item must match it.
pub struct CurrencyGuard;

impl CurrencyGuard {
    /// Rejects anything that is not a 3-letter uppercase ISO-4217-like code
    pub fn validate_code(code: &str) -> Result<(), ServiceError> {
        if is_valid_code(code) {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!(
                "invalid currency code '{}': expected a 3-letter uppercase code",
                code
            )))
        }
    }

    /// Checks a candidate item currency against the cart's established one
    pub fn check(cart_currency: &str, candidate: &str) -> Result<(), ServiceError> {
        if cart_currency == candidate {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!(
                "currency mismatch: cart is priced in {}, item priced in {}",
                cart_currency, candidate
            )))
        }
    }
}

fn is_valid_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// `validator`-compatible wrapper used by request DTOs
pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_code(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency_code");
        err.message = Some("Must be a 3-letter uppercase currency code".into());
        Err(err)
    }
}
