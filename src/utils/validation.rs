//! Utilidades de validación
//!
//! Validadores `custom` y expresiones regulares para `validator`: textos en
//! blanco, montos decimales, teléfonos y números de pasaporte. Los montos
//! deben caber en su columna NUMERIC.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Dígitos con prefijo `+` opcional y separadores habituales
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 .-]{5,19}$").unwrap();
    /// Alfanumérico en mayúsculas, 5 a 20 caracteres
    pub static ref PASSPORT_REGEX: Regex = Regex::new(r"^[A-Z0-9]{5,20}$").unwrap();
}

/// Validar que un string no esté vacío ni sea solo espacios
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un monto no sea negativo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un monto sea estrictamente positivo
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// ¿Cabe `value` en una columna `NUMERIC(precision, scale)`?
pub fn fits_numeric(value: &Decimal, precision: u32, scale: u32) -> bool {
    let value = value.normalize();
    if value.scale() > scale {
        return false;
    }
    let limit = Decimal::from(10u64.pow(precision - scale));
    value.abs() < limit
}

/// Monto no negativo de `NUMERIC(12, 2)`
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(value)?;
    if !fits_numeric(value, 12, 2) {
        let mut error = ValidationError::new("money_precision");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Tasa de cambio positiva de `NUMERIC(12, 4)`
pub fn validate_exchange_rate(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)?;
    if !fits_numeric(value, 12, 4) {
        let mut error = ValidationError::new("rate_precision");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Hotel Al Haram").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_phone_and_passport_patterns() {
        assert!(PHONE_REGEX.is_match("+212 600-123456"));
        assert!(PHONE_REGEX.is_match("0661234567"));
        assert!(!PHONE_REGEX.is_match("call me"));
        assert!(PASSPORT_REGEX.is_match("AB1234567"));
        assert!(!PASSPORT_REGEX.is_match("ab12"));
    }

    #[test]
    fn test_amount_validators() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(375, 2)).is_ok());
    }

    #[test]
    fn test_amounts_must_fit_their_column() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();
        assert!(fits_numeric(&dec("9999999999.99"), 12, 2));
        assert!(fits_numeric(&dec("800.000"), 12, 2));
        assert!(!fits_numeric(&dec("10000000000"), 12, 2));
        assert!(!fits_numeric(&dec("800.005"), 12, 2));

        assert!(validate_money(&dec("7750.50")).is_ok());
        assert!(validate_money(&dec("0.001")).is_err());
        assert!(validate_money(&dec("-1")).is_err());
        assert!(validate_exchange_rate(&dec("3.7512")).is_ok());
        assert!(validate_exchange_rate(&dec("3.75125")).is_err());
        assert!(validate_exchange_rate(&dec("100000000")).is_err());
    }
}
