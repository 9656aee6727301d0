use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, DbErr, Value};
use validator::ValidationError;

/// Format d'email accepté pour `users.email`
pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email regex compiles")
});

/// Précision totale des colonnes DECIMAL (chiffres entiers + décimales)
pub const DECIMAL_DIGITS: u32 = 16;

// Décimales déclarées par colonne
pub const AMOUNT_PLACES: u32 = 2;
pub const PRICE_PLACES: u32 = 4;
pub const PERCENT_PLACES: u32 = 4;
pub const QUANTITY_PLACES: u32 = 6;

/// Number of significant decimal places, trailing zeros ignored.
pub fn significant_places(value: &Decimal) -> u32 {
    value.normalize().scale()
}

/// Smallest magnitude that no longer fits a `DECIMAL(16, places)` column.
pub fn column_limit(places: u32) -> Decimal {
    Decimal::from(10_i64.pow(DECIMAL_DIGITS.saturating_sub(places)))
}

fn check_places(value: &Decimal, places: u32) -> Result<(), ValidationError> {
    if significant_places(value) > places {
        let mut err = ValidationError::new("decimal_places");
        err.message = Some(Cow::Owned(format!(
            "at most {} decimal places allowed, got {}",
            places,
            significant_places(value)
        )));
        err.add_param(Cow::Borrowed("max_places"), &places);
        err.add_param(Cow::Borrowed("value"), &value.to_string());
        return Err(err);
    }

    if value.abs() >= column_limit(places) {
        let digits = DECIMAL_DIGITS - places;
        let mut err = ValidationError::new("decimal_digits");
        err.message = Some(Cow::Owned(format!(
            "at most {} digits before the decimal point allowed",
            digits
        )));
        err.add_param(Cow::Borrowed("max_digits"), &digits);
        err.add_param(Cow::Borrowed("value"), &value.to_string());
        return Err(err);
    }
    Ok(())
}

// Validateurs `custom` pour les DTO (validator appelle avec la valeur interne des Option)
pub fn amount_places(value: &Decimal) -> Result<(), ValidationError> {
    check_places(value, AMOUNT_PLACES)
}

pub fn price_places(value: &Decimal) -> Result<(), ValidationError> {
    check_places(value, PRICE_PLACES)
}

pub fn quantity_places(value: &Decimal) -> Result<(), ValidationError> {
    check_places(value, QUANTITY_PLACES)
}

/// Checks run by the entity `before_save` hooks. Errors are reported as
/// `DbErr::Custom("<table>.<column> ...")` so they surface through the ORM.
pub struct FieldCheck {
    table: &'static str,
}

impl FieldCheck {
    pub fn new(table: &'static str) -> Self {
        Self { table }
    }

    fn fail(&self, column: &str, reason: String) -> DbErr {
        DbErr::Custom(format!("{}.{} {}", self.table, column, reason))
    }

    pub fn max_len(&self, column: &str, value: &ActiveValue<String>, max: usize) -> Result<(), DbErr> {
        if let Some(v) = present(value) {
            self.len_of(column, v, max)?;
        }
        Ok(())
    }

    pub fn opt_max_len(
        &self,
        column: &str,
        value: &ActiveValue<Option<String>>,
        max: usize,
    ) -> Result<(), DbErr> {
        if let Some(Some(v)) = present(value) {
            self.len_of(column, v, max)?;
        }
        Ok(())
    }

    pub fn min_len(&self, column: &str, value: &ActiveValue<String>, min: usize) -> Result<(), DbErr> {
        if let Some(v) = present(value) {
            let len = v.chars().count();
            if len < min {
                return Err(self.fail(column, format!("needs at least {} characters (got {})", min, len)));
            }
        }
        Ok(())
    }

    fn len_of(&self, column: &str, value: &str, max: usize) -> Result<(), DbErr> {
        let len = value.chars().count();
        if len > max {
            return Err(self.fail(column, format!("exceeds {} characters (got {})", max, len)));
        }
        Ok(())
    }

    pub fn email(&self, column: &str, value: &ActiveValue<String>) -> Result<(), DbErr> {
        match present(value) {
            Some(v) if !EMAIL_RE.is_match(v) => {
                Err(self.fail(column, format!("is not a valid email address: {:?}", v)))
            }
            _ => Ok(()),
        }
    }

    pub fn places(&self, column: &str, value: &ActiveValue<Decimal>, places: u32) -> Result<(), DbErr> {
        if let Some(v) = present(value) {
            self.places_of(column, v, places)?;
        }
        Ok(())
    }

    pub fn opt_places(
        &self,
        column: &str,
        value: &ActiveValue<Option<Decimal>>,
        places: u32,
    ) -> Result<(), DbErr> {
        if let Some(Some(v)) = present(value) {
            self.places_of(column, v, places)?;
        }
        Ok(())
    }

    fn places_of(&self, column: &str, value: &Decimal, places: u32) -> Result<(), DbErr> {
        check_places(value, places).map_err(|err| {
            let reason = if err.code == "decimal_digits" {
                format!("allows {} digits before the decimal point, got {}", DECIMAL_DIGITS - places, value.normalize())
            } else {
                format!("allows {} decimal places, got {}", places, value.normalize())
            };
            self.fail(column, reason)
        })
    }
}

/// Valeur d'un champ si elle est renseignée (Set ou Unchanged)
pub fn present<V>(value: &ActiveValue<V>) -> Option<&V>
where
    V: Into<Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}
