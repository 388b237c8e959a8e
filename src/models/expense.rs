use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{Category, FormError};

/// Largest accepted amount. With [`AMOUNT_SCALE`] decimals this stays within
/// the digits an `f64` carries exactly through local storage.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Decimal places an amount may carry.
pub const AMOUNT_SCALE: u32 = 2;

/// A single spending entry as held in memory and in local storage.
///
/// Local storage keeps the camelCase field names and a numeric `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Build a brand-new record from a submitted form, assigning a fresh id.
    pub fn from_form(form: ExpenseForm, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: form.title,
            amount: form.amount,
            category: form.category,
            date: form.date,
            description: form.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this record with the form's fields merged over it.
    /// `id` and `created_at` are kept.
    pub fn with_form(&self, form: &ExpenseForm, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            title: form.title.clone(),
            amount: form.amount,
            category: form.category,
            date: form.date,
            description: form.description.clone(),
            created_at: self.created_at,
            updated_at,
        }
    }
}

/// The user-editable fields of an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl ExpenseForm {
    /// Validate raw text fields into a form.
    ///
    /// Title must be non-blank and category one of the known keys. The amount
    /// must be greater than zero, at most [`MAX_AMOUNT`], with no more than
    /// [`AMOUNT_SCALE`] decimal places. Date is `YYYY-MM-DD`. A blank
    /// description becomes `None`.
    pub fn parse(
        title: &str,
        amount: &str,
        category: &str,
        date: &str,
        description: &str,
    ) -> Result<Self, FormError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }

        let amount_str = amount.trim();
        let amount = Decimal::from_str(amount_str)
            .map_err(|_| FormError::InvalidAmount(amount_str.to_string()))?;
        if amount <= Decimal::ZERO {
            return Err(FormError::NonPositiveAmount);
        }
        if amount > MAX_AMOUNT {
            return Err(FormError::AmountTooLarge);
        }
        if amount.normalize().scale() > AMOUNT_SCALE {
            return Err(FormError::TooManyDecimals);
        }

        let category = Category::parse(category)
            .ok_or_else(|| FormError::UnknownCategory(category.trim().to_string()))?;

        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(date.trim().to_string()))?;

        let description = description.trim();
        let description = (!description.is_empty()).then(|| description.to_string());

        Ok(Self {
            title: title.to_string(),
            amount,
            category,
            date,
            description,
        })
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            description: expense.description.clone(),
        }
    }
}
