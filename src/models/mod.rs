mod category;
mod expense;
mod identity;

pub use category::Category;
pub use expense::{Expense, ExpenseForm, AMOUNT_SCALE, MAX_AMOUNT};
pub use identity::{Credentials, Identity};

/// Rejections raised while parsing user input, before any store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("title is required")]
    EmptyTitle,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must not exceed {}", expense::MAX_AMOUNT)]
    AmountTooLarge,
    #[error("amount can have at most {} decimal places", expense::AMOUNT_SCALE)]
    TooManyDecimals,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("email is required")]
    EmptyEmail,
    #[error("password is required")]
    EmptyPassword,
    #[error("passwords don't match")]
    PasswordMismatch,
}
