use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Expense, ExpenseForm, FormError};

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// First 8 characters of an id, enough to pick a record by prefix.
pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page - 1);
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}

/// Hide everything after the email in `login`/`register` command input.
pub(crate) fn mask_secrets(input: &str) -> String {
    let mut words = input.splitn(3, ' ');
    let cmd = words.next().unwrap_or("");
    if !matches!(cmd, "login" | "register") {
        return input.to_string();
    }
    match (words.next(), words.next()) {
        (Some(email), Some(rest)) => {
            let masked: String = rest.chars().map(|c| if c == ' ' { ' ' } else { '*' }).collect();
            format!("{cmd} {email} {masked}")
        }
        _ => input.to_string(),
    }
}

// ── Expense arguments ────────────────────────────────────────

/// Raw fields of `<title...> <amount> <category> [date|today] [-- description]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExpenseArgs {
    pub(crate) title: String,
    pub(crate) amount: String,
    pub(crate) category: String,
    pub(crate) date: Option<String>,
    pub(crate) description: Option<String>,
}

pub(crate) const EXPENSE_USAGE: &str =
    "<title> <amount> <category> [YYYY-MM-DD|today] [-- description]";

fn looks_like_date(token: &str) -> bool {
    token.eq_ignore_ascii_case("today")
        || (token.contains('-') && token.chars().all(|c| c.is_ascii_digit() || c == '-'))
}

pub(crate) fn parse_expense_args(input: &str) -> Result<ExpenseArgs> {
    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    // Only a standalone `--` starts the description.
    let separator = tokens.iter().position(|t| *t == "--");
    let description = separator.map(|at| {
        let desc = tokens[at + 1..].join(" ");
        tokens.truncate(at);
        desc
    });
    let date = match tokens.last() {
        Some(last) if looks_like_date(last) => tokens.pop().map(str::to_string),
        _ => None,
    };
    if tokens.len() < 3 {
        bail!("Expected {EXPENSE_USAGE}");
    }

    let category = tokens.pop().unwrap_or_default().to_string();
    let amount = tokens.pop().unwrap_or_default().to_string();
    Ok(ExpenseArgs {
        title: tokens.join(" "),
        amount,
        category,
        date,
        description,
    })
}

fn resolve_date(raw: &str, today: NaiveDate) -> String {
    if raw.eq_ignore_ascii_case("today") {
        today.format("%Y-%m-%d").to_string()
    } else {
        raw.to_string()
    }
}

impl ExpenseArgs {
    /// Form for a new expense; the date defaults to `today`.
    pub(crate) fn into_form(self, today: NaiveDate) -> Result<ExpenseForm, FormError> {
        let date = self
            .date
            .map(|d| resolve_date(&d, today))
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
        ExpenseForm::parse(
            &self.title,
            &self.amount,
            &self.category,
            &date,
            self.description.as_deref().unwrap_or(""),
        )
    }

    /// Form replacing `current`. A missing date or description keeps the old value.
    pub(crate) fn into_update(
        self,
        current: &Expense,
        today: NaiveDate,
    ) -> Result<ExpenseForm, FormError> {
        let date = self
            .date
            .map(|d| resolve_date(&d, today))
            .unwrap_or_else(|| current.date.format("%Y-%m-%d").to_string());
        let description = match self.description {
            Some(desc) => desc,
            None => current.description.clone().unwrap_or_default(),
        };
        ExpenseForm::parse(
            &self.title,
            &self.amount,
            &self.category,
            &date,
            &description,
        )
    }
}
