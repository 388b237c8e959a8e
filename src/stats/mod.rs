//! Aggregates derived from the in-memory expense list. Pure functions; safe to
//! recompute on every render. Sums saturate at `Decimal::MAX` rather than
//! overflow, whatever the stored amounts are.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{Category, Expense};

/// How many of the most recent months the monthly chart keeps.
pub const MONTHS_SHOWN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a strict `YYYY-MM` string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (year, month) = s.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub amount: Decimal,
}

/// Sum per category, in the order each category first appears in `expenses`.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(total) => total.amount = total.amount.saturating_add(expense.amount),
            None => totals.push(CategoryTotal {
                category: expense.category,
                amount: expense.amount,
            }),
        }
    }
    totals
}

/// Sum per calendar month, oldest first, limited to the last
/// [`MONTHS_SHOWN`] months that have any expense. Empty months are absent.
pub fn monthly_totals(expenses: &[Expense]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for expense in expenses {
        let sum = by_month.entry(YearMonth::of(expense.date)).or_default();
        *sum = sum.saturating_add(expense.amount);
    }
    let skip = by_month.len().saturating_sub(MONTHS_SHOWN);
    by_month
        .into_iter()
        .skip(skip)
        .map(|(month, amount)| MonthlyTotal { month, amount })
        .collect()
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: Decimal,
    pub count: usize,
    pub this_month_total: Decimal,
    pub this_month_count: usize,
}

impl DashboardStats {
    /// Mean amount per expense; zero when there are none.
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(self.count)
        }
    }
}

pub fn dashboard_stats(expenses: &[Expense], today: NaiveDate) -> DashboardStats {
    let current = YearMonth::of(today);
    expenses
        .iter()
        .fold(DashboardStats::default(), |mut stats, expense| {
            stats.total = stats.total.saturating_add(expense.amount);
            stats.count += 1;
            if YearMonth::of(expense.date) == current {
                stats.this_month_total = stats.this_month_total.saturating_add(expense.amount);
                stats.this_month_count += 1;
            }
            stats
        })
}
