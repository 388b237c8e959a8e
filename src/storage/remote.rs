use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BackendError, BackendKind, ExpenseBackend, Mutation};
use crate::models::{Category, Expense, ExpenseForm};

pub const EXPENSES_TABLE: &str = "expenses";

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// A row-oriented data service reached one request at a time.
///
/// Every call is a single statement; there is no transaction spanning calls.
pub trait TableClient {
    fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, BackendError>;

    fn insert(&self, table: &str, row: &Value) -> Result<(), BackendError>;

    fn update(&self, table: &str, values: &Value, filters: &[Filter]) -> Result<(), BackendError>;

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), BackendError>;
}

/// Wire shape of a row in the `expenses` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExpenseRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) amount: Decimal,
    pub(crate) category: Category,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn new(expense: &Expense, owner: &str) -> Self {
        Self {
            id: expense.id.clone(),
            user_id: owner.to_string(),
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            description: expense.description.clone(),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            amount: row.amount,
            category: row.category,
            date: row.date,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Column values written by an update.
#[derive(Debug, Serialize)]
struct ExpenseChanges<'a> {
    title: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    category: Category,
    date: NaiveDate,
    description: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

/// Authenticated persistence: rows scoped by the owning user id.
pub struct RemoteBackend<C> {
    client: C,
    owner: String,
}

impl<C: TableClient> RemoteBackend<C> {
    pub fn new(client: C, owner: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
        }
    }

    fn scoped(&self, id: &str) -> [Filter; 2] {
        [
            Filter::eq("id", id),
            Filter::eq("user_id", self.owner.clone()),
        ]
    }
}

impl<C: TableClient> ExpenseBackend for RemoteBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn load(&mut self) -> Result<Vec<Expense>, BackendError> {
        let rows = self.client.select(
            EXPENSES_TABLE,
            &[Filter::eq("user_id", self.owner.clone())],
            Some(&Order::desc("date")),
        )?;
        rows.into_iter()
            .map(|value| {
                serde_json::from_value::<ExpenseRow>(value)
                    .map(Expense::from)
                    .map_err(|source| BackendError::Decode {
                        table: EXPENSES_TABLE.into(),
                        source,
                    })
            })
            .collect()
    }

    fn apply(&mut self, mutation: &Mutation<'_>, _next: &[Expense]) -> Result<(), BackendError> {
        match mutation {
            Mutation::Insert(expense) => {
                let row = serde_json::to_value(ExpenseRow::new(expense, &self.owner))
                    .map_err(BackendError::Encode)?;
                self.client.insert(EXPENSES_TABLE, &row)
            }
            Mutation::Update {
                id,
                form,
                updated_at,
            } => {
                let values = serde_json::to_value(changes(form, *updated_at))
                    .map_err(BackendError::Encode)?;
                self.client
                    .update(EXPENSES_TABLE, &values, &self.scoped(id))
            }
            Mutation::Delete { id } => self.client.delete(EXPENSES_TABLE, &self.scoped(id)),
        }
    }
}

fn changes(form: &ExpenseForm, updated_at: DateTime<Utc>) -> ExpenseChanges<'_> {
    ExpenseChanges {
        title: &form.title,
        amount: form.amount,
        category: form.category,
        date: form.date,
        description: form.description.as_deref(),
        updated_at,
    }
}
