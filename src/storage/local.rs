use serde_json::Value;

use super::{BackendError, BackendKind, ExpenseBackend, KeyValueStore, Mutation};
use crate::models::Expense;

/// Key holding the serialized expense list in guest mode.
pub const EXPENSES_KEY: &str = "expense-tracker-expenses";

/// Guest-mode persistence: the whole list as one JSON array under a fixed key.
pub struct LocalBackend<S> {
    store: S,
}

impl<S: KeyValueStore> LocalBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> ExpenseBackend for LocalBackend<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn load(&mut self) -> Result<Vec<Expense>, BackendError> {
        let mut expenses = match self.store.get(EXPENSES_KEY)? {
            Some(text) => decode_expenses(&text),
            None => Vec::new(),
        };
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    fn apply(&mut self, _mutation: &Mutation<'_>, next: &[Expense]) -> Result<(), BackendError> {
        // No partial update: the full list always replaces the stored blob.
        let text = serde_json::to_string(next).map_err(BackendError::Encode)?;
        self.store.set(EXPENSES_KEY, &text)
    }
}

/// Parse a stored blob. Anything that is not a JSON array reads as empty;
/// elements that fail to decode are dropped.
pub(crate) fn decode_expenses(text: &str) -> Vec<Expense> {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("stored expenses are not an array; starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "error parsing stored expenses; starting empty");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Expense>(item) {
            Ok(expense) => Some(expense),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed stored expense");
                None
            }
        })
        .collect()
}
