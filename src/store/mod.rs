//! The in-memory expense list and the single place it changes.
//!
//! Every mutation writes to the active backend first and only touches the
//! list once that write has succeeded. Failures are logged, turned into an
//! error notice and otherwise swallowed; callers get a success flag.

use chrono::Utc;

use crate::i18n::MessageKey;
use crate::models::{Expense, ExpenseForm};
use crate::storage::{BackendKind, ExpenseBackend, Mutation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing message, rendered in the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: MessageKey,
}

impl Notice {
    pub fn success(message: MessageKey) -> Self {
        Self {
            level: NoticeLevel::Success,
            message,
        }
    }

    pub fn error() -> Self {
        Self {
            level: NoticeLevel::Error,
            message: MessageKey::Error,
        }
    }
}

pub struct ExpenseStore {
    backend: Box<dyn ExpenseBackend>,
    expenses: Vec<Expense>,
    loading: bool,
    notices: Vec<Notice>,
}

impl ExpenseStore {
    /// A store that has not loaded yet. `is_loading` reports true until the
    /// first `load` completes.
    pub fn new(backend: Box<dyn ExpenseBackend>) -> Self {
        Self {
            backend,
            expenses: Vec::new(),
            loading: true,
            notices: Vec::new(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the list with the backend's contents. On failure the previous
    /// list is kept.
    pub fn load(&mut self) -> bool {
        self.loading = true;
        let ok = match self.backend.load() {
            Ok(expenses) => {
                tracing::debug!(
                    backend = %self.backend.kind(),
                    count = expenses.len(),
                    "expenses loaded"
                );
                self.expenses = expenses;
                true
            }
            Err(e) => {
                tracing::error!(backend = %self.backend.kind(), error = %e, "error loading expenses");
                self.notices.push(Notice::error());
                false
            }
        };
        self.loading = false;
        ok
    }

    /// Persist a new expense and put it at the front of the list.
    pub fn add(&mut self, form: ExpenseForm) -> Option<&Expense> {
        let expense = Expense::from_form(form, Utc::now());
        let mut next = Vec::with_capacity(self.expenses.len() + 1);
        next.push(expense.clone());
        next.extend(self.expenses.iter().cloned());

        if !self.commit(&Mutation::Insert(&expense), next, "adding") {
            return None;
        }
        tracing::info!(id = %expense.id, "expense added");
        self.notices.push(Notice::success(MessageKey::ExpenseAdded));
        self.expenses.first()
    }

    /// Merge `form` over the record with `id`.
    pub fn update(&mut self, id: &str, form: &ExpenseForm) -> bool {
        if self.get(id).is_none() {
            tracing::warn!(id, "update for unknown expense");
            self.notices.push(Notice::error());
            return false;
        }

        let updated_at = Utc::now();
        let next: Vec<Expense> = self
            .expenses
            .iter()
            .map(|e| {
                if e.id == id {
                    e.with_form(form, updated_at)
                } else {
                    e.clone()
                }
            })
            .collect();

        let mutation = Mutation::Update {
            id,
            form,
            updated_at,
        };
        if !self.commit(&mutation, next, "updating") {
            return false;
        }
        tracing::info!(id, "expense updated");
        self.notices.push(Notice::success(MessageKey::ExpenseUpdated));
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::warn!(id, "delete for unknown expense");
            self.notices.push(Notice::error());
            return false;
        }

        let next: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();

        if !self.commit(&Mutation::Delete { id }, next, "deleting") {
            return false;
        }
        tracing::info!(id, "expense deleted");
        self.notices.push(Notice::success(MessageKey::ExpenseDeleted));
        true
    }

    /// Move to a newly resolved backend and reload from it. Records held by
    /// the previous backend stay where they are.
    pub fn switch_backend(&mut self, backend: Box<dyn ExpenseBackend>) -> bool {
        tracing::info!(from = %self.backend.kind(), to = %backend.kind(), "switching backend");
        self.backend = backend;
        self.expenses.clear();
        self.load()
    }

    // Write first; swap the list in only after the backend accepted it.
    fn commit(&mut self, mutation: &Mutation<'_>, next: Vec<Expense>, action: &str) -> bool {
        match self.backend.apply(mutation, &next) {
            Ok(()) => {
                self.expenses = next;
                true
            }
            Err(e) => {
                tracing::error!(backend = %self.backend.kind(), error = %e, "error {action} expense");
                self.notices.push(Notice::error());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests;
