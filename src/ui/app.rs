use chrono::{Local, NaiveDate};

use crate::i18n::{self, Label, Language};
use crate::models::Expense;
use crate::session::Session;
use crate::store::{ExpenseStore, Notice, NoticeLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Expenses]
    }

    pub(crate) fn title(&self, lang: Language) -> &'static str {
        match self {
            Self::Dashboard => i18n::label(Label::Dashboard, lang),
            Self::Expenses => i18n::label(Label::Expenses, lang),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense { id: String, title: String },
}

/// What commands act on besides view state.
pub(crate) struct Workspace {
    pub(crate) session: Session,
    pub(crate) store: ExpenseStore,
}

impl Workspace {
    /// Rebuild the backend after an identity change and reload from it.
    pub(crate) fn rebind(&mut self) -> anyhow::Result<()> {
        let backend = self.session.backend()?;
        self.store.switch_backend(backend);
        Ok(())
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) status_is_error: bool,
    pub(crate) show_help: bool,
    pub(crate) language: Language,
    pub(crate) today: NaiveDate,

    // Expenses
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(language: Language) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            status_is_error: false,
            show_help: false,
            language,
            today: Local::now().date_naive(),

            expense_index: 0,
            expense_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = false;
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = true;
    }

    /// Show the most recent store notice in the active language.
    pub(crate) fn show_notices(&mut self, notices: Vec<Notice>) {
        for notice in &notices {
            tracing::debug!(notice = notice.message.key(), level = ?notice.level, "notice");
        }
        if let Some(notice) = notices.last() {
            let text = i18n::message(notice.message, self.language);
            match notice.level {
                NoticeLevel::Success => self.set_status(text),
                NoticeLevel::Error => self.set_error(text),
            }
        }
    }

    pub(crate) fn selected_expense<'a>(&self, store: &'a ExpenseStore) -> Option<&'a Expense> {
        store.expenses().get(self.expense_index)
    }

    /// Keep the cursor on a real row after the list shrinks.
    pub(crate) fn clamp_selection(&mut self, len: usize) {
        if self.expense_index >= len {
            self.expense_index = len.saturating_sub(1);
        }
        if self.expense_scroll > self.expense_index {
            self.expense_scroll = self.expense_index;
        }
    }
}
