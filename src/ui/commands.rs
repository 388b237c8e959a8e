use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Context;

use super::app::{App, InputMode, PendingAction, Screen, Workspace};
use super::util::{parse_expense_args, EXPENSE_USAGE};
use crate::i18n::{self, Label, Language, MessageKey};
use crate::models::Credentials;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Workspace) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!(
        "add",
        "Add expense (e.g. :add Lunch 12.50 food today -- with Sam)",
        cmd_add,
        r
    );
    register_command!(
        "a",
        "Add expense (e.g. :a Lunch 12.50 food)",
        cmd_add,
        r
    );
    register_command!(
        "edit",
        "Replace selected expense (e.g. :edit Lunch 14 food)",
        cmd_edit,
        r
    );
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!("reload", "Reload expenses from storage", cmd_reload, r);
    register_command!("r", "Reload expenses from storage", cmd_reload, r);
    register_command!(
        "lang",
        "Switch language (e.g. :lang ar, or :lang to toggle)",
        cmd_lang,
        r
    );
    register_command!(
        "login",
        "Sign in (e.g. :login me@example.com password)",
        cmd_login,
        r
    );
    register_command!(
        "register",
        "Create account (e.g. :register me@example.com pw pw)",
        cmd_register,
        r
    );
    register_command!("logout", "Sign out and use local storage", cmd_logout, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);

    r
});

/// Run one command line. Failures end up in the status bar, never in the
/// event loop.
pub(crate) fn handle_command(input: &str, app: &mut App, ws: &mut Workspace) {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, ws) {
            tracing::warn!(command = cmd_name, error = %e, "command failed");
            app.set_error(format!("{e:#}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_error(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _ws: &mut Workspace) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _ws: &mut Workspace) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, _ws: &mut Workspace) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let form = parse_expense_args(args)
        .with_context(|| format!("Usage: :add {EXPENSE_USAGE}"))?
        .into_form(app.today)?;
    if ws.store.add(form).is_some() {
        app.screen = Screen::Expenses;
        app.expense_index = 0;
        app.expense_scroll = 0;
    }
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let Some(current) = app.selected_expense(&ws.store).cloned() else {
        app.set_error("No expense selected");
        return Ok(());
    };
    let form = parse_expense_args(args)
        .with_context(|| format!("Usage: :edit {EXPENSE_USAGE}"))?
        .into_update(&current, app.today)?;
    ws.store.update(&current.id, &form);
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let Some(expense) = app.selected_expense(&ws.store) else {
        app.set_error("No expense selected");
        return Ok(());
    };
    app.confirm_message = format!(
        "{} '{}'",
        i18n::label(Label::DeleteExpenseConfirmation, app.language),
        expense.title
    );
    app.pending_action = Some(PendingAction::DeleteExpense {
        id: expense.id.clone(),
        title: expense.title.clone(),
    });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_reload(_args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    if ws.store.load() {
        app.set_status(format!(
            "Loaded {} expenses from {} storage",
            ws.store.expenses().len(),
            ws.store.backend_kind()
        ));
    }
    Ok(())
}

fn cmd_lang(args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let language = if args.is_empty() {
        app.language.toggled()
    } else {
        Language::parse(args).with_context(|| format!("Unknown language '{args}' (use en or ar)"))?
    };
    ws.session.set_language(language)?;
    app.language = language;
    app.set_status(format!("Language: {language}"));
    Ok(())
}

fn cmd_login(args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let mut words = args.split_whitespace();
    let (email, password) = (words.next().unwrap_or(""), words.next().unwrap_or(""));
    let creds = Credentials::sign_in(email, password)?;
    ws.session.sign_in(&creds)?;
    ws.rebind()?;
    app.clamp_selection(ws.store.expenses().len());
    app.set_status(i18n::message(MessageKey::LoginSuccess, app.language));
    Ok(())
}

fn cmd_register(args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    let mut words = args.split_whitespace();
    let email = words.next().unwrap_or("");
    let password = words.next().unwrap_or("");
    let confirm = words.next().unwrap_or("");
    let creds = Credentials::registration(email, password, confirm)?;

    if ws.session.register(&creds)?.is_some() {
        ws.rebind()?;
        app.clamp_selection(ws.store.expenses().len());
        app.set_status(i18n::message(MessageKey::RegisterSuccess, app.language));
    } else {
        app.set_status(format!(
            "{}: confirm {} before signing in",
            i18n::message(MessageKey::RegisterSuccess, app.language),
            creds.email
        ));
    }
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, ws: &mut Workspace) -> anyhow::Result<()> {
    if !ws.session.sign_out()? {
        app.set_status("Not signed in");
        return Ok(());
    }
    ws.rebind()?;
    app.clamp_selection(ws.store.expenses().len());
    app.set_status(i18n::message(MessageKey::LogoutSuccess, app.language));
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _ws: &mut Workspace) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}
