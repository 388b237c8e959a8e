use anyhow::{bail, Context, Result};
use chrono::Local;

use crate::i18n::{self, Language, MessageKey};
use crate::models::{Category, Credentials};
use crate::session::Session;
use crate::stats::{self, YearMonth};
use crate::store::{ExpenseStore, NoticeLevel};
use crate::ui::util::{format_amount, parse_expense_args, short_id, truncate, EXPENSE_USAGE};

pub(crate) fn as_cli(args: &[String], session: &mut Session) -> Result<()> {
    match args[1].as_str() {
        "list" | "ls" => cli_list(&args[2..], session),
        "add" | "a" => cli_add(&args[2..], session),
        "edit" => cli_edit(&args[2..], session),
        "delete" | "rm" => cli_delete(&args[2..], session),
        "summary" | "s" => cli_summary(session),
        "login" => cli_login(&args[2..], session),
        "register" => cli_register(&args[2..], session),
        "logout" => cli_logout(session),
        "whoami" => cli_whoami(session),
        "lang" => cli_lang(&args[2..], session),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("expensetui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("expensetui: personal expense tracker (local, or hosted when signed in)");
    println!();
    println!("Usage: expensetui [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  list [--month YYYY-MM] [--category <name>]");
    println!("                                List expenses, newest first");
    println!("  add {EXPENSE_USAGE}");
    println!("                                Record an expense (date defaults to today)");
    println!("  edit <id> {EXPENSE_USAGE}");
    println!("                                Replace an expense's fields");
    println!("  delete <id>                   Delete an expense (id prefix is enough)");
    println!("  summary                       Totals by category and month");
    println!("  login <email> <password>      Sign in and use hosted storage");
    println!("  register <email> <password> <confirm>");
    println!("                                Create a hosted account");
    println!("  logout                        Sign out and use local storage");
    println!("  whoami                        Show identity and storage in use");
    println!("  lang [en|ar]                  Show or set the display language");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

/// Open a store on the session's backend and load it.
fn open_store(session: &Session) -> Result<ExpenseStore> {
    let mut store = ExpenseStore::new(session.backend()?);
    if !store.load() {
        bail!("Could not load expenses from {} storage", store.backend_kind());
    }
    store.take_notices();
    Ok(store)
}

/// Print store notices; fail when any of them is an error.
fn report(store: &mut ExpenseStore, lang: Language) -> Result<()> {
    let mut failed = false;
    for notice in store.take_notices() {
        let text = i18n::message(notice.message, lang);
        match notice.level {
            NoticeLevel::Success => println!("{text}"),
            NoticeLevel::Error => {
                eprintln!("{text}");
                failed = true;
            }
        }
    }
    if failed {
        bail!("Operation failed; see log output for details");
    }
    Ok(())
}

/// Resolve a full id or a unique prefix of one.
fn resolve_id(store: &ExpenseStore, prefix: &str) -> Result<String> {
    if prefix.is_empty() {
        bail!("An expense id is required");
    }
    let matches: Vec<&str> = store
        .expenses()
        .iter()
        .map(|e| e.id.as_str())
        .filter(|id| id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("No expense with id '{prefix}'"),
        _ if matches.contains(&prefix) => Ok(prefix.to_string()),
        _ => bail!("Id prefix '{prefix}' matches {} expenses", matches.len()),
    }
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn cli_list(args: &[String], session: &Session) -> Result<()> {
    let lang = session.language();
    let store = open_store(session)?;

    let month = match flag(args, "--month") {
        Some(raw) => Some(
            YearMonth::parse(raw)
                .with_context(|| format!("Invalid month '{raw}' (expected YYYY-MM)"))?,
        ),
        None => None,
    };
    let category = match flag(args, "--category") {
        Some(raw) => {
            Some(Category::parse(raw).with_context(|| format!("Unknown category '{raw}'"))?)
        }
        None => None,
    };

    let shown: Vec<_> = store
        .expenses()
        .iter()
        .filter(|e| month.map_or(true, |m| YearMonth::of(e.date) == m))
        .filter(|e| category.map_or(true, |c| e.category == c))
        .collect();

    if shown.is_empty() {
        println!("{}", i18n::label(i18n::Label::NoExpenses, lang));
        return Ok(());
    }

    println!(
        "{:<9} {:<10} {:<28} {:<14} {:>12}",
        "ID", "Date", "Title", "Category", "Amount"
    );
    println!("{}", "─".repeat(77));
    for e in &shown {
        println!(
            "{:<9} {:<10} {:<28} {:<14} {:>12}",
            short_id(&e.id),
            e.date,
            truncate(&e.title, 28),
            i18n::category_label(e.category, lang),
            format_amount(e.amount),
        );
    }
    Ok(())
}

fn cli_add(args: &[String], session: &Session) -> Result<()> {
    let lang = session.language();
    let form = parse_expense_args(&args.join(" "))
        .with_context(|| format!("Usage: expensetui add {EXPENSE_USAGE}"))?
        .into_form(Local::now().date_naive())?;

    let mut store = open_store(session)?;
    let id = store.add(form).map(|e| e.id.clone());
    report(&mut store, lang)?;
    if let Some(id) = id {
        println!("id: {}", short_id(&id));
    }
    Ok(())
}

fn cli_edit(args: &[String], session: &Session) -> Result<()> {
    let lang = session.language();
    let Some((prefix, rest)) = args.split_first() else {
        bail!("Usage: expensetui edit <id> {EXPENSE_USAGE}");
    };

    let mut store = open_store(session)?;
    let id = resolve_id(&store, prefix)?;
    let current = store
        .get(&id)
        .cloned()
        .with_context(|| format!("No expense with id '{id}'"))?;
    let form = parse_expense_args(&rest.join(" "))
        .with_context(|| format!("Usage: expensetui edit <id> {EXPENSE_USAGE}"))?
        .into_update(&current, Local::now().date_naive())?;

    store.update(&id, &form);
    report(&mut store, lang)
}

fn cli_delete(args: &[String], session: &Session) -> Result<()> {
    let lang = session.language();
    let prefix = args.first().map(String::as_str).unwrap_or("");
    let mut store = open_store(session)?;
    let id = resolve_id(&store, prefix)?;
    store.delete(&id);
    report(&mut store, lang)
}

fn cli_summary(session: &Session) -> Result<()> {
    let lang = session.language();
    let store = open_store(session)?;
    let expenses = store.expenses();
    let dash = stats::dashboard_stats(expenses, Local::now().date_naive());

    println!("Expenses ({} storage)", store.backend_kind());
    println!("{}", "─".repeat(40));
    println!("  Total:        {}", format_amount(dash.total));
    println!("  Count:        {}", dash.count);
    println!(
        "  This month:   {} ({} expenses)",
        format_amount(dash.this_month_total),
        dash.this_month_count
    );
    println!("  Average:      {}", format_amount(dash.average()));

    let by_category = stats::category_totals(expenses);
    if !by_category.is_empty() {
        println!();
        println!("{}:", i18n::label(i18n::Label::ExpensesByCategory, lang));
        for total in &by_category {
            println!(
                "  {:<24} {}",
                i18n::category_label(total.category, lang),
                format_amount(total.amount)
            );
        }
    }

    let by_month = stats::monthly_totals(expenses);
    if !by_month.is_empty() {
        println!();
        println!("{}:", i18n::label(i18n::Label::MonthlySpending, lang));
        for total in &by_month {
            println!(
                "  {:<24} {}",
                i18n::month_label(total.month, lang),
                format_amount(total.amount)
            );
        }
    }
    Ok(())
}

fn cli_login(args: &[String], session: &mut Session) -> Result<()> {
    let email = args.first().map(String::as_str).unwrap_or("");
    let password = args.get(1).map(String::as_str).unwrap_or("");
    let creds = Credentials::sign_in(email, password)?;
    let lang = session.language();
    let identity = session.sign_in(&creds)?;
    println!("{} ({})", i18n::message(MessageKey::LoginSuccess, lang), identity.email);
    Ok(())
}

fn cli_register(args: &[String], session: &mut Session) -> Result<()> {
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");
    let creds = Credentials::registration(arg(0), arg(1), arg(2))?;
    let lang = session.language();
    match session.register(&creds)? {
        Some(identity) => println!(
            "{} ({})",
            i18n::message(MessageKey::RegisterSuccess, lang),
            identity.email
        ),
        None => println!(
            "{}. Confirm {} before signing in.",
            i18n::message(MessageKey::RegisterSuccess, lang),
            creds.email
        ),
    }
    Ok(())
}

fn cli_logout(session: &mut Session) -> Result<()> {
    let lang = session.language();
    if session.sign_out()? {
        println!("{}", i18n::message(MessageKey::LogoutSuccess, lang));
    } else {
        println!("Not signed in");
    }
    Ok(())
}

fn cli_whoami(session: &Session) -> Result<()> {
    match session.identity() {
        Some(identity) => println!("{} ({})", identity.email, identity.user_id),
        None => println!("guest"),
    }
    println!("storage: {}", session.strategy().kind());
    if !session.remote_configured() {
        println!("remote: not configured");
    }
    Ok(())
}

fn cli_lang(args: &[String], session: &mut Session) -> Result<()> {
    match args.first() {
        None => println!("{}", session.language()),
        Some(code) => {
            let language = Language::parse(code)
                .with_context(|| format!("Unknown language '{code}' (use en or ar)"))?;
            session.set_language(language)?;
            println!("Language: {language}");
        }
    }
    Ok(())
}
