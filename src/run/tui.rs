use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::session::Session;
use crate::store::ExpenseStore;
use crate::ui::app::{App, InputMode, PendingAction, Screen, Workspace};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(session: Session) -> Result<()> {
    let mut app = App::new(session.language());
    let store = ExpenseStore::new(session.backend()?);
    let mut ws = Workspace { session, store };
    tracing::info!(backend = %ws.store.backend_kind(), "starting interactive session");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Paint the loading state once before the first (possibly remote) load.
    let result = draw(&mut terminal, &mut app, &ws).and_then(|()| {
        ws.store.load();
        app.show_notices(ws.store.take_notices());
        run_app(&mut terminal, &mut app, &mut ws)
    });

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ws: &Workspace,
) -> Result<()> {
    terminal.draw(|f| {
        // tab + status + command bars, table borders and header
        let content_height = f.area().height.saturating_sub(6) as usize;
        app.visible_rows = content_height.max(1);
        crate::ui::render::render(f, app, &ws.store, &ws.session);
    })?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ws: &mut Workspace,
) -> Result<()> {
    while app.running {
        draw(terminal, app, ws)?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, ws),
                InputMode::Command => handle_command_input(key, app, ws),
                InputMode::Confirm => handle_confirm_input(key, app, ws),
            }
            app.show_notices(ws.store.take_notices());
            app.clamp_selection(ws.store.expenses().len());
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, ws: &mut Workspace) {
    let len = ws.store.expenses().len();
    let page = app.visible_rows.max(1);

    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_up(&mut app.expense_index, &mut app.expense_scroll);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            scroll_up(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('g') => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        KeyCode::Char('G') => {
            scroll_to_bottom(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('1') => app.screen = Screen::Dashboard,
        KeyCode::Char('2') => app.screen = Screen::Expenses,
        KeyCode::Tab | KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = if key.code == KeyCode::Tab {
                (idx + 1) % screens.len()
            } else {
                (idx + screens.len() - 1) % screens.len()
            };
            app.screen = screens[next];
        }
        KeyCode::Char('D') | KeyCode::Delete if app.screen == Screen::Expenses => {
            commands::handle_command("delete", app, ws);
        }
        KeyCode::Char('r') => commands::handle_command("reload", app, ws),
        KeyCode::Char('l') => commands::handle_command("lang", app, ws),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Esc => {
            app.status_message.clear();
        }
        _ => {}
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, ws: &mut Workspace) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&input, app, ws);
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, ws: &mut Workspace) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteExpense { id, title } => {
                        if ws.store.delete(&id) {
                            tracing::debug!(%id, %title, "deleted from table view");
                        }
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            // Any other key = cancel
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
}
