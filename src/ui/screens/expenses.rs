use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::i18n::{self, Label};
use crate::store::ExpenseStore;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, short_id, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, store: &ExpenseStore) {
    let lang = app.language;
    let expenses = store.expenses();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(
                " {} ({}) ",
                i18n::label(Label::Expenses, lang),
                expenses.len()
            ),
            theme::title_style(),
        ));

    if store.is_loading() || expenses.is_empty() {
        let text = if store.is_loading() {
            i18n::label(Label::Loading, lang)
        } else {
            i18n::label(Label::NoExpenses, lang)
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(text, theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Add one with :add <title> <amount> <category>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let mut headers = vec![
        "ID",
        i18n::label(Label::Date, lang),
        i18n::label(Label::Title, lang),
        i18n::label(Label::Category, lang),
        i18n::label(Label::Amount, lang),
        i18n::label(Label::Description, lang),
    ];
    let mut widths = vec![
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Min(16),
        Constraint::Length(15),
        Constraint::Length(14),
        Constraint::Min(10),
    ];
    if lang.is_rtl() {
        headers.reverse();
        widths.reverse();
    }

    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, expense)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let mut cells = vec![
                Cell::from(short_id(&expense.id).to_string()),
                Cell::from(expense.date.to_string()),
                Cell::from(truncate(&expense.title, 32)),
                Cell::from(i18n::category_label(expense.category, lang)),
                Cell::from(Span::styled(
                    format_amount(expense.amount),
                    theme::amount_style(),
                )),
                Cell::from(truncate(expense.description.as_deref().unwrap_or(""), 40)),
            ];
            if lang.is_rtl() {
                cells.reverse();
            }
            Row::new(cells).style(style)
        })
        .collect();

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
