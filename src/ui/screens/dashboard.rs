use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Bar, BarChart, BarGroup, Block, Borders, Paragraph,
    },
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::charts::{self, Anchor, PieGeometry, PieSlice};
use crate::i18n::{self, Label, Language};
use crate::stats;
use crate::store::ExpenseStore;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

/// Below this width the pie is drawn without labels.
const COMPACT_WIDTH: u16 = 60;

// Canvas coordinate space; the pie sits in the middle with room for labels.
const CANVAS_SIZE: f64 = 200.0;
const PIE_RADIUS: f64 = 45.0;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, store: &ExpenseStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(10),   // Charts
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app, store);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_category_pie(f, charts[0], app, store);
    render_monthly_bars(f, charts[1], app, store);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App, store: &ExpenseStore) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let lang = app.language;
    let expenses = store.expenses();
    let dash = stats::dashboard_stats(expenses, app.today);
    let categories_used = stats::category_totals(expenses).len();

    let mut values = [
        (
            Label::TotalExpenses,
            format_amount(dash.total),
            format!("{} expenses", dash.count),
        ),
        (
            Label::ThisMonth,
            format_amount(dash.this_month_total),
            format!("{} this month", dash.this_month_count),
        ),
        (
            Label::AveragePerExpense,
            format_amount(dash.average()),
            String::new(),
        ),
        (
            Label::CategoriesUsed,
            categories_used.to_string(),
            format!("of {}", crate::models::Category::all().len()),
        ),
    ];
    if lang.is_rtl() {
        values.reverse();
    }

    for (card, (label, value, sub)) in cards.iter().zip(values) {
        let value_line = if store.is_loading() {
            Span::styled(i18n::label(Label::Loading, lang), theme::dim_style())
        } else {
            Span::styled(
                value,
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let text = Paragraph::new(vec![
            Line::from(value_line),
            Line::from(Span::styled(sub, theme::dim_style())),
        ])
        .centered()
        .block(titled_block(i18n::label(label, lang)));
        f.render_widget(text, *card);
    }
}

fn render_category_pie(f: &mut Frame, area: Rect, app: &App, store: &ExpenseStore) {
    let lang = app.language;
    let title = i18n::label(Label::ExpensesByCategory, lang);
    let slices = charts::pie_slices(&stats::category_totals(store.expenses()));

    if slices.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            i18n::label(Label::NoExpenses, lang),
            theme::dim_style(),
        )))
        .centered()
        .block(titled_block(title));
        f.render_widget(msg, area);
        return;
    }

    let compact = area.width < COMPACT_WIDTH;
    let geometry = PieGeometry {
        cx: CANVAS_SIZE / 2.0,
        cy: CANVAS_SIZE / 2.0,
        outer_radius: PIE_RADIUS,
    };
    let fills: Vec<(Vec<(f64, f64)>, Color)> = slices
        .iter()
        .map(|slice| (slice_points(&geometry, slice), theme::slice_color(slice.color_index)))
        .collect();

    // Canvas units per terminal column, to offset end-anchored labels.
    let unit_per_col = CANVAS_SIZE / f64::from(area.width.saturating_sub(2).max(1));
    let labels: Vec<(f64, f64, String, Color)> = slices
        .iter()
        .filter_map(|slice| {
            let name = i18n::category_label(slice.category, lang);
            let label = charts::slice_label(&geometry, slice, name, lang, compact)?;
            let width = label.text.chars().count() as f64 * unit_per_col;
            let x = match label.anchor {
                Anchor::Start => label.x,
                Anchor::End => label.x - width,
            };
            Some((x, label.y, label.text, theme::slice_color(slice.color_index)))
        })
        .collect();

    let canvas = Canvas::default()
        .block(titled_block(title))
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_SIZE])
        .y_bounds([0.0, CANVAS_SIZE])
        .paint(move |ctx| {
            for (coords, color) in &fills {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color: *color,
                });
            }
            ctx.layer();
            for (x, y, text, color) in &labels {
                ctx.print(*x, *y, Span::styled(text.clone(), Style::default().fg(*color)));
            }
        });

    f.render_widget(canvas, area);

    if compact {
        render_pie_legend(f, area, &slices, lang);
    }
}

/// Sample points filling one slice, in polar steps.
fn slice_points(geometry: &PieGeometry, slice: &PieSlice) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let sweep = slice.end_angle - slice.start_angle;
    let angle_steps = (sweep * 2.0).ceil().max(1.0) as usize;
    let radius_steps = (geometry.outer_radius as usize).max(1);

    for r in 1..=radius_steps {
        let radius = r as f64;
        for a in 0..=angle_steps {
            let angle = (slice.start_angle + sweep * a as f64 / angle_steps as f64).to_radians();
            points.push((
                geometry.cx + radius * angle.cos(),
                geometry.cy + radius * angle.sin(),
            ));
        }
    }
    points
}

/// Narrow layouts get a one-line legend at the bottom of the chart instead of labels.
fn render_pie_legend(f: &mut Frame, area: Rect, slices: &[PieSlice], lang: Language) {
    if area.height < 3 || area.width < 3 {
        return;
    }
    let spans: Vec<Span> = slices
        .iter()
        .flat_map(|slice| {
            [
                Span::styled("■ ", Style::default().fg(theme::slice_color(slice.color_index))),
                Span::styled(
                    format!("{} ", truncate(i18n::category_label(slice.category, lang), 8)),
                    theme::dim_style(),
                ),
            ]
        })
        .collect();
    let legend_area = Rect::new(area.x + 1, area.y + area.height - 2, area.width - 2, 1);
    f.render_widget(Paragraph::new(Line::from(spans)), legend_area);
}

fn render_monthly_bars(f: &mut Frame, area: Rect, app: &App, store: &ExpenseStore) {
    let lang = app.language;
    let title = i18n::label(Label::MonthlySpending, lang);
    let mut months = stats::monthly_totals(store.expenses());
    if lang.is_rtl() {
        months.reverse();
    }

    if months.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            i18n::label(Label::NoExpenses, lang),
            theme::dim_style(),
        )))
        .centered()
        .block(titled_block(title));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = months
        .iter()
        .map(|m| {
            let val = m.amount.round().to_u64().unwrap_or(0);
            Bar::default()
                .value(val)
                .text_value(format!("{:.0}", m.amount))
                .label(Line::from(i18n::month_label(m.month, lang)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let inner = area.width.saturating_sub(2);
    let count = bars.len() as u16;
    let bar_width = (inner.saturating_sub(count) / count.max(1)).clamp(3, 10);

    let chart = BarChart::default()
        .block(titled_block(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT))
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}
