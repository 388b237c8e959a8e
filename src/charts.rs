//! Pie chart geometry for the category breakdown.
//!
//! Angles are degrees, counter-clockwise from the positive x axis, in a y-up
//! coordinate space (the one the terminal canvas uses).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::i18n::Language;
use crate::models::Category;
use crate::stats::CategoryTotal;

pub const PALETTE_SIZE: usize = 7;

/// Slices below this share of the total get no label.
pub const MIN_LABEL_FRACTION: f64 = 0.03;

const LTR_LABEL_OFFSET: f64 = 30.0;
const RTL_LABEL_OFFSET: f64 = 35.0;
const RTL_NUDGE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub category: Category,
    pub amount: Decimal,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color_index: usize,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// One slice per total, laid out in input order. Colors follow position, so
/// a category keeps its color as long as it keeps its place.
pub fn pie_slices(totals: &[CategoryTotal]) -> Vec<PieSlice> {
    let grand = totals
        .iter()
        .fold(Decimal::ZERO, |sum, t| sum.saturating_add(t.amount));
    let grand = grand.to_f64().unwrap_or(0.0);
    if grand <= 0.0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    totals
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let fraction = t.amount.to_f64().unwrap_or(0.0) / grand;
            let start = angle;
            angle += fraction * 360.0;
            PieSlice {
                category: t.category,
                amount: t.amount,
                fraction,
                start_angle: start,
                end_angle: angle,
                color_index: i % PALETTE_SIZE,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieGeometry {
    pub cx: f64,
    pub cy: f64,
    pub outer_radius: f64,
}

/// Which end of the text sits at the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceLabel {
    pub x: f64,
    pub y: f64,
    pub anchor: Anchor,
    pub text: String,
}

/// Where and how to print a slice's label, or `None` when the chart is
/// compact or the slice is too thin to label.
pub fn slice_label(
    geometry: &PieGeometry,
    slice: &PieSlice,
    label: &str,
    language: Language,
    compact: bool,
) -> Option<SliceLabel> {
    if compact || slice.fraction < MIN_LABEL_FRACTION {
        return None;
    }

    let percent = (slice.fraction * 100.0).round() as i64;
    let mid = slice.mid_angle().to_radians();
    let offset = if language.is_rtl() {
        RTL_LABEL_OFFSET
    } else {
        LTR_LABEL_OFFSET
    };
    let radius = geometry.outer_radius + offset;
    let mut x = geometry.cx + radius * mid.cos();
    let y = geometry.cy + radius * mid.sin();
    let right_side = x > geometry.cx;

    let (anchor, text) = if language.is_rtl() {
        if right_side {
            x -= RTL_NUDGE;
        } else {
            x += RTL_NUDGE;
        }
        let anchor = if right_side { Anchor::End } else { Anchor::Start };
        (anchor, format!("{percent}% {label}"))
    } else {
        let anchor = if right_side { Anchor::Start } else { Anchor::End };
        (anchor, format!("{label} {percent}%"))
    };

    Some(SliceLabel { x, y, anchor, text })
}

#[cfg(test)]
#[path = "charts_tests.rs"]
mod charts_tests;
