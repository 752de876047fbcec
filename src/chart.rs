//! Chart rendering - SVG images for balance curves and income/expense shares.
//!
//! Charts are returned as bytes so the bot can attach them directly without
//! touching the filesystem.

use crate::{
    core::{BalancePoint, Period, Summary},
    errors::{Error, Result},
};
use svg::{
    Document,
    node::{
        self,
        element::{Circle, Line, Path, Polyline, Text},
    },
};

const WIDTH: f64 = 700.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 45.0;
const MARGIN_BOTTOM: f64 = 60.0;
const GRID_LINES: usize = 4;
const MAX_X_LABELS: usize = 8;

const INCOME_COLOR: &str = "#2e7d32";
const EXPENSE_COLOR: &str = "#c62828";
const LINE_COLOR: &str = "#1565c0";

/// Line chart of the cumulative balance, one marker per bucket.
///
/// # Errors
///
/// Returns `Error::Chart` when there are no points to draw.
pub fn render_balance_chart(points: &[BalancePoint], period: Period) -> Result<Vec<u8>> {
    if points.is_empty() {
        return Err(Error::Chart {
            message: "no balance points to plot".to_string(),
        });
    }

    let balances: Vec<f64> = points.iter().map(|p| to_f64(p.balance)).collect();
    let (low, high) = value_range(&balances);

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    #[allow(clippy::cast_precision_loss)]
    let x_at = |i: usize| {
        if points.len() == 1 {
            MARGIN_LEFT + plot_width / 2.0
        } else {
            MARGIN_LEFT + plot_width * i as f64 / (points.len() - 1) as f64
        }
    };
    let y_at = |value: f64| MARGIN_TOP + plot_height * (high - value) / (high - low);

    let mut document = Document::new()
        .set("viewBox", format!("0 0 {WIDTH} {HEIGHT}"))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .set("font-family", "sans-serif")
        .add(title(&format!(
            "Balance per {}",
            capitalized(period.name())
        )));

    #[allow(clippy::cast_precision_loss)]
    for step in 0..=GRID_LINES {
        let value = low + (high - low) * step as f64 / GRID_LINES as f64;
        let y = y_at(value);
        document = document
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("x2", WIDTH - MARGIN_RIGHT)
                    .set("y1", y)
                    .set("y2", y)
                    .set("stroke", "#dddddd")
                    .set("stroke-width", 1),
            )
            .add(label(MARGIN_LEFT - 8.0, y + 4.0, &format!("{value:.0}")).set("text-anchor", "end"));
    }

    let x_stride = points.len().div_ceil(MAX_X_LABELS).max(1);
    for (i, point) in points.iter().enumerate() {
        if i % x_stride == 0 || i == points.len() - 1 {
            document = document.add(
                label(x_at(i), HEIGHT - MARGIN_BOTTOM + 20.0, &point.key.to_string())
                    .set("text-anchor", "middle"),
            );
        }
    }

    let line = balances
        .iter()
        .enumerate()
        .map(|(i, value)| format!("{:.2},{:.2}", x_at(i), y_at(*value)))
        .collect::<Vec<_>>()
        .join(" ");
    document = document.add(
        Polyline::new()
            .set("points", line)
            .set("fill", "none")
            .set("stroke", LINE_COLOR)
            .set("stroke-width", 2),
    );
    for (i, value) in balances.iter().enumerate() {
        document = document.add(
            Circle::new()
                .set("cx", x_at(i))
                .set("cy", y_at(*value))
                .set("r", 4)
                .set("fill", LINE_COLOR),
        );
    }

    let document = document
        .add(
            label(
                MARGIN_LEFT + plot_width / 2.0,
                HEIGHT - 12.0,
                capitalized(period.name()).as_str(),
            )
            .set("text-anchor", "middle"),
        )
        .add(
            label(20.0, MARGIN_TOP + plot_height / 2.0, "Balance")
                .set("text-anchor", "middle")
                .set(
                    "transform",
                    format!("rotate(-90 20 {})", MARGIN_TOP + plot_height / 2.0),
                ),
        );

    Ok(document.to_string().into_bytes())
}

/// Pie chart of income against expense; zero totals get no slice.
///
/// # Errors
///
/// Returns `Error::Chart` when both totals are zero.
pub fn render_share_chart(summary: &Summary) -> Result<Vec<u8>> {
    if summary.is_empty() {
        return Err(Error::Chart {
            message: "no income or expense to plot".to_string(),
        });
    }

    let size = 400.0;
    let (cx, cy, radius) = (size / 2.0, size / 2.0 + 15.0, 140.0);
    let total = to_f64(summary.income + summary.expense);
    let slices = [
        ("Income", to_f64(summary.income), INCOME_COLOR),
        ("Expense", to_f64(summary.expense), EXPENSE_COLOR),
    ];

    let mut document = Document::new()
        .set("viewBox", format!("0 0 {size} {size}"))
        .set("width", size)
        .set("height", size)
        .set("font-family", "sans-serif")
        .add(title("Your Finances"));

    // Angles in radians, clockwise from twelve o'clock
    let mut start = 0.0_f64;
    for (name, value, color) in slices.into_iter().filter(|(_, value, _)| *value > 0.0) {
        let share = value / total;
        let end = start + share * std::f64::consts::TAU;

        document = if share >= 1.0 {
            document.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", radius)
                    .set("fill", color),
            )
        } else {
            let (x0, y0) = polar(cx, cy, radius, start);
            let (x1, y1) = polar(cx, cy, radius, end);
            let large_arc = u8::from(end - start > std::f64::consts::PI);
            document.add(
                Path::new()
                    .set(
                        "d",
                        format!(
                            "M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {radius:.2} {radius:.2} 0 {large_arc} 1 {x1:.2} {y1:.2} Z"
                        ),
                    )
                    .set("fill", color)
                    .set("stroke", "white")
                    .set("stroke-width", 2),
            )
        };

        let (lx, ly) = polar(cx, cy, radius * 0.6, (start + end) / 2.0);
        document = document.add(
            label(lx, ly, &format!("{name} {:.1}%", share * 100.0))
                .set("text-anchor", "middle")
                .set("fill", "white")
                .set("font-weight", "bold"),
        );
        start = end;
    }

    Ok(document.to_string().into_bytes())
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: i128) -> f64 {
    value as f64
}

/// Plot range with some headroom; flat curves get a symmetric band around the value.
fn value_range(values: &[f64]) -> (f64, f64) {
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (high - low).abs() < f64::EPSILON {
        let pad = (high.abs() * 0.1).max(1.0);
        (low - pad, high + pad)
    } else {
        let pad = (high - low) * 0.05;
        (low - pad, high + pad)
    }
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn label(x: f64, y: f64, content: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("font-size", 12)
        .add(node::Text::new(content))
}

fn title(content: &str) -> Text {
    Text::new()
        .set("x", "50%")
        .set("y", 25)
        .set("text-anchor", "middle")
        .set("font-size", 16)
        .add(node::Text::new(content))
}
