use crate::core::classify::{RecommendationTier, ScoreTier, score_tier};
use crate::core::evaluation::RecommendationLabel;
use crate::core::numeric::NumericField;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn label_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Formats a number, or "N/A" when it is not finite.
pub fn format_number(value: f64, format_fn: impl Fn(f64) -> String) -> String {
    if value.is_finite() {
        format_fn(value)
    } else {
        "N/A".to_string()
    }
}

/// Fixed-point text with thousands separators, e.g. `2,500.00`.
pub fn group_digits(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// Yen amount with grouped digits, e.g. `2,500.00円`.
pub fn yen(value: f64) -> String {
    format!("{}円", group_digits(value, 2))
}

/// Right-aligned numeric cell; absent and unparseable values show as "N/A".
pub fn numeric_cell(value: NumericField, format_fn: impl Fn(f64) -> String) -> Cell {
    value.finite().map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

pub fn price_cell(value: f64) -> Cell {
    Cell::new(format_number(value, |v| group_digits(v, 2))).set_alignment(CellAlignment::Right)
}

pub fn score_color(tier: ScoreTier) -> Color {
    match tier {
        ScoreTier::High => Color::Green,
        ScoreTier::Medium => Color::Yellow,
        ScoreTier::Low => Color::Red,
    }
}

pub fn recommendation_color(tier: RecommendationTier) -> Color {
    match tier {
        RecommendationTier::Strong => Color::Green,
        RecommendationTier::Favorable => Color::Cyan,
        RecommendationTier::Caution => Color::Yellow,
        RecommendationTier::Unfavorable => Color::Red,
        RecommendationTier::Unknown => Color::DarkGrey,
    }
}

/// Score coloured by its tier.
pub fn score_cell(score: f64) -> Cell {
    Cell::new(format_number(score, |s| format!("{s:.0}")))
        .fg(score_color(score_tier(score)))
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Right)
}

/// Recommendation label coloured by its tier.
pub fn recommendation_cell(label: &RecommendationLabel) -> Cell {
    let text = if label.as_str().is_empty() {
        "-"
    } else {
        label.as_str()
    };
    Cell::new(text)
        .fg(recommendation_color(label.tier()))
        .add_attribute(Attribute::Bold)
}

/// Spinner shown while a fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bulleted list, or a dimmed placeholder when empty.
pub fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return style_text("  (なし)", StyleType::Subtle);
    }
    items
        .iter()
        .map(|item| format!("  • {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_guards_nan() {
        assert_eq!(format_number(f64::NAN, |v| format!("{v:.2}")), "N/A");
        assert_eq!(format_number(f64::INFINITY, |v| format!("{v:.2}")), "N/A");
        assert_eq!(format_number(1.5, |v| format!("{v:.2}")), "1.50");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(2500.0, 2), "2,500.00");
        assert_eq!(group_digits(35_000_000_000_000.0 / 1e8, 2), "350,000.00");
        assert_eq!(group_digits(999.999, 2), "1,000.00");
        assert_eq!(group_digits(1_234_567.0, 0), "1,234,567");
        assert_eq!(group_digits(-1050.5, 1), "-1,050.5");
        assert_eq!(group_digits(12.5, 2), "12.50");
        assert_eq!(yen(2510.4), "2,510.40円");
        assert_eq!(price_cell(1050.5).content(), "1,050.50");
    }

    #[test]
    fn test_numeric_cell_content() {
        assert_eq!(numeric_cell(NumericField::Absent, |v| v.to_string()).content(), "N/A");
        assert_eq!(
            numeric_cell(NumericField::Unparseable, |v| v.to_string()).content(),
            "N/A"
        );
        assert_eq!(
            numeric_cell(NumericField::Number(12.5), |v| format!("{v:.2}")).content(),
            "12.50"
        );
    }

    #[test]
    fn test_tier_colors() {
        assert_eq!(score_color(score_tier(82.0)), Color::Green);
        assert_eq!(score_color(score_tier(55.0)), Color::Yellow);
        assert_eq!(score_color(score_tier(f64::NAN)), Color::Red);
        assert_eq!(
            recommendation_color(RecommendationLabel::parse("様子見").tier()),
            Color::Red
        );
        assert_eq!(
            recommendation_color(RecommendationLabel::parse("???").tier()),
            Color::DarkGrey
        );
    }

    #[test]
    fn test_bullet_list() {
        let items = vec!["RSIが低水準".to_string(), "PERが割安".to_string()];
        assert_eq!(bullet_list(&items), "  • RSIが低水準\n  • PERが割安");
        assert!(bullet_list(&[]).contains("(なし)"));
    }
}
