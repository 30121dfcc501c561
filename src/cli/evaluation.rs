use super::{detail, ui};
use crate::core::evaluation::{EvaluationResult, MetricEvaluation, TechnicalIndicators};
use crate::core::numeric::NumericField;
use crate::core::request::Transport;
use crate::store::StockStore;
use comfy_table::Cell;

/// Fetches a previously computed evaluation and renders it.
pub async fn run_by_id<T: Transport>(store: &StockStore<T>, id: u64) -> String {
    let spinner = ui::new_spinner("読み込み中...");
    store.fetch_evaluation(id).await;
    spinner.finish_and_clear();

    let state = store.evaluation();
    let output = match (&state.error, &state.value) {
        (Some(error), _) => detail::render_error(error),
        (None, Some(result)) => result.display_as_report(),
        (None, None) => "評価結果が見つかりません".to_string(),
    };
    store.reset();
    output
}

impl EvaluationResult {
    pub fn display_scores(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(""),
            ui::header_cell("スコア"),
            ui::header_cell("推奨度"),
        ]);
        table.add_row(vec![
            ui::label_cell("買い"),
            ui::score_cell(self.buy_score),
            ui::recommendation_cell(&self.buy_recommendation),
        ]);
        table.add_row(vec![
            ui::label_cell("売り"),
            ui::score_cell(self.sell_score),
            ui::recommendation_cell(&self.sell_recommendation),
        ]);
        table.to_string()
    }

    pub fn display_as_report(&self) -> String {
        let mut output = format!(
            "評価結果: {} ({})\n",
            ui::style_text(&self.stock_name, ui::StyleType::Title),
            self.stock_code
        );
        if let Some(at) = self.evaluated_at() {
            output.push_str(&ui::style_text(
                &format!("評価日時: {}\n", at.format("%Y-%m-%d %H:%M")),
                ui::StyleType::Subtle,
            ));
        }
        output.push('\n');
        output.push_str(&self.display_scores());

        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("買いシグナル", ui::StyleType::Label),
            ui::bullet_list(&self.buy_signal.reasons)
        ));
        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("売りシグナル", ui::StyleType::Label),
            ui::bullet_list(&self.sell_signal.reasons)
        ));

        output.push_str(&format!(
            "\n\n{}\n{}",
            ui::style_text("テクニカル指標", ui::StyleType::Label),
            self.technical_indicators.display_as_table()
        ));

        let fundamentals = &self.fundamental_metrics;
        output.push_str(&format!(
            "\n\n{}\n  総合スコア: {} ({})\n  PER評価: {}\n  PBR評価: {}",
            ui::style_text("ファンダメンタル指標", ui::StyleType::Label),
            ui::format_number(fundamentals.score, |s| format!("{s:.0}")),
            fundamentals.evaluation,
            metric_text(&fundamentals.per_evaluation),
            metric_text(&fundamentals.pbr_evaluation),
        ));

        output
    }
}

fn metric_text(metric: &MetricEvaluation) -> &str {
    if metric.description.is_empty() {
        "N/A"
    } else {
        &metric.description
    }
}

fn plain(v: f64) -> String {
    format!("{v:.2}")
}

impl TechnicalIndicators {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("指標"), ui::header_cell("値")]);

        let rows: [(&str, NumericField, fn(f64) -> String); 12] = [
            ("RSI", self.rsi, plain),
            ("移動平均（短期）", self.moving_averages.ma_short, ui::yen),
            ("移動平均（中期）", self.moving_averages.ma_medium, ui::yen),
            ("移動平均（長期）", self.moving_averages.ma_long, ui::yen),
            ("MACD", self.macd.macd, plain),
            ("MACDシグナル", self.macd.signal, plain),
            ("MACDヒストグラム", self.macd.histogram, plain),
            ("ボリンジャー上限", self.bollinger_bands.upper, ui::yen),
            ("ボリンジャー中心", self.bollinger_bands.middle, ui::yen),
            ("ボリンジャー下限", self.bollinger_bands.lower, ui::yen),
            ("サポート", self.support_resistance.support, ui::yen),
            ("レジスタンス", self.support_resistance.resistance, ui::yen),
        ];
        for (label, value, format_fn) in rows {
            table.add_row(vec![Cell::new(label), ui::numeric_cell(value, format_fn)]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(buy_score: &str) -> EvaluationResult {
        let json = format!(
            r#"{{
            "stock_code": "7203",
            "stock_name": "トヨタ自動車",
            "buy_score": {buy_score},
            "sell_score": 20,
            "buy_recommendation": "強力",
            "sell_recommendation": "謎",
            "technical_indicators": {{"rsi": "abc", "moving_averages": {{"ma_short": 2510.4}}}},
            "fundamental_metrics": {{"score": 70, "evaluation": "良好",
                "per_evaluation": {{"description": "PER 8.50は割安水準です"}}}},
            "buy_signal": {{"score": 82, "recommendation": "強力", "reasons": ["PERが割安"]}},
            "sell_signal": {{"score": 20, "recommendation": "謎", "reasons": []}},
            "evaluation_date": "2024-05-01T10:15:30"
        }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_report_contains_sections() {
        let report = sample("82").display_as_report();
        assert!(report.contains("トヨタ自動車"));
        assert!(report.contains("82"));
        assert!(report.contains("強力"));
        assert!(report.contains("謎"));
        assert!(report.contains("PERが割安"));
        assert!(report.contains("2,510.40円"));
        assert!(report.contains("PER 8.50は割安水準です"));
        assert!(report.contains("PBR評価: N/A"));
    }

    #[test]
    fn test_unparseable_values_render_as_na() {
        let eval = sample(r#""n/a""#);
        assert!(eval.buy_score.is_nan());
        let scores = eval.display_scores();
        assert!(scores.contains("N/A"));
        let indicators = eval.technical_indicators.display_as_table();
        assert!(indicators.contains("N/A"));
    }
}
