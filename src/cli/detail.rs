use super::ui;
use crate::core::request::Transport;
use crate::core::stock::{Period, PriceSeries, StockCode, StockProfile};
use crate::store::{Phase, StockStore};
use comfy_table::Cell;
use tracing::info;

/// Number of most recent bars shown in the price table.
pub const PRICE_ROWS: usize = 10;

impl StockProfile {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("項目"), ui::header_cell("値")]);

        // Absent fields are left out entirely
        if !self.current_price.is_absent() {
            table.add_row(vec![
                ui::label_cell("現在の株価"),
                ui::numeric_cell(self.current_price, ui::yen),
            ]);
        }
        if let Some(sector) = &self.sector {
            table.add_row(vec![ui::label_cell("業種"), Cell::new(sector)]);
        }
        if !self.market_cap.is_absent() {
            table.add_row(vec![
                ui::label_cell("時価総額"),
                ui::numeric_cell(self.market_cap, |m| {
                    format!("{}億円", ui::group_digits(m / 1e8, 2))
                }),
            ]);
        }
        if !self.per.is_absent() {
            table.add_row(vec![
                ui::label_cell("PER"),
                ui::numeric_cell(self.per, |v| format!("{v:.2}")),
            ]);
        }
        if !self.pbr.is_absent() {
            table.add_row(vec![
                ui::label_cell("PBR"),
                ui::numeric_cell(self.pbr, |v| format!("{v:.2}")),
            ]);
        }

        format!(
            "{} ({})\n{}",
            ui::style_text(&self.name, ui::StyleType::Title),
            self.code,
            table
        )
    }
}

impl PriceSeries {
    /// Most recent `rows` bars, oldest first.
    pub fn display_as_table(&self, rows: usize) -> String {
        if self.prices.is_empty() {
            return "データがありません".to_string();
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("日付"),
            ui::header_cell("始値"),
            ui::header_cell("高値"),
            ui::header_cell("安値"),
            ui::header_cell("終値"),
            ui::header_cell("出来高"),
        ]);

        let skip = self.prices.len().saturating_sub(rows);
        for point in self.prices.iter().skip(skip) {
            table.add_row(vec![
                Cell::new(point.date.format("%Y-%m-%d")),
                ui::price_cell(point.open),
                ui::price_cell(point.high),
                ui::price_cell(point.low),
                ui::price_cell(point.close),
                Cell::new(ui::format_number(point.volume, |v| ui::group_digits(v, 0))),
            ]);
        }

        format!(
            "期間: {} ({}件)\n{}",
            self.period.label(),
            self.prices.len(),
            table
        )
    }
}

/// One stock page: owns its store and the selected period. Closing the view
/// resets the store.
pub struct StockDetailView<T: Transport> {
    store: StockStore<T>,
    code: StockCode,
    period: Period,
}

impl<T: Transport> StockDetailView<T> {
    pub fn new(store: StockStore<T>, code: StockCode, period: Period) -> Self {
        Self {
            store,
            code,
            period,
        }
    }

    pub fn store(&self) -> &StockStore<T> {
        &self.store
    }

    pub fn code(&self) -> &StockCode {
        &self.code
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Loads profile and prices together.
    pub async fn open(&self) {
        info!(code = %self.code, period = %self.period, "Opening stock page");
        futures::join!(
            self.store.fetch_profile(&self.code),
            self.store.fetch_prices(&self.code, Some(self.period))
        );
    }

    /// Switches period and reloads only the price series.
    pub async fn change_period(&mut self, period: Period) {
        self.period = period;
        self.store.fetch_prices(&self.code, Some(period)).await;
    }

    pub async fn evaluate(&self) {
        self.store
            .request_evaluation(&self.code, Some(self.period))
            .await;
    }

    /// Retries whatever failed, with the same parameters as before.
    pub async fn retry(&self) {
        let profile_failed = self.store.profile().phase() == Phase::Failed;
        let prices_failed = self.store.prices().phase() == Phase::Failed;
        let evaluation_failed = self.store.evaluation().phase() == Phase::Failed;
        futures::join!(
            async {
                if profile_failed {
                    self.store.retry_profile().await;
                }
            },
            async {
                if prices_failed {
                    self.store.retry_prices().await;
                }
            },
            async {
                if evaluation_failed {
                    self.store.retry_evaluation().await;
                }
            }
        );
    }

    pub fn close(&self) {
        info!(code = %self.code, "Closing stock page");
        self.store.reset();
    }

    /// Renders the page from the current store state.
    pub fn render(&self) -> String {
        let profile = self.store.profile();
        if let Some(error) = &profile.error {
            return render_error(error);
        }
        let Some(stock) = &profile.value else {
            return if profile.loading {
                "読み込み中...".to_string()
            } else {
                "銘柄情報が見つかりません".to_string()
            };
        };

        let mut output = stock.display_as_table();

        let prices = self.store.prices();
        if let Some(error) = &prices.error {
            output.push_str("\n\n");
            output.push_str(&render_error(error));
        } else if let Some(series) = &prices.value {
            output.push_str("\n\n");
            output.push_str(&series.display_as_table(PRICE_ROWS));
        }

        let evaluation = self.store.evaluation();
        if let Some(error) = &evaluation.error {
            output.push_str("\n\n");
            output.push_str(&render_error(error));
        } else if let Some(result) = &evaluation.value {
            output.push_str("\n\n");
            output.push_str(&result.display_as_report());
        } else if evaluation.loading {
            output.push_str("\n\n評価中...");
        }

        output
    }
}

/// Loads a stock page once and renders it.
pub async fn run_show<T: Transport>(view: StockDetailView<T>) -> String {
    let spinner = ui::new_spinner("読み込み中...");
    view.open().await;
    spinner.finish_and_clear();

    let output = view.render();
    view.close();
    output
}

/// Loads a stock page and runs an evaluation for the selected period.
pub async fn run_evaluate<T: Transport>(view: StockDetailView<T>) -> String {
    let spinner = ui::new_spinner("評価中...");
    futures::join!(view.open(), view.evaluate());
    spinner.finish_and_clear();

    let output = view.render();
    view.close();
    output
}

pub fn render_error(message: &str) -> String {
    format!(
        "{}\n{}",
        ui::style_text(message, ui::StyleType::Error),
        ui::style_text("再試行するにはもう一度実行してください", ui::StyleType::Subtle)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TransportError;
    use crate::core::request::{RawRequest, RawResponse};
    use crate::store::SettlementPolicy;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Serves fixed bodies by path and records the requests it saw.
    struct FakeBackend {
        fail_profile: bool,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for FakeBackend {
        async fn send(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
            let path = request.path();
            let period = request.query_value("period").unwrap_or("1y").to_string();
            self.seen
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, path));

            let body = match path.as_str() {
                "/stocks/7203" if self.fail_profile => {
                    return Ok(RawResponse {
                        status: 500,
                        body: r#"{"error": {"message": "サーバーエラー"}}"#.to_string(),
                    });
                }
                "/stocks/7203" => r#"{"code": "7203", "name": "トヨタ自動車", "sector": "自動車",
                    "market_cap": 35000000000000, "current_price": "2500", "per": null}"#
                    .to_string(),
                "/stocks/7203/prices" => format!(
                    r#"{{"stock_code": "7203", "stock_name": "トヨタ自動車", "period": "{period}",
                        "prices": [{{"date": "2024-01-04", "open": 1, "high": 2, "low": 1, "close": "1.5", "volume": 10}}]}}"#
                ),
                _ => return Err(TransportError::Network("unreachable".into())),
            };
            Ok(RawResponse { status: 200, body })
        }
    }

    fn view_with_backend(fail_profile: bool) -> (StockDetailView<Arc<FakeBackend>>, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend {
            fail_profile,
            seen: Mutex::new(Vec::new()),
        });
        let view = StockDetailView::new(
            StockStore::from_transport(Arc::clone(&backend), SettlementPolicy::LastSettled),
            StockCode::new("7203").unwrap(),
            Period::OneYear,
        );
        (view, backend)
    }

    fn view(fail_profile: bool) -> StockDetailView<Arc<FakeBackend>> {
        view_with_backend(fail_profile).0
    }

    #[tokio::test]
    async fn test_open_renders_profile_and_prices() {
        let view = view(false);
        assert_eq!(view.render(), "銘柄情報が見つかりません");

        view.open().await;
        let page = view.render();
        assert!(page.contains("トヨタ自動車"));
        assert!(page.contains("350,000.00億円"));
        assert!(page.contains("2,500.00円"));
        assert!(!page.contains("PER"));
        assert!(page.contains("2024-01-04"));
        assert!(page.contains("1.50"));
    }

    #[tokio::test]
    async fn test_change_period_refetches_prices_only() {
        let (mut view, backend) = view_with_backend(false);
        view.open().await;
        view.change_period(Period::OneWeek).await;

        assert_eq!(view.period(), Period::OneWeek);
        let series = view.store().prices().value.unwrap();
        assert_eq!(series.period, Period::OneWeek);

        let seen = backend.seen.lock().unwrap().clone();
        let profile_requests = seen.iter().filter(|r| *r == "GET /stocks/7203").count();
        let price_requests = seen
            .iter()
            .filter(|r| *r == "GET /stocks/7203/prices")
            .count();
        assert_eq!(profile_requests, 1);
        assert_eq!(price_requests, 2);
    }

    #[tokio::test]
    async fn test_failed_profile_renders_error() {
        let view = view(true);
        view.open().await;
        let page = view.render();
        assert!(page.contains("サーバーエラー"));

        // Dismissing the banner leaves no profile to show
        view.store().clear_profile_error();
        assert_eq!(view.render(), "銘柄情報が見つかりません");
    }

    #[tokio::test]
    async fn test_evaluation_failure_is_contained() {
        let view = view(false);
        view.open().await;
        view.evaluate().await;

        let page = view.render();
        assert!(page.contains("unreachable"));
        assert!(page.contains("トヨタ自動車"));

        view.retry().await;
        assert!(view.store().evaluation().error.is_some());
    }

    #[tokio::test]
    async fn test_close_resets_store() {
        let view = view(false);
        view.open().await;
        view.close();
        assert!(view.store().profile().value.is_none());
        assert!(view.store().prices().value.is_none());
    }

    #[test]
    fn test_unparseable_field_shown_absent_field_hidden() {
        let profile: StockProfile = serde_json::from_str(
            r#"{"code": "7203", "name": "トヨタ自動車", "per": "n/a", "pbr": null}"#,
        )
        .unwrap();
        let table = profile.display_as_table();
        assert!(table.contains("PER"));
        assert!(table.contains("N/A"));
        assert!(!table.contains("PBR"));
        assert!(!table.contains("時価総額"));
    }

    #[test]
    fn test_empty_series_message() {
        let series: PriceSeries = serde_json::from_str(
            r#"{"stock_code": "7203", "stock_name": "トヨタ自動車", "period": "1d", "prices": []}"#,
        )
        .unwrap();
        assert_eq!(series.display_as_table(PRICE_ROWS), "データがありません");
    }
}
