use super::{ResourceSlot, ResourceState, SettlementPolicy};
use crate::core::evaluation::EvaluationResult;
use crate::core::request::{ApiRequest, Transport};
use crate::core::stock::{Period, PriceSeries, StockCode, StockProfile};
use crate::providers::api::StockApi;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument, warn};

pub const PROFILE_FALLBACK: &str = "銘柄情報の取得に失敗しました";
pub const PRICES_FALLBACK: &str = "株価データの取得に失敗しました";
pub const EVALUATION_FALLBACK: &str = "評価の実行に失敗しました";

/// A slot plus the last request issued for it, kept for manual retries.
struct Resource<R> {
    slot: ResourceSlot<R>,
    last_request: Mutex<Option<ApiRequest<R>>>,
    fallback: &'static str,
}

impl<R> Resource<R> {
    fn new(name: &'static str, policy: SettlementPolicy, fallback: &'static str) -> Self {
        Self {
            slot: ResourceSlot::new(name, policy),
            last_request: Mutex::new(None),
            fallback,
        }
    }

    fn remember(&self, request: &ApiRequest<R>) {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
    }

    fn last_request(&self) -> Option<ApiRequest<R>> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reset(&self) {
        self.slot.reset();
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// State container for one stock page: profile, price series and
/// evaluation, each with an independent lifecycle.
///
/// Fetch errors never propagate out of the store; they end up as the
/// slot's error message.
pub struct StockStore<T: Transport> {
    api: StockApi<T>,
    profile: Resource<StockProfile>,
    prices: Resource<PriceSeries>,
    evaluation: Resource<EvaluationResult>,
}

impl<T: Transport> StockStore<T> {
    pub fn new(api: StockApi<T>, policy: SettlementPolicy) -> Self {
        Self {
            api,
            profile: Resource::new("profile", policy, PROFILE_FALLBACK),
            prices: Resource::new("prices", policy, PRICES_FALLBACK),
            evaluation: Resource::new("evaluation", policy, EVALUATION_FALLBACK),
        }
    }

    pub fn from_transport(transport: T, policy: SettlementPolicy) -> Self {
        Self::new(StockApi::new(transport), policy)
    }

    async fn load<R: DeserializeOwned>(&self, resource: &Resource<R>, request: ApiRequest<R>) -> bool {
        resource.remember(&request);
        let ticket = resource.slot.begin();
        let outcome = self.api.execute(&request).await.map_err(|e| {
            warn!(slot = resource.slot.name(), error = %e, "Request failed");
            e.display_message(resource.fallback)
        });
        resource.slot.settle(ticket, outcome)
    }

    async fn retry<R: DeserializeOwned>(&self, resource: &Resource<R>) -> bool {
        match resource.last_request() {
            Some(request) => {
                debug!(slot = resource.slot.name(), "Retrying last request");
                self.load(resource, request).await
            }
            None => false,
        }
    }

    /// Each fetch returns whether its outcome was applied to the slot.
    #[instrument(name = "FetchStockProfile", skip(self), fields(code = %code))]
    pub async fn fetch_profile(&self, code: &StockCode) -> bool {
        self.load(&self.profile, ApiRequest::stock_profile(code))
            .await
    }

    #[instrument(name = "FetchPriceSeries", skip(self), fields(code = %code))]
    pub async fn fetch_prices(&self, code: &StockCode, period: Option<Period>) -> bool {
        self.load(&self.prices, ApiRequest::price_series(code, period))
            .await
    }

    #[instrument(name = "RequestEvaluation", skip(self), fields(code = %code))]
    pub async fn request_evaluation(&self, code: &StockCode, period: Option<Period>) -> bool {
        self.load(
            &self.evaluation,
            ApiRequest::request_evaluation(code, period),
        )
        .await
    }

    #[instrument(name = "FetchEvaluation", skip(self))]
    pub async fn fetch_evaluation(&self, id: u64) -> bool {
        self.load(&self.evaluation, ApiRequest::evaluation_by_id(id))
            .await
    }

    /// Re-issues the last profile request. `false` if there was none.
    pub async fn retry_profile(&self) -> bool {
        self.retry(&self.profile).await
    }

    pub async fn retry_prices(&self) -> bool {
        self.retry(&self.prices).await
    }

    pub async fn retry_evaluation(&self) -> bool {
        self.retry(&self.evaluation).await
    }

    pub fn profile(&self) -> ResourceState<StockProfile> {
        self.profile.slot.snapshot()
    }

    pub fn prices(&self) -> ResourceState<PriceSeries> {
        self.prices.slot.snapshot()
    }

    pub fn evaluation(&self) -> ResourceState<EvaluationResult> {
        self.evaluation.slot.snapshot()
    }

    pub fn clear_profile_error(&self) {
        self.profile.slot.clear_error();
    }

    pub fn clear_prices_error(&self) {
        self.prices.slot.clear_error();
    }

    pub fn clear_evaluation_error(&self) {
        self.evaluation.slot.clear_error();
    }

    /// Returns every slot to its initial state, e.g. when leaving the page.
    /// Nothing is left to retry afterwards.
    pub fn reset(&self) {
        self.profile.reset();
        self.prices.reset();
        self.evaluation.reset();
    }
}
