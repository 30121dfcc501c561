//! Request descriptors for the three remote resources and the transport seam

use crate::core::error::TransportError;
use crate::core::evaluation::EvaluationResult;
use crate::core::stock::{Period, PriceSeries, StockCode, StockProfile};
use async_trait::async_trait;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// Untyped request relative to the API root. Path segments are kept apart
/// so the transport can percent-encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl RawRequest {
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request together with the response shape it is expected to produce.
#[derive(Debug)]
pub struct ApiRequest<R> {
    raw: RawRequest,
    _response: PhantomData<fn() -> R>,
}

impl<R> Clone for ApiRequest<R> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _response: PhantomData,
        }
    }
}

impl<R> ApiRequest<R> {
    fn new(method: Method, segments: &[&str], query: &[(&str, &str)]) -> Self {
        Self {
            raw: RawRequest {
                method,
                segments: segments.iter().map(|s| s.to_string()).collect(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
            _response: PhantomData,
        }
    }

    pub fn raw(&self) -> &RawRequest {
        &self.raw
    }

    pub fn method(&self) -> Method {
        self.raw.method
    }

    pub fn path(&self) -> String {
        self.raw.path()
    }
}

impl ApiRequest<StockProfile> {
    /// `GET /stocks/{code}`
    pub fn stock_profile(code: &StockCode) -> Self {
        Self::new(Method::Get, &["stocks", code.as_str()], &[])
    }
}

impl ApiRequest<PriceSeries> {
    /// `GET /stocks/{code}/prices?period=..`, one year unless given.
    pub fn price_series(code: &StockCode, period: Option<Period>) -> Self {
        let period = period.unwrap_or_default();
        Self::new(
            Method::Get,
            &["stocks", code.as_str(), "prices"],
            &[("period", period.token())],
        )
    }
}

impl ApiRequest<EvaluationResult> {
    /// `POST /evaluations?stock_code=..&period=..`; the evaluation is computed
    /// during the call and returned in the response.
    pub fn request_evaluation(code: &StockCode, period: Option<Period>) -> Self {
        let period = period.unwrap_or_default();
        Self::new(
            Method::Post,
            &["evaluations"],
            &[("stock_code", code.as_str()), ("period", period.token())],
        )
    }

    /// `GET /evaluations/{id}`
    pub fn evaluation_by_id(id: u64) -> Self {
        let id = id.to_string();
        Self::new(Method::Get, &["evaluations", &id], &[])
    }
}

/// Opaque request/response function underneath the resource clients.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RawRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}
