use crate::core::error::ApiError;
use crate::core::request::{ApiRequest, Transport};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Resource client for the stock backend. Each call is a single request
/// with no retries or caching.
pub struct StockApi<T: Transport> {
    transport: T,
}

impl<T: Transport> StockApi<T> {
    pub fn new(transport: T) -> Self {
        StockApi { transport }
    }

    /// Sends `request` and decodes the response into its declared shape.
    #[instrument(
        name = "ApiExecute",
        skip(self, request),
        fields(method = %request.method(), path = %request.path())
    )]
    pub async fn execute<R: DeserializeOwned>(&self, request: &ApiRequest<R>) -> Result<R, ApiError> {
        let response = self.transport.send(request.raw()).await?;
        if !response.is_success() {
            debug!(status = response.status, "Request failed");
            return Err(ApiError::from_response(response.status, &response.body));
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
