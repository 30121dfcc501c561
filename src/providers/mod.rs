pub mod api;
pub mod http;

pub use api::StockApi;
pub use http::HttpTransport;
