//! Testing utilities for queuewatch.
//!
//! Enabled with the `testing` feature.

mod mock_http;

pub use mock_http::{
    BoxedHandler, MockHttp, MockHttpBuilder, MockRequest, MockResponse, RecordedRequest,
};
