// Ridebook
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Building blocks for the HTTP layer of a service.
//!
//! A service exposes an `app` function in its `rest` module that returns its `axum::Router`, and
//! puts each API in a file of its own named `<entity>_<method>.rs`.  The tests of an API live in
//! that same file and start with a `route` function returning the method and path under test, so
//! that every test in the file is guaranteed to exercise the same API.
//!
//! Failures are rendered as an `ErrorResponse` JSON object.

use async_trait::async_trait;
use axum::Json;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// JSON body of every failed request.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Kind of the failure, as a `SCREAMING_SNAKE_CASE` tag that clients can match on.
    pub error_code: String,

    /// Human-readable description of the failure.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a response of kind `error_code` described by `message`.
    pub fn new<C: Into<String>, M: Into<String>>(error_code: C, message: M) -> Self {
        Self { error_code: error_code.into(), message: message.into() }
    }
}

/// Rejection of `EmptyBody` for requests that carry a payload.
///
/// The caller only sees an opaque server error, same as any other failure that is not about the
/// data it submitted.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Content should be empty")]
pub struct PayloadNotEmpty;

impl IntoResponse for PayloadNotEmpty {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new("SERVER_ERROR", "Unknown error");
        (http::StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Extractor for APIs that take no payload.  Requests that send one anyway are refused.
pub struct EmptyBody;

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = PayloadNotEmpty;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() { Ok(EmptyBody) } else { Err(PayloadNotEmpty) }
    }
}

/// In-process harness to send requests to a `Router` and check its responses.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{self, HeaderName, HeaderValue};
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Largest response body that tests are willing to read.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// The response type produced by a `Router`.
    type HttpResponse = http::Response<Body>;

    /// A request under construction, sent to the app exactly once.
    #[must_use]
    pub struct OneShotBuilder {
        /// App that receives the request.
        app: Router,

        /// Method of the request.
        method: http::Method,

        /// Path of the request.
        path: String,

        /// Encoded query string, if any.
        query: Option<String>,

        /// Headers to attach, in insertion order.
        headers: Vec<(HeaderName, HeaderValue)>,
    }

    impl OneShotBuilder {
        /// Prepares a request to `app` for the `(method, path)` pair returned by a `route` helper.
        pub fn new<U: AsRef<str>>(app: Router, (method, path): (http::Method, U)) -> Self {
            let path = path.as_ref().to_owned();
            Self { app, method, path, query: None, headers: vec![] }
        }

        /// Sets the query string to the URL encoding of `query`.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            assert!(self.query.is_none(), "Query already set for {}", self.path);
            self.query = Some(serde_urlencoded::to_string(query).unwrap());
            self
        }

        /// Adds the header `name` with `value` to the request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: std::fmt::Debug,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: std::fmt::Debug,
        {
            let name = HeaderName::try_from(name).unwrap();
            let value = HeaderValue::try_from(value).unwrap();
            self.headers.push((name, value));
            self
        }

        /// Sends the request with `body` as its payload.
        async fn send(self, body: Body) -> ResponseChecker {
            let uri = match self.query {
                Some(query) => format!("{}?{}", self.path, query),
                None => self.path,
            };
            let mut builder = Request::builder().method(self.method).uri(uri);
            for (name, value) in self.headers {
                builder = builder.header(name, value);
            }
            let response = self.app.oneshot(builder.body(body).unwrap()).await.unwrap();
            ResponseChecker { response, exp_status: http::StatusCode::OK }
        }

        /// Sends the request without a payload.
        pub async fn send_empty(self) -> ResponseChecker {
            self.send(Body::empty()).await
        }

        /// Sends the request with a `text/plain` payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            self.with_header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
                .send(Body::from(text.into()))
                .await
        }

        /// Sends the request with the JSON serialization of `payload`.
        pub async fn send_json<T: Serialize>(self, payload: T) -> ResponseChecker {
            let payload = serde_json::to_vec(&payload).unwrap();
            self.with_header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .send(Body::from(payload))
                .await
        }
    }

    /// Expectations on a response.  The status defaults to `200 OK`.
    #[must_use]
    pub struct ResponseChecker {
        /// Response returned by the app.
        response: HttpResponse,

        /// Status that the response must carry.
        exp_status: http::StatusCode,
    }

    impl ResponseChecker {
        /// Expects the response to carry `status` instead of `200 OK`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Checks the status and returns the body as text.
        async fn body_text(self) -> String {
            assert_eq!(self.exp_status, self.response.status());
            let body = self.response.into_body();
            let bytes = axum::body::to_bytes(body, MAX_BODY_SIZE).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        /// Expects an `ErrorResponse` of kind `exp_code` whose message matches `exp_re`.
        pub async fn expect_error(self, exp_code: &str, exp_re: &str) {
            let body = self.body_text().await;
            let response = serde_json::from_str::<ErrorResponse>(&body)
                .unwrap_or_else(|e| panic!("Body is not an ErrorResponse ({}): {}", e, body));
            assert_eq!(exp_code, response.error_code, "Wrong error kind in {:?}", response);
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&response.message), "{:?} does not match '{}'", response, exp_re);
        }

        /// Expects a JSON body that deserializes into `T` and returns it.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            let body = self.body_text().await;
            serde_json::from_str::<T>(&body)
                .unwrap_or_else(|e| panic!("Body is not the expected JSON ({}): {}", e, body))
        }

        /// Expects a plain body, not an `ErrorResponse`, that matches `exp_re`.
        pub async fn expect_text(self, exp_re: &str) {
            let body = self.body_text().await;
            assert!(
                serde_json::from_str::<ErrorResponse>(&body).is_err(),
                "Got an ErrorResponse; use expect_error instead: {}",
                body
            );
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "'{}' does not match '{}'", body, exp_re);
        }

        /// Checks the status and hands out the raw response for checks not covered above.
        pub fn take_response(self) -> HttpResponse {
            assert_eq!(self.exp_status, self.response.status());
            self.response
        }
    }

    /// Defines a test that an API taking JSON refuses other content types and malformed JSON.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("{\"looks\": \"like json\"}")
                    .await
                    .expect_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE)
                    .expect_text("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("{broken")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_text("key must be a string")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Defines a test that an API taking no payload refuses requests that carry one.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("unexpected")
                    .await
                    .expect_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                    .expect_error("SERVER_ERROR", "^Unknown error$")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}
