//! # Cart Transport
//!
//! Thin request layer over the storefront cart endpoints.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Endpoints                                    │
//! │                                                                         │
//! │  GET  <root>cart.js?ts=…      ──► full cart JSON (fetch, timed out)    │
//! │  POST <root>cart/change.js    ──► {line, quantity} ──► full cart JSON  │
//! │  POST <root>cart/add.js       ──► form-encoded id+quantity             │
//! │                                                                         │
//! │  FAILURE MAPPING                                                        │
//! │  ───────────────                                                        │
//! │  network reject / timeout / DNS  → TransportError::Unreachable          │
//! │  non-2xx status                  → TransportError::HttpStatus(code)     │
//! │  body not a JSON object/array    → TransportError::InvalidPayload       │
//! │                                                                         │
//! │  NO RETRIES HERE. Retry policy belongs to the caller; the drawer        │
//! │  chooses not to retry at all.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use vista_core::snapshot::{CartSnapshot, WireCart};

use crate::error::{DrawerResult, TransportError};

// =============================================================================
// Transport Trait
// =============================================================================

/// The remote cart contract, as the controller sees it.
#[async_trait]
pub trait CartTransport: Send + Sync {
    /// Fetches the current cart. Aborted after the configured timeout.
    async fn fetch_cart(&self) -> Result<CartSnapshot, TransportError>;

    /// Sets the quantity of the line at a 1-indexed position and returns
    /// the resulting cart. Quantity 0 removes the line. Not timed out.
    async fn change_line(&self, position: u32, quantity: u32)
        -> Result<CartSnapshot, TransportError>;

    /// Adds a variant to the cart. Used by the add-to-cart flow, which then
    /// asks the drawer to open and refresh rather than trusting this
    /// response for rendering.
    async fn add_item(&self, variant_id: u64, quantity: u32) -> Result<(), TransportError>;
}

// =============================================================================
// Transport Configuration
// =============================================================================

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Absolute store root the endpoints are joined onto, e.g.
    /// `https://shop.example/` or a locale-prefixed root.
    pub root: String,

    /// Abort threshold for cart fetches.
    pub fetch_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            root: String::new(),
            fetch_timeout: Duration::from_millis(8000),
        }
    }
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// Body of a change-line mutation.
#[derive(Debug, Serialize)]
struct ChangeRequest {
    line: u32,
    quantity: u32,
}

/// HTTP implementation of [`CartTransport`] over the storefront endpoints.
pub struct HttpCartTransport {
    client: reqwest::Client,
    fetch_url: Url,
    change_url: Url,
    add_url: Url,
    fetch_timeout: Duration,
}

impl HttpCartTransport {
    /// Builds a transport. Fails if the root is not an absolute URL the
    /// endpoints can be joined onto.
    pub fn new(config: TransportConfig) -> DrawerResult<Self> {
        let root = Url::parse(&config.root)?;
        Ok(HttpCartTransport {
            client: reqwest::Client::new(),
            fetch_url: root.join("cart.js")?,
            change_url: root.join("cart/change.js")?,
            add_url: root.join("cart/add.js")?,
            fetch_timeout: config.fetch_timeout,
        })
    }

    /// Parses a response body into a snapshot.
    ///
    /// The storefront serves an HTML error page with status 200 in some
    /// misconfigurations, so the body is checked for a JSON object/array
    /// prefix before parsing.
    fn parse_cart_body(body: &str) -> Result<CartSnapshot, TransportError> {
        let trimmed = body.trim_start();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            let sample: String = trimmed.chars().take(80).collect();
            warn!(%sample, "cart payload is not JSON");
            return Err(TransportError::InvalidPayload(
                "expected a JSON object or array".into(),
            ));
        }
        let wire: WireCart = serde_json::from_str(trimmed)?;
        Ok(CartSnapshot::from(wire))
    }

    fn status_check(status: reqwest::StatusCode) -> Result<(), TransportError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::HttpStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl CartTransport for HttpCartTransport {
    async fn fetch_cart(&self) -> Result<CartSnapshot, TransportError> {
        // Cache-busting timestamp: some CDN layers cache cart.js per URL.
        let mut url = self.fetch_url.clone();
        url.query_pairs_mut()
            .append_pair("ts", &chrono::Utc::now().timestamp_millis().to_string());

        debug!(%url, "fetching cart");
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::status_check(response.status())?;
        let body = response.text().await?;
        Self::parse_cart_body(&body)
    }

    async fn change_line(
        &self,
        position: u32,
        quantity: u32,
    ) -> Result<CartSnapshot, TransportError> {
        debug!(position, quantity, "changing cart line");
        let response = self
            .client
            .post(self.change_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&ChangeRequest {
                line: position,
                quantity,
            })
            .send()
            .await?;

        Self::status_check(response.status())?;
        let body = response.text().await?;
        Self::parse_cart_body(&body)
    }

    async fn add_item(&self, variant_id: u64, quantity: u32) -> Result<(), TransportError> {
        debug!(variant_id, quantity, "adding to cart");
        let response = self
            .client
            .post(self.add_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("id", variant_id.to_string()),
                ("quantity", quantity.to_string()),
            ])
            .send()
            .await?;

        Self::status_check(response.status())?;

        // The added-item payload is acknowledged but not rendered from; a
        // non-JSON body still signals something is wrong upstream.
        let body = response.text().await?;
        let trimmed = body.trim_start();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Err(TransportError::InvalidPayload(
                "expected a JSON object or array".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Scripted Fake (test builds only)
// =============================================================================

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// One scripted change-line response: waits `delay`, then resolves.
    pub struct ScriptedChange {
        pub delay: Duration,
        pub result: Result<CartSnapshot, TransportError>,
    }

    /// Transport fake fed from response queues, recording every call.
    #[derive(Default)]
    pub struct FakeTransport {
        pub fetch_results: Mutex<VecDeque<Result<CartSnapshot, TransportError>>>,
        pub fetch_calls: AtomicUsize,
        pub change_results: Mutex<VecDeque<ScriptedChange>>,
        pub change_calls: Mutex<Vec<(u32, u32)>>,
        pub add_calls: Mutex<Vec<(u64, u32)>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            FakeTransport::default()
        }

        pub fn push_fetch(&self, result: Result<CartSnapshot, TransportError>) {
            self.fetch_results.lock().unwrap().push_back(result);
        }

        pub fn push_change(&self, result: Result<CartSnapshot, TransportError>) {
            self.push_change_delayed(Duration::ZERO, result);
        }

        pub fn push_change_delayed(
            &self,
            delay: Duration,
            result: Result<CartSnapshot, TransportError>,
        ) {
            self.change_results
                .lock()
                .unwrap()
                .push_back(ScriptedChange { delay, result });
        }
    }

    #[async_trait]
    impl CartTransport for FakeTransport {
        async fn fetch_cart(&self) -> Result<CartSnapshot, TransportError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Unreachable("unscripted fetch".into())))
        }

        async fn change_line(
            &self,
            position: u32,
            quantity: u32,
        ) -> Result<CartSnapshot, TransportError> {
            self.change_calls.lock().unwrap().push((position, quantity));
            let scripted = self.change_results.lock().unwrap().pop_front();
            match scripted {
                Some(change) => {
                    if !change.delay.is_zero() {
                        tokio::time::sleep(change.delay).await;
                    }
                    change.result
                }
                None => Err(TransportError::Unreachable("unscripted change".into())),
            }
        }

        async fn add_item(&self, variant_id: u64, quantity: u32) -> Result<(), TransportError> {
            self.add_calls.lock().unwrap().push((variant_id, quantity));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_valid_cart_body() {
        let body = r#"{"item_count": 4, "currency": "GBP", "items_subtotal_price": 1700,
            "items": [{"title": "Mug", "quantity": 4, "line_price": 1700}]}"#;
        let snapshot = HttpCartTransport::parse_cart_body(body).unwrap();
        assert_eq!(snapshot.item_count, 4);
        assert_eq!(snapshot.lines.len(), 1);
    }

    #[test]
    fn test_html_body_is_invalid_payload() {
        let err = HttpCartTransport::parse_cart_body("<!doctype html><html>…").unwrap_err();
        assert!(matches!(err, TransportError::InvalidPayload(_)));
    }

    #[test]
    fn test_empty_body_is_invalid_payload() {
        let err = HttpCartTransport::parse_cart_body("").unwrap_err();
        assert!(matches!(err, TransportError::InvalidPayload(_)));
    }

    #[test]
    fn test_json_array_body_fails_cart_parse() {
        // Passes the prefix check but is not a cart object.
        let err = HttpCartTransport::parse_cart_body("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, TransportError::InvalidPayload(_)));
    }

    #[test]
    fn test_status_check() {
        assert!(HttpCartTransport::status_check(reqwest::StatusCode::OK).is_ok());
        let err = HttpCartTransport::status_check(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
            .unwrap_err();
        assert!(matches!(err, TransportError::HttpStatus(500)));
    }

    #[test]
    fn test_relative_root_is_rejected() {
        let result = HttpCartTransport::new(TransportConfig {
            root: "/".into(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoints_join_onto_root() {
        let transport = HttpCartTransport::new(TransportConfig {
            root: "https://shop.example/en-gb/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            transport.change_url.as_str(),
            "https://shop.example/en-gb/cart/change.js"
        );
    }
}
