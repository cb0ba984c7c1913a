// ABOUTME: USD to BRL exchange-rate fetcher used by the sales report.
// ABOUTME: Blocking reqwest on a worker thread; the fetcher never touches the store.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use thiserror::Error;

const QUOTE_URL: &str = "https://economia.awesomeapi.com.br/last/USD-BRL";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while fetching the exchange rate.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote response is missing the USDBRL bid")]
    MissingBid,

    #[error("quote bid is not a number: {0}")]
    BadBid(String),
}

/// Source of the USD to BRL rate. The report falls back to a manual
/// rate when fetching fails.
pub trait QuoteFetcher {
    fn usd_brl(&self) -> Result<f64, QuoteError>;
}

/// Fetcher backed by the AwesomeAPI currency service.
pub struct AwesomeApiQuotes {
    client: reqwest::blocking::Client,
    url: String,
}

impl AwesomeApiQuotes {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_url(QUOTE_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, QuoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl QuoteFetcher for AwesomeApiQuotes {
    fn usd_brl(&self) -> Result<f64, QuoteError> {
        let body: serde_json::Value = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .json()?;
        parse_bid(&body)
    }
}

/// Pull the bid out of the service's `{"USDBRL": {"bid": "5.04"}}`
/// response shape.
fn parse_bid(body: &serde_json::Value) -> Result<f64, QuoteError> {
    let bid = body
        .get("USDBRL")
        .and_then(|pair| pair.get("bid"))
        .and_then(|bid| bid.as_str())
        .ok_or(QuoteError::MissingBid)?;
    bid.parse()
        .map_err(|_| QuoteError::BadBid(bid.to_string()))
}

/// Fetch on a detached worker thread and report the rate through the
/// returned channel.
pub fn fetch_rate_in_background<F>(fetcher: F) -> Receiver<Result<f64, QuoteError>>
where
    F: QuoteFetcher + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = fetcher.usd_brl();
        match &result {
            Ok(rate) => tracing::debug!(rate, "fetched exchange rate"),
            Err(err) => tracing::warn!(%err, "exchange rate fetch failed"),
        }
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_service_response_shape() {
        let body = serde_json::json!({
            "USDBRL": {
                "code": "USD",
                "codein": "BRL",
                "bid": "5.0423",
                "ask": "5.0429"
            }
        });
        assert_eq!(parse_bid(&body).unwrap(), 5.0423);
    }

    #[test]
    fn rejects_missing_or_malformed_bids() {
        assert!(matches!(
            parse_bid(&serde_json::json!({})),
            Err(QuoteError::MissingBid)
        ));
        assert!(matches!(
            parse_bid(&serde_json::json!({"USDBRL": {"bid": "n/a"}})),
            Err(QuoteError::BadBid(_))
        ));
    }

    struct FixedRate(f64);

    impl QuoteFetcher for FixedRate {
        fn usd_brl(&self) -> Result<f64, QuoteError> {
            Ok(self.0)
        }
    }

    #[test]
    fn background_fetch_delivers_the_rate() {
        let rx = fetch_rate_in_background(FixedRate(5.0));
        assert_eq!(rx.recv().unwrap().unwrap(), 5.0);
    }
}
