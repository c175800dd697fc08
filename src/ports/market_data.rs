use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Quote;

/// Price feed error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("REST API error: {0}")]
    RestError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("Feed exhausted")]
    Exhausted,
}

/// Source of one quote per tick.
///
/// Implementations must only return quotes whose legs are finite and
/// strictly positive; the engine does not expect to see anything else.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    type Quote: Quote + Send + Sync + 'static;

    /// Fetch the current quote
    async fn fetch(&self) -> Result<Self::Quote, FeedError>;

    /// Short description for logs (symbols, source)
    fn describe(&self) -> String;
}

/// Reject non-finite and non-positive prices at the feed boundary
pub fn check_price(symbol: &str, price: f64) -> Result<f64, FeedError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(FeedError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        })
    }
}
