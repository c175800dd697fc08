use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::{PairPrice, SinglePrice};
use crate::ports::{check_price, FeedError, PriceFeed};

pub const BINANCE_API_URL: &str = "https://api.binance.com";
const TICKER_PATH: &str = "/api/v3/ticker/price";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Binance spot ticker client
#[derive(Debug, Clone)]
pub struct BinancePriceClient {
    http: Client,
    base_url: String,
}

impl BinancePriceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::RestError(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the public Binance API with a 5 second timeout
    pub fn public() -> Result<Self, FeedError> {
        Self::new(BINANCE_API_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the last traded price for a symbol, e.g. `BTCUSDT`
    pub async fn get_price(&self, symbol: &str) -> Result<f64, FeedError> {
        let url = format!("{}{}", self.base_url, TICKER_PATH);

        let ticker: TickerResponse = self
            .http
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FeedError::RestError(format!("{}: {}", symbol, e)))?
            .json()
            .await
            .map_err(|e| FeedError::ParseError(format!("{}: {}", symbol, e)))?;

        check_price(symbol, ticker.price()?)
    }
}

/// `/api/v3/ticker/price` body; Binance sends the price as a string
#[derive(Debug, Deserialize)]
struct TickerResponse {
    symbol: String,
    price: String,
}

impl TickerResponse {
    fn price(&self) -> Result<f64, FeedError> {
        self.price.parse::<f64>().map_err(|e| {
            FeedError::ParseError(format!("{} price '{}': {}", self.symbol, self.price, e))
        })
    }
}

/// Single-instrument Binance feed
#[derive(Debug, Clone)]
pub struct BinanceSingleFeed {
    client: BinancePriceClient,
    symbol: String,
}

impl BinanceSingleFeed {
    pub fn new(client: BinancePriceClient, symbol: impl Into<String>) -> Self {
        Self {
            client,
            symbol: symbol.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceSingleFeed {
    type Quote = SinglePrice;

    async fn fetch(&self) -> Result<SinglePrice, FeedError> {
        self.client.get_price(&self.symbol).await.map(SinglePrice::new)
    }

    fn describe(&self) -> String {
        format!("binance {}", self.symbol)
    }
}

/// Pairs Binance feed; both legs are fetched concurrently each tick
#[derive(Debug, Clone)]
pub struct BinancePairFeed {
    client: BinancePriceClient,
    y_symbol: String,
    x_symbol: String,
}

impl BinancePairFeed {
    pub fn new(
        client: BinancePriceClient,
        y_symbol: impl Into<String>,
        x_symbol: impl Into<String>,
    ) -> Self {
        Self {
            client,
            y_symbol: y_symbol.into(),
            x_symbol: x_symbol.into(),
        }
    }
}

#[async_trait]
impl PriceFeed for BinancePairFeed {
    type Quote = PairPrice;

    async fn fetch(&self) -> Result<PairPrice, FeedError> {
        let (y, x) = tokio::try_join!(
            self.client.get_price(&self.y_symbol),
            self.client.get_price(&self.x_symbol),
        )?;
        Ok(PairPrice::new(y, x))
    }

    fn describe(&self) -> String {
        format!("binance {}/{}", self.y_symbol, self.x_symbol)
    }
}
