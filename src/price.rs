//! Share prices for RSU vests and ESPP purchases.
//!
//! A price is only needed when an RSU vest has no configured price or the ESPP buys at the spot
//! price. Online prices are scraped from a quote page and cached on disk for a few hours.

use crate::config::Config;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

const CACHE_FILE: &str = "stock-price.json";
const LAST_PRICE_ATTR: &str = "data-last-price=\"";

/// Something that can provide the current price of a share.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn price(&self) -> Result<f64>;
}

/// A price fixed in the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPrice(pub f64);

#[async_trait::async_trait]
impl PriceSource for FixedPrice {
    async fn price(&self) -> Result<f64> {
        Ok(self.0)
    }
}

/// Fetches the last price for a symbol from `{url}/{symbol}`, caching it as JSON.
#[derive(Debug, Clone)]
pub struct StockPrice {
    url: Url,
    symbol: String,
    cache: PathBuf,
    cache_hours: u32,
}

/// The on-disk cache of the last fetched price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Cached {
    time_utc: DateTime<Utc>,
    symbol: String,
    price: f64,
}

impl StockPrice {
    pub fn new(
        base: &str,
        symbol: impl Into<String>,
        cache: impl Into<PathBuf>,
        cache_hours: u32,
    ) -> Res<Self> {
        let symbol = symbol.into();
        let mut url = Url::parse(base).with_context(|| format!("Invalid stock url '{base}'"))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Stock url '{base}' cannot have a path"))?
            .pop_if_empty()
            .push(&symbol);
        Ok(Self {
            url,
            symbol,
            cache: cache.into(),
            cache_hours,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn cached(&self, now: DateTime<Utc>) -> Option<f64> {
        if !self.cache.is_file() {
            return None;
        }
        let cached: Cached = match utils::deserialize(&self.cache).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Ignoring the stock price cache: {e:#}");
                return None;
            }
        };
        if cached.symbol != self.symbol {
            return None;
        }
        if cached.time_utc + Duration::hours(i64::from(self.cache_hours)) < now {
            return None;
        }
        debug!("Using the cached price for {} from {}", self.symbol, cached.time_utc);
        Some(cached.price)
    }

    async fn fetch(&self) -> Res<f64> {
        info!("Fetching the price for {} from {}", self.symbol, self.url);
        let response = reqwest::Client::new()
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?;
        if !response.status().is_success() {
            bail!("Fetching {} failed with status {}", self.url, response.status());
        }
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read the response from {}", self.url))?;
        parse_last_price(&body)
            .with_context(|| format!("can't get stock symbol '{}'", self.symbol))
    }

    async fn price_inner(&self) -> Res<f64> {
        let now = Utc::now();
        if let Some(price) = self.cached(now).await {
            return Ok(price);
        }
        let price = self.fetch().await?;
        let cached = Cached {
            time_utc: now,
            symbol: self.symbol.clone(),
            price,
        };
        let json = serde_json::to_string_pretty(&cached)?;
        if let Err(e) = utils::write(&self.cache, format!("{json}\n")).await {
            warn!("Unable to cache the stock price: {e:#}");
        }
        Ok(price)
    }
}

#[async_trait::async_trait]
impl PriceSource for StockPrice {
    async fn price(&self) -> Result<f64> {
        self.price_inner().await.pub_result(ErrorType::Price)
    }
}

/// Finds the `data-last-price` attribute of the first `div` tag that has one.
pub(crate) fn parse_last_price(html: &str) -> Option<f64> {
    let value = html.split("<div").skip(1).find_map(|rest| {
        let tag = &rest[..rest.find('>')?];
        if !tag.starts_with(char::is_whitespace) {
            return None;
        }
        let start = tag.find(LAST_PRICE_ATTR)? + LAST_PRICE_ATTR.len();
        let value = &tag[start..];
        Some(&value[..value.find('"')?])
    })?;
    value.trim().replace(',', "").parse().ok()
}

/// Chooses the price source for `config`: the configured stock price, or the online quote.
pub fn source(config: &Config) -> Result<Box<dyn PriceSource>> {
    let stock = config.stock();
    if let Some(price) = stock.price {
        return Ok(Box::new(FixedPrice(price)));
    }
    let (Some(url), Some(symbol)) = (&stock.url, &stock.symbol) else {
        return Err(anyhow!(
            "a stock price is needed, set stock.price or both stock.url and stock.symbol"
        ))
        .pub_result(ErrorType::Config);
    };
    let cache = match &stock.cache {
        Some(path) => path.clone(),
        None => match dirs::cache_dir() {
            Some(dir) => dir.join(env!("CARGO_PKG_NAME")).join(CACHE_FILE),
            None => config.dir().join(CACHE_FILE),
        },
    };
    let price =
        StockPrice::new(url, symbol, cache, stock.cache_hours).pub_result(ErrorType::Config)?;
    Ok(Box::new(price))
}

/// Fetches the spot price when the configuration needs one.
pub async fn spot_price(config: &Config) -> Result<Option<f64>> {
    if !config.needs_spot_price() {
        return Ok(None);
    }
    let price = source(config)?.price().await?;
    debug!("Spot price {price:.2}");
    Ok(Some(price))
}
