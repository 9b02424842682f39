use analysis_core::{
    AnalysisError, Bar, BarInterval, LookbackPeriod, MarketDataProvider, OptionChain,
    OptionContract,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Timelike, Utc};
use chrono_tz::US::Eastern;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://api.polygon.io";

/// Regular US equity session, minutes after midnight Eastern.
const REGULAR_OPEN_MINUTES: u32 = 9 * 60 + 30;
const REGULAR_CLOSE_MINUTES: u32 = 16 * 60;

/// Upper bound on option snapshot pages followed for one chain.
const MAX_OPTION_PAGES: usize = 5;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).saturating_duration_since(now),
                None => Duration::ZERO,
            } + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Polygon API slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Polygon.io REST client serving bars and option chains.
#[derive(Clone)]
pub struct PolygonClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl PolygonClient {
    pub fn new(api_key: String) -> Self {
        // Default 500 req/min for Starter plan. Free tier users should set POLYGON_RATE_LIMIT=5.
        let rate_limit: usize = std::env::var("POLYGON_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);
        Self::with_rate_limit(api_key, rate_limit)
    }

    pub fn with_rate_limit(api_key: String, requests_per_minute: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
        }
    }

    /// Point the client at a different host (proxies, recorded fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!("Polygon 429 rate limited, waiting {}s before retry {}/3", wait_secs, attempt + 1);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(AnalysisError::ApiError("Rate limited by Polygon after 3 retries".to_string()))
    }

    /// Get aggregates (bars) for a symbol, oldest first.
    pub async fn get_aggregates(
        &self,
        symbol: &str,
        multiplier: u32,
        timespan: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Bar>, AnalysisError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            self.base_url,
            symbol,
            multiplier,
            timespan,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let response = self
            .send_request(self.client.get(&url).query(&[
                ("apiKey", self.api_key.as_str()),
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
            ]))
            .await?;

        // Unknown tickers come back as 404 on some plans; treat as no data
        if response.status().as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let agg_response: AggregateResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        Ok(bars_from_aggregates(agg_response.results))
    }

    /// Get the options chain for an underlying, starting at the nearest expiration.
    pub async fn get_options_chain(&self, underlying: &str) -> Result<OptionChain, AnalysisError> {
        let url = format!("{}/v3/snapshot/options/{}", self.base_url, underlying);
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

        let mut contracts: Vec<OptionsContractSnapshot> = Vec::new();
        let mut builder = self.client.get(&url).query(&[
            ("apiKey", self.api_key.as_str()),
            ("expiration_date.gte", today.as_str()),
            ("sort", "expiration_date"),
            ("order", "asc"),
            ("limit", "250"),
        ]);

        for _ in 0..MAX_OPTION_PAGES {
            let response = self.send_request(builder).await?;

            let status = response.status().as_u16();
            if status == 403 || status == 401 || status == 404 {
                return Err(AnalysisError::OptionsUnavailable(format!(
                    "options snapshot not available (HTTP {})",
                    status
                )));
            }
            if !response.status().is_success() {
                return Err(AnalysisError::ApiError(format!(
                    "Options HTTP {}: {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                )));
            }

            let page: OptionsSnapshotResponse = response
                .json()
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;
            contracts.extend(page.results.unwrap_or_default());

            // Results are sorted by expiration; stop once a page reaches past the first one
            if spans_multiple_expirations(&contracts) {
                break;
            }
            match page.next_url {
                Some(next) => {
                    builder = self.client.get(&next).query(&[("apiKey", self.api_key.as_str())]);
                }
                None => break,
            }
        }

        let chain = chain_from_snapshots(&contracts);
        if chain.expirations.is_empty() {
            return Err(AnalysisError::OptionsUnavailable(format!(
                "no listed options for {}",
                underlying
            )));
        }
        tracing::debug!(
            underlying,
            calls = chain.calls.len(),
            puts = chain.puts.len(),
            expirations = chain.expirations.len(),
            "Option chain loaded"
        );
        Ok(chain)
    }
}

#[async_trait]
impl MarketDataProvider for PolygonClient {
    async fn get_bars(
        &self,
        ticker: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, AnalysisError> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(period.days());
        let (multiplier, timespan) = polygon_params(interval);
        let bars = self.get_aggregates(ticker, multiplier, timespan, from, to).await?;
        match interval {
            BarInterval::Hour1 => {
                let fetched = bars.len();
                let bars = regular_session_only(bars);
                tracing::debug!(ticker, fetched, kept = bars.len(), "Dropped extended-hours bars");
                Ok(bars)
            }
            BarInterval::Day1 => Ok(bars),
        }
    }

    async fn get_option_chain(&self, ticker: &str) -> Result<OptionChain, AnalysisError> {
        self.get_options_chain(ticker).await
    }
}

/// Multiplier and timespan for the Polygon aggregates endpoint.
pub fn polygon_params(interval: BarInterval) -> (u32, &'static str) {
    match interval {
        BarInterval::Hour1 => (1, "hour"),
        BarInterval::Day1 => (1, "day"),
    }
}

/// Converts raw aggregates to bars, dropping rows with a missing field and
/// duplicate timestamps.
fn bars_from_aggregates(results: Vec<AggregateResult>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = results
        .into_iter()
        .filter_map(|r| {
            Some(Bar {
                timestamp: DateTime::from_timestamp_millis(r.t?)?,
                open: r.o?,
                high: r.h?,
                low: r.l?,
                close: r.c?,
                volume: r.v?,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    bars
}

/// Whether an hourly bar starting at `start` overlaps the regular session.
/// Polygon hour bars start on the hour, so the 09:00 bar carries the open.
pub fn in_regular_session(start: DateTime<Utc>) -> bool {
    let local = start.with_timezone(&Eastern);
    let start_minutes = local.hour() * 60 + local.minute();
    start_minutes + 60 > REGULAR_OPEN_MINUTES && start_minutes < REGULAR_CLOSE_MINUTES
}

/// Drops pre-market and after-hours hourly bars.
fn regular_session_only(bars: Vec<Bar>) -> Vec<Bar> {
    bars.into_iter().filter(|b| in_regular_session(b.timestamp)).collect()
}

fn snapshot_expiration(snapshot: &OptionsContractSnapshot) -> Option<NaiveDate> {
    let details = snapshot.details.as_ref()?;
    NaiveDate::parse_from_str(details.expiration_date.as_deref()?, "%Y-%m-%d").ok()
}

fn spans_multiple_expirations(contracts: &[OptionsContractSnapshot]) -> bool {
    let mut dates = contracts.iter().filter_map(snapshot_expiration);
    match dates.next() {
        Some(first) => dates.any(|d| d != first),
        None => false,
    }
}

fn chain_from_snapshots(contracts: &[OptionsContractSnapshot]) -> OptionChain {
    let mut expirations = BTreeSet::new();
    let mut chain = OptionChain::default();

    for snapshot in contracts {
        let Some(details) = snapshot.details.as_ref() else {
            continue;
        };
        let (Some(strike), Some(expiration)) = (details.strike_price, snapshot_expiration(snapshot)) else {
            continue;
        };
        let contract = OptionContract {
            strike,
            expiration,
            symbol: details.ticker.clone(),
        };
        match details.contract_type.as_deref() {
            Some("call") => chain.calls.push(contract),
            Some("put") => chain.puts.push(contract),
            _ => continue,
        }
        expirations.insert(expiration);
    }

    chain.expirations = expirations.into_iter().collect();
    chain
}

// Response structures
#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregateResult>,
}

#[derive(Debug, Deserialize)]
struct AggregateResult {
    t: Option<i64>, // timestamp
    o: Option<f64>, // open
    h: Option<f64>, // high
    l: Option<f64>, // low
    c: Option<f64>, // close
    v: Option<f64>, // volume
}

// Options types
#[derive(Debug, Deserialize)]
struct OptionsSnapshotResponse {
    results: Option<Vec<OptionsContractSnapshot>>,
    #[serde(default)]
    next_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OptionsContractSnapshot {
    #[serde(default)]
    details: Option<OptionsDetails>,
}

#[derive(Debug, Clone, Deserialize)]
struct OptionsDetails {
    contract_type: Option<String>,
    strike_price: Option<f64>,
    expiration_date: Option<String>,
    ticker: Option<String>,
}
