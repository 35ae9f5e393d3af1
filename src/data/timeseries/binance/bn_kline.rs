// Std library crates
use std::error::Error;
use std::fmt;
use std::time::SystemTime;

// External crates
use anyhow::{Result, bail};
use binance_sdk::common::models::Interval as binance_interval;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::models::RestApiRateLimit;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};
use tokio::time::{Duration, sleep};

// Local crates
use crate::config::binance::{BINANCE, BinanceApiConfig};
use crate::domain::pair_interval::PairInterval;
use crate::signal::error::validate_timestamps;
use crate::utils::TimeUtils;

/// Map a configured interval width onto Binance's interval enum; returns
/// Result instead of panicking on an interval Binance does not serve.
pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    match ms {
        TimeUtils::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        TimeUtils::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        TimeUtils::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        TimeUtils::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        TimeUtils::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        TimeUtils::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        TimeUtils::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        TimeUtils::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        TimeUtils::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        TimeUtils::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        TimeUtils::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        TimeUtils::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        TimeUtils::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        TimeUtils::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        TimeUtils::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        TimeUtils::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

#[derive(Debug)]
pub struct AllValidKlines4Pair {
    // A pair name (e.g. "SOLUSDT"), plus the interval scanned, plus a BNKline
    // list in ascending open-time order
    pub klines: Vec<BNKline>,
    pub pair_interval: PairInterval,
}

impl AllValidKlines4Pair {
    pub fn new(klines: Vec<BNKline>, pair_interval: PairInterval) -> Self {
        AllValidKlines4Pair {
            pair_interval,
            klines,
        }
    }

    pub fn first_timestamp_ms(&self) -> i64 {
        self.klines[0].open_timestamp_ms
    }

    pub fn last_timestamp_ms(&self) -> i64 {
        self.klines[self.klines.len() - 1].open_timestamp_ms
    }
}

#[derive(Debug, PartialOrd, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64, // only mandatory field; all others are optional
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub base_asset_volume: Option<f64>,
    pub quote_asset_volume: Option<f64>,
}

/// Custom error type for kline download failures.
#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    ConnectionFailed(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BNKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for BNKlineError {}

/// Extract a float from the heterogeneous kline item enum. Returns Some only
/// when the item was the String variant and parsed cleanly.
fn convert_kline_item_to_float(kline: Option<KlinesItemInner>) -> Option<f64> {
    kline.and_then(|inner| {
        if let KlinesItemInner::String(s) = inner {
            s.parse::<f64>().ok()
        } else {
            None
        }
    })
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        debug_assert_eq!(12, vec_inner_klines.len());

        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };

        let open_price = convert_kline_item_to_float(items.next());
        let high_price = convert_kline_item_to_float(items.next());
        let low_price = convert_kline_item_to_float(items.next());
        let close_price = convert_kline_item_to_float(items.next());
        let volume = convert_kline_item_to_float(items.next());
        let _ = items.next(); // close_time, unused
        let quote_asset_volume = convert_kline_item_to_float(items.next());

        Ok(BNKline {
            open_timestamp_ms,
            open_price,
            high_price,
            low_price,
            close_price,
            base_asset_volume: volume,
            quote_asset_volume,
        })
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<BNKline>, BNKlineError> {
    data.into_iter().map(Vec::try_into).collect()
}

async fn configure_binance_client() -> Result<RestApi, anyhow::Error> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    // Create the Spot REST API client
    let rest_client = SpotRestApi::production(rest_conf);
    Ok(rest_client)
}

/// Honour the per-minute request-weight budget: when the reported weight
/// leaves no headroom for the next concurrent batch, sleep until the start
/// of the next minute (Binance resets the counter on minute boundaries).
async fn handle_rate_limits(
    rate_limits: &Option<Vec<RestApiRateLimit>>,
    _pair_interval: &PairInterval,
    concurrent_kline_call_weight: u32,
    bn_weight_limit_minute: u32,
) -> Result<(), anyhow::Error> {
    #[cfg(not(debug_assertions))]
    let _ = &_pair_interval;

    if let Some(value) = rate_limits {
        for rate_limit in value {
            if rate_limit.interval_num == 1 && rate_limit.interval == binance_interval::Minute {
                let current_weight = rate_limit.count;
                let required_headroom =
                    bn_weight_limit_minute.saturating_sub(concurrent_kline_call_weight);
                if current_weight > required_headroom {
                    #[cfg(debug_assertions)]
                    log::info!(
                        "{} Current weight ({}) > required headroom ({}) — sleeping until start of next minute",
                        _pair_interval,
                        current_weight,
                        required_headroom,
                    );

                    let time_now = SystemTime::now();
                    let duration_since_epoch = time_now
                        .duration_since(SystemTime::UNIX_EPOCH)
                        .expect("Time went backwards");
                    let secs_into_min = duration_since_epoch.as_secs() % 60;
                    let sleep_duration = if secs_into_min == 0 {
                        Duration::from_secs(60)
                    } else {
                        Duration::from_secs(60 - secs_into_min)
                    };
                    sleep(sleep_duration).await;
                }
            }
        }
    }
    Ok(())
}

/// Splice one page of downloaded klines onto the front of `all_klines` and
/// report the next page's end time plus whether paging is finished.
fn process_new_klines(
    new_klines: Vec<Vec<KlinesItemInner>>,
    limit_klines_returned: i32,
    all_klines: &mut Vec<BNKline>,
    pair_interval: &PairInterval,
) -> Result<(Option<i64>, bool), anyhow::Error> {
    let mut bn_klines = convert_klines(new_klines).map_err(|e| {
        anyhow::Error::new(e).context(format!("{} convert_klines failed", pair_interval))
    })?;

    if bn_klines.is_empty() {
        bail!(
            "{}: convert_klines produced zero klines (unexpected).",
            pair_interval
        );
    }

    // A short page means history is exhausted
    let read_all_klines = bn_klines.len() < limit_klines_returned as usize;

    // Next page ends where this one began
    let end_time = Some(bn_klines[0].open_timestamp_ms);

    // Sanity: the page boundary kline must match the head of what we already
    // hold (Binance end_time is inclusive)
    if !all_klines.is_empty() {
        let last_page_ts = &bn_klines[bn_klines.len() - 1].open_timestamp_ms;
        let first_held_ts = &all_klines[0].open_timestamp_ms;
        debug_assert_eq!(last_page_ts, first_held_ts);
        // Remove the duplicated boundary kline
        bn_klines.pop();
    }

    if bn_klines.is_empty() {
        // Rare: the page held only the boundary duplicate
        return Ok((end_time, true));
    }

    all_klines.splice(0..0, bn_klines);

    Ok((end_time, read_all_klines))
}

async fn fetch_binance_klines_with_limits(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<(Option<Vec<RestApiRateLimit>>, Vec<Vec<KlinesItemInner>>), anyhow::Error> {
    let response_result = rest_client.klines(params).await;

    match response_result {
        Ok(r) => {
            let rate_limits = r.rate_limits.clone();
            let data = r.data().await?;
            Ok((rate_limits, data))
        }
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::TooManyRequestsError(msg) => {
                        log::error!("{} Rate limit exceeded: {}", pair_interval, msg);
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!("{} IP banned for excessive rate limits: {}", pair_interval, msg);
                    }
                    errors::ConnectorError::ServerError { msg, status_code } => {
                        log::error!(
                            "{} Server error: {} (status code: {:?})",
                            pair_interval,
                            msg,
                            status_code
                        );
                    }
                    errors::ConnectorError::NetworkError(msg) => {
                        log::error!("{} Network error: {}", pair_interval, msg);
                    }
                    connection_error::BadRequestError(msg) | connection_error::ConnectorClientError(msg) => {
                        log::error!("{} Bad request, verify parameters: {}", pair_interval, msg);
                    }
                    other => {
                        log::error!("Unexpected ConnectorError variant: {:?}", other);
                    }
                }
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", pair_interval)),
                )
            } else {
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(e.to_string())).context(
                        format!("Unexpected error during API call for {}", pair_interval),
                    ),
                )
            }
        }
    }
}

/// Download the most recent window of klines for one (pair, interval),
/// paging backwards until `max_klines_per_series` or history is exhausted.
pub async fn load_klines(
    pair_interval: PairInterval,
    max_simultaneous_kline_calls: u32,
) -> Result<AllValidKlines4Pair, anyhow::Error> {
    let rest_client = configure_binance_client().await?;

    let mut end_time: Option<i64> = None;
    let concurrent_kline_call_weight: u32 =
        BINANCE.limits.kline_call_weight * max_simultaneous_kline_calls;
    let mut all_klines: Vec<BNKline> = Vec::new();

    loop {
        let params = KlinesParams::builder(
            pair_interval.api_name().to_string(),
            try_interval_from_ms(pair_interval.interval_ms)
                .expect("Invalid Binance interval configuration"),
        )
        .limit(BINANCE.limits.klines_limit)
        .end_time(end_time)
        .build()?;

        let (rate_limits, new_klines) =
            fetch_binance_klines_with_limits(&rest_client, params, &pair_interval).await?;

        // May await/sleep before the next page
        handle_rate_limits(
            &rate_limits,
            &pair_interval,
            concurrent_kline_call_weight,
            BINANCE.limits.weight_limit_minute,
        )
        .await?;

        let (new_end_time, batch_read_all) = process_new_klines(
            new_klines,
            BINANCE.limits.klines_limit,
            &mut all_klines,
            &pair_interval,
        )?;
        end_time = new_end_time;

        // The classifier only reads a bounded tail; stop once we hold it
        if batch_read_all || all_klines.len() >= BINANCE.limits.max_klines_per_series {
            break;
        }
    }

    if all_klines.len() > BINANCE.limits.max_klines_per_series {
        let excess = all_klines.len() - BINANCE.limits.max_klines_per_series;
        all_klines.drain(..excess);
    }

    // Out-of-order or duplicated open times are a data-quality fault from
    // the exchange; refuse the series rather than repairing it silently.
    let open_times: Vec<i64> = all_klines.iter().map(|k| k.open_timestamp_ms).collect();
    if let Err(quality) = validate_timestamps(&open_times) {
        bail!("{}: rejected kline data: {}", pair_interval, quality);
    }

    Ok(AllValidKlines4Pair::new(all_klines, pair_interval))
}
