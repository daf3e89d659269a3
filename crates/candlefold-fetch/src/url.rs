//! Kline API URL construction.

use candlefold_types::Interval;

/// Path of the kline history endpoint.
pub const KLINES_PATH: &str = "/derivatives/pairs/klines";

/// Builds the kline history URL for a pair and interval.
///
/// URL format: `{base}/derivatives/pairs/klines?pairId={pair_id}&interval={interval}`
///
/// A trailing slash on `base` is ignored.
///
/// # Example
///
/// ```
/// use candlefold_fetch::url::klines_url;
/// use candlefold_types::Interval;
///
/// let url = klines_url("https://api.example.com/", 1, Interval::MINUTE_30);
/// assert_eq!(url, "https://api.example.com/derivatives/pairs/klines?pairId=1&interval=30m");
/// ```
#[must_use]
pub fn klines_url(base: &str, pair_id: u32, interval: Interval) -> String {
    format!(
        "{}{}?pairId={}&interval={}",
        base.trim_end_matches('/'),
        KLINES_PATH,
        pair_id,
        interval
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_klines_url() {
        let url = klines_url("http://localhost:8080", 7, Interval::SECOND_30);
        assert_eq!(
            url,
            "http://localhost:8080/derivatives/pairs/klines?pairId=7&interval=30s"
        );
    }

    #[test]
    fn test_klines_url_day() {
        let url = klines_url("http://localhost:8080///", 1, Interval::DAY_1);
        assert!(url.ends_with("klines?pairId=1&interval=1d"));
        assert!(!url.contains("//derivatives"));
    }
}
