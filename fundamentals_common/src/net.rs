//! Quote service endpoints and request constants shared by the fetch pipeline.

use std::time::Duration;

/// Quote summary endpoint; `{symbol}` is replaced with the ticker.
pub const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}";
/// Token ("crumb") endpoint returning a bare text token.
pub const TOKEN_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
/// Payload modules requested on every quote fetch.
pub const MODULES: [&str; 3] = ["summaryDetail", "financialData", "defaultKeyStatistics"];

/// Browser user agent; the service rejects requests without a realistic one.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";
/// Accept header declaring JSON acceptance.
pub const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Per-request timeout, applied independently to every attempt.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Statuses that are retried instead of failing the fetch immediately.
pub const RETRY_STATUSES: [u16; 7] = [401, 403, 429, 500, 502, 503, 504];
/// Statuses that mean the token is stale.
pub const AUTH_STATUSES: [u16; 2] = [401, 403];
/// Total attempts per fetch, first one included.
pub const MAX_ATTEMPTS: u32 = 3;
/// Backoff multiplier cap: the wait after attempt `n` is `min(n, 3)` units.
pub const BACKOFF_CAP: u32 = 3;
/// One backoff unit.
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);
/// Default pause between two symbol fetches.
pub const POLITENESS_DELAY: Duration = Duration::from_secs(1);

/// Build the quote summary URL for `symbol`.
pub fn quote_url(symbol: &str) -> String {
    QUOTE_SUMMARY_URL.replace("{symbol}", symbol)
}

/// Comma-joined module list sent as the `modules` query parameter.
pub fn modules_param() -> String {
    MODULES.join(",")
}
