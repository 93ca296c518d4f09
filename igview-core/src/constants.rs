//! Wire constants and defaults for igview.
//!
//! Everything the upstream contract pins down (header names, the success sentinel,
//! TTL classes) lives here so the client and the route layer agree on it.

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM (IMAI) CONTRACT
// ═══════════════════════════════════════════════════════════════════════════════

/// Default IMAI base URL. Operation paths are resolved relative to it.
pub const DEFAULT_BASE_URL: &str = "https://imai.co/api/";

/// Header carrying the static API key on every upstream request.
pub const API_KEY_HEADER: &str = "authkey";

/// Value of the envelope `status` field that marks a successful response.
pub const STATUS_OK: &str = "ok";

/// Cache-key sentinel used in place of a cursor for the first page of a feed.
pub const FIRST_PAGE_SENTINEL: &str = "first";

/// Query parameter carrying the pagination cursor.
pub const CURSOR_PARAM: &str = "after";

// ═══════════════════════════════════════════════════════════════════════════════
// PACING & CACHING
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum spacing between two upstream dispatches, in milliseconds.
/// 200ms keeps search-as-you-type responsive without tripping upstream 429s.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 200;

/// TTL for paginated and search-like results.
pub const SHORT_TTL_SECS: u64 = 30;

/// TTL for single-entity lookups (user info, media info, highlights).
pub const LONG_TTL_SECS: u64 = 60;

/// Default capacity of each per-operation cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;

/// Default per-request HTTP timeout for upstream calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on how much of a raw upstream body is kept for diagnostics.
pub const MAX_DIAGNOSTIC_BODY_BYTES: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR SANITIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Upstream response header prefixes that may be surfaced in errors.
pub const SAFE_HEADER_PREFIXES: &[&str] = &["x-", "ratelimit-"];

/// Exact upstream response header names that may be surfaced in errors.
pub const SAFE_HEADER_NAMES: &[&str] = &["retry-after"];

/// Returns true if a (lowercase) header name is on the diagnostic allowlist.
pub fn is_safe_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name == API_KEY_HEADER {
        return false;
    }
    SAFE_HEADER_NAMES.contains(&name.as_str())
        || SAFE_HEADER_PREFIXES.iter().any(|p| name.starts_with(p))
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMAGE PROXY
// ═══════════════════════════════════════════════════════════════════════════════

/// CDN domains the image proxy may fetch from (exact match or any subdomain).
pub const IMAGE_PROXY_ALLOWED_DOMAINS: &[&str] =
    &["instagram.com", "cdninstagram.com", "fbcdn.net"];

/// Cache header attached to proxied images (5 minutes).
pub const IMAGE_PROXY_CACHE_CONTROL: &str = "public, max-age=300";

/// User agent presented to the CDN. Some edges reject non-browser agents.
pub const IMAGE_PROXY_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header sent with proxied image requests.
pub const IMAGE_PROXY_ACCEPT: &str = "image/avif,image/webp,image/*,*/*";

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Origins allowed by CORS unless `CORS_ORIGINS` says otherwise.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["https://orzbirou.github.io", "http://localhost:4200"];

/// Interval of the background sweep that drops expired cache entries.
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 60;
