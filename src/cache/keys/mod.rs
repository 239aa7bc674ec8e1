/// Quota cache key prefix
const QUOTA_PREFIX: &str = "ratelimit:quota:";

/// Key of the shared quota record for one upstream host.
pub fn quota_key(host: &str) -> String {
    format!("{}{}", QUOTA_PREFIX, host)
}
