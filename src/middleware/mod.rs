mod rate_limit;

pub use rate_limit::{
    GatedTransport, RateLimitGate, parse_date, parse_remaining, wait_duration,
};
