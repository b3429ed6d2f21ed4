//! Rate limiting primitives for the SRP endpoints.
//!
//! All three operations consult the limiter before touching any state, so a
//! deployment can plug in a real policy (per IP, per username, or both)
//! without changing the handlers. The default is [`NoopRateLimiter`]: no
//! throttling at all, which leaves challenge issuance open to verifier
//! harvesting and online guessing unless something upstream limits it.

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    Register,
    Challenge,
    Authenticate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_username(&self, username: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_username(&self, _username: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}
