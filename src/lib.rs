//! Usage-quota and plan-entitlement accounting.
//!
//! Everything under [`core`] is pure and synchronous: callers pass in the
//! instant, the plan and the counters, and get a freshly built result back.

pub mod core;
