//! Decision engine integration.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → request.rs (snapshot ip, headers, body, extra fields)
//!     → policy.rs (route's fixed rule set)
//!     → client.rs (POST to the hosted engine, with timeout)
//!     → types.rs (Decision: conclusion + reason)
//! ```
//!
//! # Constraints
//! - The site key comes from configuration or the environment only
//! - The key is never logged
//! - Every call has a deadline; none are retried

pub mod client;
pub mod policy;
pub mod request;
pub mod types;

pub use client::{DecisionEngine, HttpDecisionEngine, SharedEngine};
pub use policy::{Mode, Policy, RoutePolicies, Rule};
pub use request::RequestDetails;
pub use types::{Conclusion, Decision, EngineError, EngineResult, Reason};
