//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, engine-facing request snapshot)
//!     → routes/* (one handler per capability, consults the engine)
//!     → response.rs (allow/deny/error → status + JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use request::{ClientRequest, RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{build_router, AppState, GatewayServer};
