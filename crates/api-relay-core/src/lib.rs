//! # API Relay Core
//!
//! Relay service that lets browser clients reach arbitrary HTTP APIs
//! without tripping same-origin restrictions.
//!
//! ## Layout
//!
//! ```text
//! api-relay-core/src/
//! ├── modules/
//! │   └── config.rs       # file + override layering, validation
//! └── relay/
//!     ├── validation.rs   # target URL and blocked-host checks
//!     ├── headers.rs      # outbound curation, response filtering
//!     ├── body.rs         # content-type driven body codec
//!     ├── client_builder.rs
//!     ├── service.rs      # one inbound call -> one outbound call
//!     ├── response.rs     # success/failure envelopes
//!     ├── handlers.rs     # /proxy, /api/wrapper, /health, fallback
//!     ├── server.rs       # router assembly
//!     └── middleware/     # CORS, per-IP rate limiting
//! ```

#![cfg_attr(test, allow(clippy::panic, clippy::print_stdout, clippy::assertions_on_result_states))]

pub mod error;
pub mod modules;
pub mod relay;

pub use error::{AppError, AppResult};
pub use relay::{build_relay_router, AppState, RateLimiter, RelayService};
