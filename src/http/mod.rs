//! HTTP API.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/` | GET | Landing text with the listening port |
//! | `/health` | GET | Store liveness (`UP` or 503) |
//! | `/save` | POST | Store a new document in `INIT` |
//! | `/batch/save` | POST | Store a batch for later processing |
//! | `/update/{key}/verified` | PUT | `INIT` -> `VERIFIED` |
//! | `/update/{key}/rejected` | PUT | `INIT` -> `REJECTED` |
//! | `/process/{documentId}` | PUT | Mark every document of a batch `PROCESSED` |

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorContext};
pub use routes::{create_router, create_router_with_body_limit, JsonBadRequest, DEFAULT_BODY_LIMIT};
pub use state::AppState;
