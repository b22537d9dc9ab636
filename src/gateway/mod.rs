//! Server-side forwarders: chat completions and news, each attaching a
//! server-held credential and reshaping failures into `{ error, details }`.

pub mod error;
pub mod router;
pub mod server;
pub mod shutdown;
pub mod upstream;

pub use error::GatewayError;
pub use router::{build_router, GatewayState};
pub use server::{GatewayHandle, GatewayServer};
pub use upstream::UpstreamClient;
