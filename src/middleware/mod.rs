pub mod edge_guard;
pub mod response;

pub use edge_guard::{edge_guard, evaluate, is_static_asset, session_cookie, EdgeGuard, GuardDecision};
pub use response::ApiResponse;
