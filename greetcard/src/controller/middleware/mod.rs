mod panic_middleware;
mod request_ctx_middleware;
mod request_id_middleware;

pub use panic_middleware::*;
pub use request_ctx_middleware::*;
pub use request_id_middleware::*;
