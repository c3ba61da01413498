pub mod app_config;
pub mod app_context;
pub mod app_err;
pub mod response;

pub use app_context::AppContext;
pub use app_err::AppError;
pub use response::AppResponse;
