//! HTTP 接口
//!
//! 对外提供规则创建、合并、评估以及已保存规则的查询接口。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::api_routes;
pub use state::AppState;
