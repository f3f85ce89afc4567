//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod lobby_dto;

pub use common_dto::*;
pub use lobby_dto::*;
