pub mod common;
pub mod entity;
pub mod schema;

pub use common::*;
pub use entity::*;
pub use schema::*;
