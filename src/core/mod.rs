pub mod error;
pub mod types;

pub use error::{EngineError, Result};
pub use types::{CURRENT_USER_ID, Theme, generate_id};
