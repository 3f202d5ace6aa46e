pub mod center;

pub use center::{NotificationCenter, PERSISTED_LIMIT};
