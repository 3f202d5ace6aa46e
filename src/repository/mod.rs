pub mod collection;
mod entities;

pub use collection::{Entity, Repository, RepositoryConfig, TrimStrategy};
