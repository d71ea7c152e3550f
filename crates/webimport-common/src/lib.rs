pub mod host;
pub mod name;
pub mod remote;
pub mod vfs;

pub use name::LogicalName;
pub use remote::{ResolverError, Result};
