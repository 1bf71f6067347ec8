//! Database module for PostgreSQL persistence.

mod changelogs;
mod cubes;
mod pool;

pub use changelogs::*;
pub use cubes::*;
pub use pool::*;
