//! Request handlers for cube endpoints.

mod changelog;
mod commit;
mod cubes;
mod history;
mod reconcile;

pub use changelog::*;
pub use commit::*;
pub use cubes::*;
pub use history::*;
pub use reconcile::*;
