//! Plain domain types: the loanable [`Item`] and the [`Actor`]s that borrow and manage it.

pub mod actor;
pub mod item;

pub use actor::*;
pub use item::*;
