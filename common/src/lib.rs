//! A minesweeper player that reasons with propositional constraints.
//!
//! Every probed cell contributes a [`Constraint`] ("exactly n of these cells
//! are mines") to a [`KnowledgeBase`], which propagates them to a fixpoint
//! to find cells that are provably safe or provably mined. No mine layout is
//! ever enumerated; the [`oracle`] module does that only to check the
//! knowledge base's conclusions.

mod board;
mod cell;
mod constraint;
mod game;
mod knowledge;
pub mod oracle;

pub use board::Board;
pub use cell::Cell;
pub use constraint::Constraint;
pub use game::{Game, GameState, MoveKind, Turn};
pub use knowledge::KnowledgeBase;
