//! Robot behaviors built on the behavior tree runtime.
//!
//! Leaf tasks publish at most one command per tick and turn collaborator errors into FAILURE
//! (or RUNNING while a route is still being computed), so a parent selector can fall back.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod fielder;
pub mod predicates;
pub mod target;
pub mod tasks;

pub use fielder::{FielderConfig, FielderTree};
pub use target::Target;
pub use tasks::{Hold, Kick, MoveToPosition};
