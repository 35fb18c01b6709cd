//! Reference pathfinding collaborators for robot soccer behavior trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod grid;
pub mod service;

pub use grid::{FieldGrid, Rect};
pub use service::RouteService;
