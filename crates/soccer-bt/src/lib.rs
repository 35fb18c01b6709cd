//! Behavior tree runtime with situation supervision, built on `soccer-core`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod composite;
pub mod error;
pub mod leaf;
pub mod node;
pub mod supervisor;
pub mod team;
pub mod tree;

pub use composite::{CompositeNode, Policy, Threshold};
pub use error::BuildError;
pub use leaf::{ConditionalNode, FnTask, Predicate, Task, TaskNode};
pub use node::{Collaborators, Node, NodeId, NodeKind, NodeState};
pub use supervisor::{RootSupervisor, SituationSwitch, SupervisorBuilder};
pub use team::Team;
pub use tree::BehaviorTree;
