use std::borrow::Cow;

use soccer_core::{RobotId, SituationKey};
use thiserror::Error;

/// Tree construction errors. All of them are configuration mistakes and are reported before the
/// first tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{robot}: no subtree bound to situation `{key}`")]
    UnmappedSituation { robot: RobotId, key: SituationKey },

    #[error("node `{label}` belongs to {node_owner} but was placed in the tree of {tree_owner}")]
    ForeignNode {
        tree_owner: RobotId,
        node_owner: RobotId,
        label: Cow<'static, str>,
    },

    #[error("parallel node `{label}` requires zero successes")]
    EmptyThreshold { label: Cow<'static, str> },

    #[error("{0} has more than one tree")]
    DuplicateRobot(RobotId),
}
