/*
  Copyright 2020 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
use super::axis::AxisSet;
use std::fmt::{self, Display};

/// Type of a rig node, `Fixed`, `Rotational` and `Effector` are supported
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Fixed link. It has no degree of freedom but can have children.
    Fixed,
    /// Rotational joint around one or more of the local axes [rad].
    Rotational {
        /// axes of the joint
        axes: AxisSet,
    },
    /// Leaf transform without degree of freedom.
    Effector,
}

impl NodeKind {
    /// Degree of freedom of this node
    ///
    /// # Examples
    ///
    /// ```
    /// use kinrig::joint::{AxisSet, NodeKind};
    ///
    /// assert_eq!(NodeKind::Fixed.dof(), 0);
    /// assert_eq!(NodeKind::Rotational { axes: AxisSet::xyz() }.dof(), 3);
    /// assert_eq!(NodeKind::Effector.dof(), 0);
    /// ```
    pub fn dof(&self) -> usize {
        match self {
            NodeKind::Rotational { axes } => axes.len(),
            _ => 0,
        }
    }
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.dof() > 0
    }
    #[inline]
    pub fn is_effector(&self) -> bool {
        matches!(self, NodeKind::Effector)
    }
    /// Returns the axes if this is a rotational joint
    pub fn axes(&self) -> Option<AxisSet> {
        match self {
            NodeKind::Rotational { axes } => Some(*axes),
            _ => None,
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKind::Fixed => write!(f, "[⚓]"),
            NodeKind::Rotational { axes } => write!(f, "[⚙{axes}]"),
            NodeKind::Effector => write!(f, "[✋]"),
        }
    }
}

#[test]
fn test_node_kind_display() {
    assert_eq!(NodeKind::Fixed.to_string(), "[⚓]");
    assert_eq!(
        NodeKind::Rotational {
            axes: AxisSet::z()
        }
        .to_string(),
        "[⚙Z]"
    );
    assert!(NodeKind::Effector.is_effector());
    assert!(!NodeKind::Effector.is_movable());
}
