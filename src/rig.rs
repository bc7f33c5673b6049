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
//! Table of rig nodes with index based parents
use crate::errors::*;
use crate::fk::{forward_kinematics, validate_pose, Frames};
use crate::joint::NodeKind;
use crate::pose::Pose;
use na::{Matrix4, RealField};
use nalgebra as na;
use std::collections::HashMap;
use std::fmt::{self, Display};

/// One row of the rig table
#[derive(Debug, Clone, PartialEq)]
pub struct RigNode<T: RealField> {
    /// Name of this node
    pub name: String,
    /// Index of the parent node. `None` for the root.
    pub parent: Option<usize>,
    /// Transform relative to the parent (rest transform)
    pub offset: Matrix4<T>,
    /// Type of this node
    pub kind: NodeKind,
}

impl<T: RealField> Display for RigNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.name, self.kind)
    }
}

/// Fixed kinematic tree
///
/// Nodes are stored in declaration order and a parent is always stored before
/// its children, so the tree is acyclic by construction.
///
/// # Examples
///
/// ```
/// use kinrig::*;
/// use kinrig::joint::{AxisSet, NodeKind};
/// use nalgebra::{Matrix4, Vector3};
///
/// let rig = RigBuilder::<f64>::new("arm")
///     .node("base", None, Matrix4::identity(), NodeKind::Fixed)
///     .node(
///         "shoulder",
///         Some("base"),
///         Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)),
///         NodeKind::Rotational { axes: AxisSet::z() },
///     )
///     .node(
///         "hand",
///         Some("shoulder"),
///         Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)),
///         NodeKind::Effector,
///     )
///     .finalize()
///     .unwrap();
/// assert_eq!(rig.len(), 3);
/// assert_eq!(rig.dof(), 1);
/// assert_eq!(rig.root().name, "base");
/// ```
#[derive(Debug, Clone)]
pub struct Rig<T: RealField> {
    name: String,
    revision: u32,
    nodes: Vec<RigNode<T>>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    order: Vec<usize>,
    home_pose: Pose<T>,
}

impl<T: RealField> Rig<T> {
    /// Create a rig from already indexed nodes
    ///
    /// Fails if the names are not unique, a parent is stored after its child,
    /// an effector has children or there are two roots.
    pub fn new(name: &str, nodes: Vec<RigNode<T>>) -> Result<Self, Error> {
        let root = nodes.first().ok_or(Error::EmptyRig)?;
        let root_name = root.name.clone();
        let mut index = HashMap::with_capacity(nodes.len());
        let mut children = vec![Vec::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), i).is_some() {
                return Err(Error::DuplicateName {
                    name: node.name.clone(),
                });
            }
            match node.parent {
                Some(p) if p >= i => {
                    return Err(Error::ParentOrder {
                        name: node.name.clone(),
                        parent: nodes
                            .get(p)
                            .map(|n| n.name.clone())
                            .unwrap_or_else(|| p.to_string()),
                    });
                }
                Some(p) => {
                    if nodes[p].kind.is_effector() {
                        return Err(Error::EffectorHasChildren {
                            effector: nodes[p].name.clone(),
                        });
                    }
                    children[p].push(i);
                }
                None if i > 0 => {
                    return Err(Error::MultipleRoots {
                        first: root_name,
                        second: node.name.clone(),
                    });
                }
                None => {}
            }
        }
        let order = depth_first_order(&children);
        Ok(Rig {
            name: name.to_owned(),
            revision: 0,
            nodes,
            index,
            children,
            order,
            home_pose: Pose::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn revision(&self) -> u32 {
        self.revision
    }
    pub fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    /// Always false, a rig has at least the root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn root(&self) -> &RigNode<T> {
        &self.nodes[0]
    }
    pub fn node(&self, index: usize) -> Option<&RigNode<T>> {
        self.nodes.get(index)
    }
    /// Find the node by name
    pub fn find(&self, name: &str) -> Option<&RigNode<T>> {
        self.index_of(name).map(|i| &self.nodes[i])
    }
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
    /// Children indices of the node, in declaration order
    pub fn children_of(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Parent node of `name`
    pub fn parent_of(&self, name: &str) -> Option<&RigNode<T>> {
        self.find(name)
            .and_then(|node| node.parent)
            .map(|p| &self.nodes[p])
    }
    /// Nodes in declaration order
    pub fn nodes(&self) -> &[RigNode<T>] {
        &self.nodes
    }
    /// Nodes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &RigNode<T>> {
        self.nodes.iter()
    }
    /// Node indices in evaluation order (depth first, parent before children)
    pub fn traversal_order(&self) -> &[usize] {
        &self.order
    }
    /// Nodes in evaluation order
    pub fn iter_depth_first(&self) -> impl Iterator<Item = &RigNode<T>> {
        self.order.iter().map(move |i| &self.nodes[*i])
    }
    /// Movable joints in evaluation order
    pub fn iter_joints(&self) -> impl Iterator<Item = &RigNode<T>> {
        self.iter_depth_first().filter(|n| n.kind.is_movable())
    }
    /// Effectors in evaluation order
    pub fn iter_effectors(&self) -> impl Iterator<Item = &RigNode<T>> {
        self.iter_depth_first().filter(|n| n.kind.is_effector())
    }
    /// Names of the effectors in evaluation order
    pub fn effector_names(&self) -> Vec<String> {
        self.iter_effectors().map(|n| n.name.clone()).collect()
    }
    /// Sum of the degrees of freedom of all the joints
    pub fn dof(&self) -> usize {
        self.nodes.iter().map(|n| n.kind.dof()).sum()
    }
    /// Pose of the resting stance. Empty if the rig does not define one.
    pub fn home_pose(&self) -> &Pose<T> {
        &self.home_pose
    }
    /// Replace the home pose. The old one is kept if `pose` is not valid for this rig.
    pub fn set_home_pose(&mut self, pose: Pose<T>) -> Result<(), Error> {
        validate_pose(self, &pose)?;
        self.home_pose = pose;
        Ok(())
    }
    /// Evaluate forward kinematics, see [`forward_kinematics`]
    pub fn forward_kinematics(
        &self,
        pose: &Pose<T>,
        base: Option<&Matrix4<T>>,
    ) -> Result<Frames<T>, Error> {
        forward_kinematics(self, pose, base)
    }
    /// Evaluate forward kinematics of the home pose
    pub fn home_frames(&self, base: Option<&Matrix4<T>>) -> Result<Frames<T>, Error> {
        forward_kinematics(self, &self.home_pose, base)
    }

    fn fmt_with_indent_level(
        &self,
        index: usize,
        level: usize,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "{}{}", "    ".repeat(level), self.nodes[index])?;
        for c in &self.children[index] {
            self.fmt_with_indent_level(*c, level + 1, f)?
        }
        Ok(())
    }
}

impl<T: RealField> Display for Rig<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_indent_level(0, 0, f)
    }
}

fn depth_first_order(children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![0];
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }
    order
}

/// Build `Rig` by node names
///
/// Parents are referred by name and must be added before their children.
#[derive(Debug, Clone)]
pub struct RigBuilder<T: RealField> {
    name: String,
    revision: u32,
    nodes: Vec<(String, Option<String>, Matrix4<T>, NodeKind)>,
    home_pose: Pose<T>,
}

impl<T: RealField> RigBuilder<T> {
    pub fn new(name: &str) -> Self {
        RigBuilder {
            name: name.to_owned(),
            revision: 0,
            nodes: Vec::new(),
            home_pose: Pose::new(),
        }
    }
    pub fn revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }
    pub fn node(
        mut self,
        name: &str,
        parent: Option<&str>,
        offset: Matrix4<T>,
        kind: NodeKind,
    ) -> Self {
        self.nodes
            .push((name.to_owned(), parent.map(str::to_owned), offset, kind));
        self
    }
    pub fn home_pose(mut self, pose: Pose<T>) -> Self {
        self.home_pose = pose;
        self
    }
    /// Resolve the parent names and validate the table and the home pose
    pub fn finalize(self) -> Result<Rig<T>, Error> {
        let names = self
            .nodes
            .iter()
            .map(|(name, ..)| name.clone())
            .collect::<Vec<_>>();
        let mut seen = HashMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, (name, parent, offset, kind)) in self.nodes.into_iter().enumerate() {
            let parent = match parent {
                Some(parent) => match seen.get(&parent) {
                    Some(p) => Some(*p),
                    None if names[i..].contains(&parent) => {
                        return Err(Error::ParentOrder { name, parent });
                    }
                    None => return Err(Error::UnknownParent { name, parent }),
                },
                None => None,
            };
            seen.entry(name.clone()).or_insert(i);
            nodes.push(RigNode {
                name,
                parent,
                offset,
                kind,
            });
        }
        let mut rig = Rig::new(&self.name, nodes)?;
        rig.revision = self.revision;
        validate_pose(&rig, &self.home_pose)?;
        rig.home_pose = self.home_pose;
        Ok(rig)
    }
}
