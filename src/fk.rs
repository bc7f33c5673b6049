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
//! Forward kinematics evaluation
use crate::errors::*;
use crate::joint::NodeKind;
use crate::math::position_of;
use crate::pose::Pose;
use crate::rig::Rig;
use na::{Matrix4, RealField, Vector3};
use nalgebra as na;
use tracing::{debug, trace};

/// World transforms of the rig nodes in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub struct Frames<T: RealField> {
    frames: Vec<(String, Matrix4<T>)>,
}

impl<T: RealField> Frames<T> {
    pub fn len(&self) -> usize {
        self.frames.len()
    }
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &(String, Matrix4<T>)> {
        self.frames.iter()
    }
    pub fn names(&self) -> Vec<&str> {
        self.frames.iter().map(|(name, _)| name.as_str()).collect()
    }
    /// World transform of the node
    pub fn get(&self, name: &str) -> Option<&Matrix4<T>> {
        self.frames
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, trans)| trans)
    }
    /// World position of the node
    pub fn position(&self, name: &str) -> Option<Vector3<T>> {
        self.get(name).map(position_of)
    }
    /// Only the effector frames, in evaluation order
    pub fn effectors<'a>(&'a self, rig: &'a Rig<T>) -> impl Iterator<Item = &'a (String, Matrix4<T>)> {
        self.frames.iter().filter(move |(name, _)| {
            rig.find(name)
                .map(|node| node.kind.is_effector())
                .unwrap_or(false)
        })
    }
    pub fn into_vec(self) -> Vec<(String, Matrix4<T>)> {
        self.frames
    }
}

impl<T: RealField> IntoIterator for Frames<T> {
    type Item = (String, Matrix4<T>);
    type IntoIter = std::vec::IntoIter<(String, Matrix4<T>)>;
    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

/// Check all the entries of `pose` against the rig
///
/// Names which are not in the rig are `UnknownJointName`, values which do not
/// match the axes of the joint are `MissingRequiredAxis`. Entries for fixed
/// links and effectors are allowed, they have no effect.
pub fn validate_pose<T: RealField>(rig: &Rig<T>, pose: &Pose<T>) -> Result<(), Error> {
    for (name, value) in pose {
        let node = rig.find(name).ok_or_else(|| Error::UnknownJointName {
            joint_name: name.to_owned(),
        })?;
        match node.kind {
            NodeKind::Rotational { axes } => value.check_axes(name, axes)?,
            _ => debug!("{} {} has no degree of freedom, ignored", name, node.kind),
        }
    }
    Ok(())
}

/// Calculate the world transforms of all the nodes
///
/// Nodes are evaluated depth first, a parent before its children. For each node,
/// `world = parent_world * offset`, and if the node is a rotational joint
/// contained in `pose`, the world transform is multiplied by `Rz`, `Ry` and
/// then `Rx` of the given angles. The root uses `base` (identity if `None`) as
/// its parent transform.
///
/// Angles are not clamped or checked, NaN or infinite angles result in NaN
/// transforms for the joint and its descendants.
///
/// # Examples
///
/// ```
/// use kinrig::*;
/// use nalgebra::Vector3;
///
/// let rig = builtin::three_link_arm::<f64>().unwrap();
/// let frames = forward_kinematics(&rig, &Pose::new(), None).unwrap();
/// assert_eq!(frames.len(), 8);
/// assert_eq!(frames.position("end_effector").unwrap(), Vector3::new(0.0, 0.0, 19.0));
///
/// let mut pose = Pose::new();
/// pose.insert("joint_1_XYZ", [std::f64::consts::FRAC_PI_2, 0.0, 0.0]);
/// let frames = forward_kinematics(&rig, &pose, None).unwrap();
/// let p = frames.position("end_effector").unwrap();
/// assert!((p - Vector3::new(0.0, -18.0, 1.0)).norm() < 1e-9);
/// ```
pub fn forward_kinematics<T: RealField>(
    rig: &Rig<T>,
    pose: &Pose<T>,
    base: Option<&Matrix4<T>>,
) -> Result<Frames<T>, Error> {
    validate_pose(rig, pose)?;
    let base = base.cloned().unwrap_or_else(Matrix4::identity);
    let mut world = vec![Matrix4::identity(); rig.len()];
    let mut frames = Vec::with_capacity(rig.len());
    let nodes = rig.nodes();
    for &i in rig.traversal_order() {
        let node = &nodes[i];
        let parent_world = match node.parent {
            Some(p) => &world[p],
            None => &base,
        };
        let mut trans = parent_world * &node.offset;
        if let (NodeKind::Rotational { axes }, Some(value)) = (node.kind, pose.get(&node.name)) {
            trans *= value.rotation(&node.name, axes)?;
        }
        trace!("{}: {:?}", node.name, position_of(&trans));
        world[i] = trans.clone();
        frames.push((node.name.clone(), trans));
    }
    Ok(Frames { frames })
}
