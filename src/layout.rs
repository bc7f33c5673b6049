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
use crate::errors::*;
use crate::fk::validate_pose;
use crate::joint::{Axis, AxisSet};
use crate::pose::{JointValue, Pose};
use crate::rig::Rig;
use na::{DVector, RealField};
use nalgebra as na;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    joint: String,
    axes: AxisSet,
    start: usize,
}

/// Flat configuration vector of a rig
///
/// Joints are sorted by name. A joint with its own X, Y and Z axes contributes
/// `name/x`, `name/y` and `name/z`, a single-axis joint contributes `name`.
///
/// # Examples
///
/// ```
/// use kinrig::*;
///
/// let rig = builtin::three_link_arm::<f64>().unwrap();
/// let layout = ConfigLayout::new(&rig);
/// assert_eq!(layout.len(), 7);
/// assert_eq!(layout.labels()[0], "joint_1_XYZ/x");
/// assert_eq!(layout.index_of("joint_3_Z"), Some(6));
///
/// let mut pose = Pose::new();
/// pose.insert("joint_3_Z", 0.5);
/// let q = layout.to_vector(&rig, &pose).unwrap();
/// assert_eq!(q[6], 0.5);
/// assert_eq!(q.iter().filter(|v| **v == 0.0).count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayout {
    slots: Vec<Slot>,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl ConfigLayout {
    pub fn new<T: RealField>(rig: &Rig<T>) -> Self {
        let mut joints = rig
            .iter()
            .filter_map(|node| node.kind.axes().map(|axes| (node.name.clone(), axes)))
            .filter(|(_, axes)| !axes.is_empty())
            .collect::<Vec<_>>();
        joints.sort_by(|a, b| a.0.cmp(&b.0));

        let mut slots = Vec::with_capacity(joints.len());
        let mut labels = Vec::new();
        for (joint, axes) in joints {
            let start = labels.len();
            if axes.is_single_z() {
                labels.push(joint.clone());
            } else {
                for axis in axes.to_vec() {
                    labels.push(format!("{}/{}", joint, axis_label(axis)));
                }
            }
            slots.push(Slot { joint, axes, start });
        }
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        ConfigLayout {
            slots,
            labels,
            index,
        }
    }
    /// Number of the components
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
    /// Flatten the pose
    ///
    /// Joints which are not in the pose are zero. Entries of fixed links and
    /// effectors are ignored.
    pub fn to_vector<T: RealField>(&self, rig: &Rig<T>, pose: &Pose<T>) -> Result<DVector<T>, Error> {
        validate_pose(rig, pose)?;
        let mut q = DVector::zeros(self.len());
        for slot in &self.slots {
            match pose.get(&slot.joint) {
                Some(JointValue::Single(z)) => q[slot.start] = z.clone(),
                Some(JointValue::Triple { x, y, z }) => {
                    for (offset, axis) in slot.axes.to_vec().into_iter().enumerate() {
                        q[slot.start + offset] = match axis {
                            Axis::X => x.clone(),
                            Axis::Y => y.clone(),
                            Axis::Z => z.clone(),
                        };
                    }
                }
                None => {}
            }
        }
        Ok(q)
    }
    /// Build the pose which contains all the joints
    pub fn to_pose<T: RealField>(&self, q: &DVector<T>) -> Result<Pose<T>, Error> {
        if q.len() != self.len() {
            return Err(Error::SizeMismatch {
                input: q.len(),
                required: self.len(),
            });
        }
        let mut pose = Pose::new();
        for slot in &self.slots {
            if slot.axes.is_single_z() {
                pose.insert(&slot.joint, JointValue::Single(q[slot.start].clone()));
            } else {
                let mut xyz = [T::zero(), T::zero(), T::zero()];
                for (offset, axis) in slot.axes.to_vec().into_iter().enumerate() {
                    let i = match axis {
                        Axis::X => 0,
                        Axis::Y => 1,
                        Axis::Z => 2,
                    };
                    xyz[i] = q[slot.start + offset].clone();
                }
                pose.insert(&slot.joint, JointValue::triple(xyz));
            }
        }
        Ok(pose)
    }
}

fn axis_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin;

    #[test]
    fn test_taiwan_bear_layout() {
        let rig = builtin::taiwan_bear::<f64>().unwrap();
        let layout = ConfigLayout::new(&rig);
        assert_eq!(layout.len(), 26);
        assert_eq!(layout.len(), rig.dof());
        assert_eq!(layout.labels()[0], "RJoint_Back_Ankle_Z_L");
        assert_eq!(layout.index_of("RJoint_Back_Upper_XYZ_L/y"), Some(5));
        assert_eq!(layout.index_of("RJoint_Back_Upper_XYZ_L"), None);
        assert_eq!(layout.index_of("Effector_Back_L"), None);
    }

    #[test]
    fn test_vector_round_trip() {
        let rig = builtin::taiwan_bear::<f64>().unwrap();
        let layout = ConfigLayout::new(&rig);
        let q = DVector::from_fn(layout.len(), |i, _| i as f64 * 0.01);
        let pose = layout.to_pose(&q).unwrap();
        assert_eq!(pose.len(), 14);
        assert_eq!(layout.to_vector(&rig, &pose).unwrap(), q);
    }

    #[test]
    fn test_size_mismatch() {
        let rig = builtin::three_link_arm::<f32>().unwrap();
        let layout = ConfigLayout::new(&rig);
        match layout.to_pose(&DVector::<f32>::zeros(3)) {
            Err(Error::SizeMismatch { input, required }) => {
                assert_eq!(input, 3);
                assert_eq!(required, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
