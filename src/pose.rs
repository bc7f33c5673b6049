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
//! Joint angles keyed by joint name
use crate::errors::*;
use crate::joint::{Axis, AxisSet};
use crate::math::rot;
use na::{Matrix4, RealField};
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Angle(s) of one joint [rad]
///
/// `Single` is for joints rotating around Z only, `Triple` for the joints with
/// their own X, Y and Z axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JointValue<T> {
    Single(T),
    Triple { x: T, y: T, z: T },
}

impl<T: RealField> JointValue<T> {
    /// `Triple` from `[x, y, z]`
    pub fn triple(xyz: [T; 3]) -> Self {
        let [x, y, z] = xyz;
        JointValue::Triple { x, y, z }
    }

    fn angle(&self, axis: Axis) -> Option<T> {
        match (self, axis) {
            (JointValue::Single(z), Axis::Z) => Some(z.clone()),
            (JointValue::Single(_), _) => None,
            (JointValue::Triple { x, .. }, Axis::X) => Some(x.clone()),
            (JointValue::Triple { y, .. }, Axis::Y) => Some(y.clone()),
            (JointValue::Triple { z, .. }, Axis::Z) => Some(z.clone()),
        }
    }

    /// Check the shape of this value against the axes of `joint_name`
    ///
    /// A single-axis (Z) joint takes `Single`, every other axis set takes `Triple`.
    pub fn check_axes(&self, joint_name: &str, axes: AxisSet) -> Result<(), Error> {
        let ok = match self {
            JointValue::Single(_) => axes.is_single_z(),
            JointValue::Triple { .. } => !axes.is_single_z(),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::MissingRequiredAxis {
                joint_name: joint_name.to_owned(),
                axes: axes.to_string(),
            })
        }
    }

    /// Rotation composed in Z, Y, X order for the given axes
    ///
    /// # Examples
    ///
    /// ```
    /// use kinrig::joint::AxisSet;
    /// use kinrig::JointValue;
    /// use kinrig::math::euler_zyx;
    ///
    /// let v = JointValue::triple([0.1, 0.2, 0.3]);
    /// let r = v.rotation("ball", AxisSet::xyz()).unwrap();
    /// assert_eq!(r, euler_zyx(0.3, 0.2, 0.1));
    ///
    /// // a scalar can not drive a ball joint
    /// assert!(JointValue::Single(0.1).rotation("ball", AxisSet::xyz()).is_err());
    /// ```
    pub fn rotation(&self, joint_name: &str, axes: AxisSet) -> Result<Matrix4<T>, Error> {
        self.check_axes(joint_name, axes)?;
        let mut rotation = Matrix4::identity();
        for axis in axes.iter() {
            let angle = self.angle(axis).ok_or_else(|| Error::MissingRequiredAxis {
                joint_name: joint_name.to_owned(),
                axes: axes.to_string(),
            })?;
            rotation *= rot(axis, angle);
        }
        Ok(rotation)
    }
}

macro_rules! impl_joint_value_from {
    ($t:ty) => {
        impl From<$t> for JointValue<$t> {
            fn from(angle: $t) -> Self {
                JointValue::Single(angle)
            }
        }

        impl From<[$t; 3]> for JointValue<$t> {
            fn from(xyz: [$t; 3]) -> Self {
                let [x, y, z] = xyz;
                JointValue::Triple { x, y, z }
            }
        }
    };
}

impl_joint_value_from!(f32);
impl_joint_value_from!(f64);

/// Mapping from joint name to its angle(s)
///
/// Joints which are not contained stay at their rest orientation.
///
/// # Examples
///
/// ```
/// use kinrig::{JointValue, Pose};
///
/// let mut pose = Pose::<f64>::new();
/// pose.insert("RJoint_Back_Lower_Z_L", 0.5);
/// pose.insert("RJoint_Head_XYZ_C", [0.0, 0.1, 0.2]);
/// assert_eq!(pose.len(), 2);
/// assert_eq!(pose.get("RJoint_Back_Lower_Z_L"), Some(&JointValue::Single(0.5)));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose<T> {
    values: BTreeMap<String, JointValue<T>>,
}

impl<T> Pose<T> {
    pub fn new() -> Self {
        Pose {
            values: BTreeMap::new(),
        }
    }
    /// Set the value of the joint, returns the old value if exists
    pub fn insert<V>(&mut self, joint_name: &str, value: V) -> Option<JointValue<T>>
    where
        V: Into<JointValue<T>>,
    {
        self.values.insert(joint_name.to_owned(), value.into())
    }
    pub fn remove(&mut self, joint_name: &str) -> Option<JointValue<T>> {
        self.values.remove(joint_name)
    }
    pub fn get(&self, joint_name: &str) -> Option<&JointValue<T>> {
        self.values.get(joint_name)
    }
    pub fn contains(&self, joint_name: &str) -> bool {
        self.values.contains_key(joint_name)
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    /// Iterate in the order of joint names
    pub fn iter(&self) -> btree_map::Iter<'_, String, JointValue<T>> {
        self.values.iter()
    }
}

impl<T, V> FromIterator<(String, V)> for Pose<T>
where
    V: Into<JointValue<T>>,
{
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Pose {
            values: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Pose<T> {
    type Item = (&'a String, &'a JointValue<T>);
    type IntoIter = btree_map::Iter<'a, String, JointValue<T>>;
    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Convert a `f64` pose (as stored in rig descriptions) into the scalar of the rig
pub(crate) fn convert_pose<T>(pose: &Pose<f64>) -> Pose<T>
where
    T: RealField + simba::scalar::SupersetOf<f64>,
{
    pose.iter()
        .map(|(name, value)| {
            let value: JointValue<T> = match value {
                JointValue::Single(z) => JointValue::Single(na::convert(*z)),
                JointValue::Triple { x, y, z } => JointValue::Triple {
                    x: na::convert(*x),
                    y: na::convert(*y),
                    z: na::convert(*z),
                },
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{rot_x, rot_y, rot_z};

    #[test]
    fn test_single_value_for_z_joint() {
        let r = JointValue::Single(0.4)
            .rotation("knee", AxisSet::z())
            .unwrap();
        assert_eq!(r, rot_z(0.4));
    }

    #[test]
    fn test_triple_for_z_joint_is_error() {
        let err = JointValue::triple([0.0, 0.0, 0.4])
            .rotation("knee", AxisSet::z())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredAxis { ref joint_name, ref axes } if joint_name == "knee" && axes == "Z"
        ));
    }

    #[test]
    fn test_partial_axes_use_triple() {
        let axes = AxisSet::from_axes(&[Axis::X, Axis::Y]);
        let r = JointValue::triple([0.1, 0.2, 100.0])
            .rotation("wrist", axes)
            .unwrap();
        assert_eq!(r, rot_y(0.2) * rot_x(0.1));
    }

    #[test]
    fn test_pose_from_iter_and_ron() {
        let pose: Pose<f64> = vec![("a".to_owned(), 1.0f64), ("b".to_owned(), 2.0)]
            .into_iter()
            .collect();
        assert_eq!(pose.len(), 2);
        let text = ron::to_string(&pose).unwrap();
        let back: Pose<f64> = ron::from_str(&text).unwrap();
        assert_eq!(back, pose);
        let parsed: Pose<f64> =
            ron::from_str(r#"{ "head": Triple(x: 0.1, y: 0.2, z: 0.3), "knee": Single(0.5) }"#)
                .unwrap();
        assert_eq!(parsed.get("head"), Some(&JointValue::triple([0.1, 0.2, 0.3])));
        assert_eq!(convert_pose::<f32>(&parsed).get("knee"), Some(&JointValue::Single(0.5f32)));
    }
}
