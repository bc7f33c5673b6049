/*
  Copyright 2017 Takashi Ogura

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
use crate::fk::forward_kinematics;
use crate::layout::ConfigLayout;
use crate::pose::Pose;
use crate::rig::Rig;
use na::{DVector, Matrix3xX, Matrix4, RealField, Vector3};
use nalgebra as na;

/// World position of `effector` for `pose`
pub fn effector_position<T: RealField>(
    rig: &Rig<T>,
    pose: &Pose<T>,
    effector: &str,
    base: Option<&Matrix4<T>>,
) -> Result<Vector3<T>, Error> {
    if rig.find(effector).is_none() {
        return Err(Error::UnknownJointName {
            joint_name: effector.to_owned(),
        });
    }
    forward_kinematics(rig, pose, base)?
        .position(effector)
        .ok_or_else(|| Error::UnknownJointName {
            joint_name: effector.to_owned(),
        })
}

/// Calculate the position Jacobian of `effector` by forward difference
///
/// Column `i` is `(p(q + delta * e_i) - p(q)) / delta`, where `q` is the
/// configuration vector of `pose` in the order of `layout`.
///
/// # Examples
///
/// ```
/// use kinrig::*;
///
/// let rig = builtin::three_link_arm::<f64>().unwrap();
/// let layout = ConfigLayout::new(&rig);
/// let jacobi = position_jacobian(&rig, &layout, &Pose::new(), "end_effector", None, 1e-6).unwrap();
/// assert_eq!(jacobi.ncols(), 7);
/// // rotating joint_3_Z does not move the effector on its own axis
/// assert!(jacobi.column(6).norm() < 1e-6);
/// // rotating joint_1_XYZ around x moves the effector to -y
/// assert!((jacobi[(1, 0)] + 18.0).abs() < 1e-3);
/// ```
pub fn position_jacobian<T: RealField>(
    rig: &Rig<T>,
    layout: &ConfigLayout,
    pose: &Pose<T>,
    effector: &str,
    base: Option<&Matrix4<T>>,
    delta: T,
) -> Result<Matrix3xX<T>, Error> {
    let q = layout.to_vector(rig, pose)?;
    let p0 = effector_position(rig, &layout.to_pose(&q)?, effector, base)?;
    jacobian_at(rig, layout, &q, &p0, effector, base, delta)
}

pub(crate) fn jacobian_at<T: RealField>(
    rig: &Rig<T>,
    layout: &ConfigLayout,
    q: &DVector<T>,
    p0: &Vector3<T>,
    effector: &str,
    base: Option<&Matrix4<T>>,
    delta: T,
) -> Result<Matrix3xX<T>, Error> {
    let mut jacobi = Matrix3xX::zeros(layout.len());
    for i in 0..layout.len() {
        let mut moved = q.clone();
        moved[i] += delta.clone();
        let p = effector_position(rig, &layout.to_pose(&moved)?, effector, base)?;
        jacobi.set_column(i, &((p - p0) / delta.clone()));
    }
    Ok(jacobi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_unknown_effector() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let layout = ConfigLayout::new(&rig);
        match position_jacobian(&rig, &layout, &Pose::new(), "hand", None, 0.1) {
            Err(Error::UnknownJointName { joint_name }) => assert_eq!(joint_name, "hand"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_jacobian_of_bent_arm() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let layout = ConfigLayout::new(&rig);
        let mut pose = Pose::new();
        pose.insert("joint_2_XYZ", [0.0, std::f64::consts::FRAC_PI_2, 0.0]);
        let jacobi = position_jacobian(&rig, &layout, &pose, "end_effector", None, 1e-7).unwrap();
        // effector at (12, 0, 7), joint_1 at (0, 0, 1)
        let column = jacobi.column(layout.index_of("joint_1_XYZ/z").unwrap());
        assert_abs_diff_eq!(column[0], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(column[1], 12.0, epsilon = 1e-4);
        assert_abs_diff_eq!(column[2], 0.0, epsilon = 1e-4);
        // the distal hinge turns around the arm itself
        let column = jacobi.column(layout.index_of("joint_3_Z").unwrap());
        assert_abs_diff_eq!(column.norm(), 0.0, epsilon = 1e-4);
    }
}
