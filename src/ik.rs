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
use crate::fk::{forward_kinematics, Frames};
use crate::funcs::jacobian_at;
use crate::layout::ConfigLayout;
use crate::pose::Pose;
use crate::rig::Rig;
use na::{Matrix4, RealField, Vector3};
use nalgebra as na;
use tracing::{debug, warn};

/// Result of a solve
#[derive(Debug, Clone)]
pub struct IkSolution<T: RealField> {
    /// Pose which contains all the joints of the rig
    pub pose: Pose<T>,
    /// `target - position` of the effector for `pose`
    pub error: Vector3<T>,
    /// Number of the updates of the joint angles
    pub iterations: usize,
    /// Frames of `pose`
    pub frames: Frames<T>,
    /// False if the iteration limit was reached before the tolerance
    pub converged: bool,
}

impl<T: RealField> IkSolution<T> {
    /// Distance between the effector and the target
    pub fn distance(&self) -> T {
        self.error.norm()
    }
    /// Turn a solution which missed the tolerance into `Error::NotConverged`
    pub fn into_converged(self) -> Result<Self, Error> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NotConverged {
                iterations: self.iterations,
                distance: na::try_convert::<T, f64>(self.distance()).unwrap_or(f64::NAN),
            })
        }
    }
}

/// IK solver
pub trait InverseKinematicsSolver<T: RealField> {
    /// Move `effector` toward `target` in world coordinates, starting from `pose`
    ///
    /// The last pose is returned even if the iteration limit is reached,
    /// with `converged` set to false.
    fn solve_partial(
        &self,
        rig: &Rig<T>,
        pose: &Pose<T>,
        effector: &str,
        target: &Vector3<T>,
        base: Option<&Matrix4<T>>,
    ) -> Result<IkSolution<T>, Error>;

    /// Move `effector` to `target` in world coordinates, starting from `pose`
    ///
    /// Fails with `Error::NotConverged` if the iteration limit is reached.
    fn solve(
        &self,
        rig: &Rig<T>,
        pose: &Pose<T>,
        effector: &str,
        target: &Vector3<T>,
        base: Option<&Matrix4<T>>,
    ) -> Result<IkSolution<T>, Error> {
        self.solve_partial(rig, pose, effector, target, base)?
            .into_converged()
    }
}

/// Inverse Kinematics Solver using the transpose of the position Jacobian
///
/// Every iteration moves the configuration by `step * J^T * e`, where `e` is
/// `target - position`. The Jacobian is calculated numerically with `delta`.
/// `step` must be small enough for the size of the rig, otherwise the joints
/// overshoot and the solve does not converge.
///
/// # Examples
///
/// ```
/// use kinrig::*;
///
/// let rig = builtin::three_link_arm::<f64>().unwrap();
/// let mut goal = Pose::new();
/// goal.insert("joint_1_XYZ", [0.0, 0.5, 0.0]);
/// goal.insert("joint_2_XYZ", [0.0, 0.8, 0.0]);
/// let target = rig
///     .forward_kinematics(&goal, None)
///     .unwrap()
///     .position("end_effector")
///     .unwrap();
///
/// let solver = JacobianTransposeSolverBuilder::new()
///     .step(0.004)
///     .max_iterations(1000)
///     .finalize();
/// let solution = solver
///     .solve(&rig, &Pose::new(), "end_effector", &target, None)
///     .unwrap();
/// assert!(solution.error.norm_squared() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct JacobianTransposeSolver<T: RealField> {
    /// Gain of the update
    pub step: T,
    /// Solved if the squared distance to the target is smaller than this
    pub tolerance: T,
    pub max_iterations: usize,
    /// Finite difference of the joint angles for the Jacobian
    pub delta: T,
}

impl<T: RealField> JacobianTransposeSolver<T> {
    pub fn new(step: T, tolerance: T, max_iterations: usize, delta: T) -> Self {
        JacobianTransposeSolver {
            step,
            tolerance,
            max_iterations,
            delta,
        }
    }
}

impl<T: RealField> Default for JacobianTransposeSolver<T> {
    fn default() -> Self {
        JacobianTransposeSolverBuilder::new().finalize()
    }
}

impl<T: RealField> InverseKinematicsSolver<T> for JacobianTransposeSolver<T> {
    fn solve_partial(
        &self,
        rig: &Rig<T>,
        pose: &Pose<T>,
        effector: &str,
        target: &Vector3<T>,
        base: Option<&Matrix4<T>>,
    ) -> Result<IkSolution<T>, Error> {
        if rig.find(effector).is_none() {
            return Err(Error::Precondition {
                message: format!("{effector} is not found in {}", rig.name()),
            });
        }
        let layout = ConfigLayout::new(rig);
        if layout.is_empty() {
            return Err(Error::Precondition {
                message: format!("{} has no degrees of freedom", rig.name()),
            });
        }
        let mut q = layout.to_vector(rig, pose)?;
        let mut iterations = 0;
        loop {
            let current = layout.to_pose(&q)?;
            let frames = forward_kinematics(rig, &current, base)?;
            let position = frames
                .position(effector)
                .ok_or_else(|| Error::UnknownJointName {
                    joint_name: effector.to_owned(),
                })?;
            let error = target - &position;
            let distance = error.norm_squared();
            debug!("iteration {iterations}: squared distance = {distance}");
            let converged = distance < self.tolerance;
            if converged || iterations >= self.max_iterations {
                if !converged {
                    warn!(
                        "ik for {effector} not converged after {iterations} iterations, distance = {}",
                        distance.sqrt()
                    );
                }
                return Ok(IkSolution {
                    pose: current,
                    error,
                    iterations,
                    frames,
                    converged,
                });
            }
            let jacobi = jacobian_at(
                rig,
                &layout,
                &q,
                &position,
                effector,
                base,
                self.delta.clone(),
            )?;
            q += jacobi.transpose() * error * self.step.clone();
            iterations += 1;
        }
    }
}

/// Build `JacobianTransposeSolver`
///
/// This builder allows the initialization of `JacobianTransposeSolver`
/// without any parameters.
///
/// ```
/// use kinrig::*;
///
/// let solver = JacobianTransposeSolverBuilder::<f64>::new().finalize();
/// assert_eq!(solver.step, 0.5);
/// assert_eq!(solver.tolerance, 1.0e-4);
/// assert_eq!(solver.max_iterations, 100);
/// assert_eq!(solver.delta, 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct JacobianTransposeSolverBuilder<T: RealField> {
    pub step: T,
    pub tolerance: T,
    pub max_iterations: usize,
    pub delta: T,
}

impl<T: RealField> JacobianTransposeSolverBuilder<T> {
    pub fn new() -> Self {
        JacobianTransposeSolverBuilder {
            step: na::convert(0.5),
            tolerance: na::convert(1.0e-4),
            max_iterations: 100,
            delta: na::convert(0.1),
        }
    }
    pub fn step(mut self, step: T) -> Self {
        self.step = step;
        self
    }
    pub fn tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    pub fn delta(mut self, delta: T) -> Self {
        self.delta = delta;
        self
    }
    pub fn finalize(self) -> JacobianTransposeSolver<T> {
        JacobianTransposeSolver {
            step: self.step,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            delta: self.delta,
        }
    }
}

impl<T: RealField> Default for JacobianTransposeSolverBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin;
    use approx::assert_relative_eq;

    #[test]
    fn test_unknown_effector() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let solver = JacobianTransposeSolver::<f64>::default();
        assert!(matches!(
            solver.solve(&rig, &Pose::new(), "hand", &Vector3::zeros(), None),
            Err(Error::Precondition { .. })
        ));
    }

    #[test]
    fn test_rig_without_joints() {
        let rig = crate::rig::RigBuilder::<f64>::new("stick")
            .node("root", None, Matrix4::identity(), crate::joint::NodeKind::Fixed)
            .node(
                "tip",
                Some("root"),
                Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)),
                crate::joint::NodeKind::Effector,
            )
            .finalize()
            .unwrap();
        let solver = JacobianTransposeSolver::<f64>::default();
        assert!(matches!(
            solver.solve(&rig, &Pose::new(), "tip", &Vector3::zeros(), None),
            Err(Error::Precondition { .. })
        ));
    }

    #[test]
    fn test_already_solved() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let solver = JacobianTransposeSolver::<f64>::default();
        let solution = solver
            .solve(
                &rig,
                &Pose::new(),
                "end_effector",
                &Vector3::new(0.0, 0.0, 19.0),
                None,
            )
            .unwrap();
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.pose.len(), 3);
        assert!(solution.converged);
    }

    #[test]
    fn test_not_converged() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let solver = JacobianTransposeSolverBuilder::new()
            .step(0.001)
            .max_iterations(3)
            .finalize();
        match solver.solve(
            &rig,
            &Pose::new(),
            "end_effector",
            &Vector3::new(10.0, 0.0, 5.0),
            None,
        ) {
            Err(Error::NotConverged { iterations, distance }) => {
                assert_eq!(iterations, 3);
                assert!(distance > 1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_partial_solution_keeps_progress() {
        let rig = builtin::three_link_arm::<f64>().unwrap();
        let target = Vector3::new(10.0, 0.0, 5.0);
        let start = (target - Vector3::new(0.0, 0.0, 19.0)).norm();
        let solver = JacobianTransposeSolverBuilder::new()
            .step(0.001)
            .max_iterations(3)
            .finalize();
        let solution = solver
            .solve_partial(&rig, &Pose::new(), "end_effector", &target, None)
            .unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 3);
        assert!(solution.distance() < start);
        assert_relative_eq!(
            solution.frames.position("end_effector").unwrap(),
            target - solution.error,
            epsilon = 1e-12
        );
        assert!(matches!(
            solution.into_converged(),
            Err(Error::NotConverged { iterations: 3, .. })
        ));
    }
}
