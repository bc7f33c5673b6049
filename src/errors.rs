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
use thiserror::Error;

/// The reason of the failure of rig construction, evaluation or solving
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("joint: {joint_name} is not found in the rig")]
    UnknownJointName { joint_name: String },
    #[error("joint: {joint_name} requires the value for axes {axes}")]
    MissingRequiredAxis { joint_name: String, axes: String },
    #[error("node: {name} is defined twice")]
    DuplicateName { name: String },
    #[error("node: {name} refers unknown parent {parent}")]
    UnknownParent { name: String, parent: String },
    #[error("node: {name} is defined before its parent {parent}")]
    ParentOrder { name: String, parent: String },
    #[error("effector: {effector} can not have children")]
    EffectorHasChildren { effector: String },
    #[error("rig has two roots: {first} and {second}")]
    MultipleRoots { first: String, second: String },
    #[error("rig has no nodes")]
    EmptyRig,
    #[error("size mismatch input = {input}, required = {required}")]
    SizeMismatch { input: usize, required: usize },
    #[error("ik solve not converged after {iterations} iterations (distance = {distance})")]
    NotConverged { iterations: usize, distance: f64 },
    #[error("ik precondition error: {message}")]
    Precondition { message: String },
    #[error("rig: {name} is not registered")]
    UnknownRig { name: String },
    #[error("failed to parse rig description: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("failed to serialize rig description: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("route level must be an integer: {text:?}")]
    InvalidRouteLevel { text: String },
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
