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
//! # Kinematics of table-driven character rigs using [nalgebra](http://nalgebra.org).
//!
//! `kinrig` has below functionalities
//!
//! 1. Forward kinematics of a fixed tree of joints, effectors and fixed links
//! 1. Rig descriptions in RON and a registry of named rigs
//! 1. Flat configuration vectors and the numeric position Jacobian
//! 1. Inverse kinematics of an effector position
//! 1. Climbing routes and hanging a rig on the closest legal holds
//!
//! See `Rig` as the top level interface.
//!
//! ```
//! use kinrig::*;
//!
//! let rig = builtin::taiwan_bear::<f64>().unwrap();
//! let mut pose = Pose::new();
//! pose.insert("RJoint_Head_XYZ_C", [0.1, 0.0, 0.2]);
//! pose.insert("RJoint_Back_Lower_Z_L", 0.3);
//! let frames = rig.forward_kinematics(&pose, None).unwrap();
//! assert_eq!(frames.len(), rig.len());
//! assert!(frames.position("Effector_Head_C").is_some());
//! ```
mod errors;
mod fk;
mod funcs;
mod ik;
mod layout;
mod pose;
mod rig;
use nalgebra as na;
pub mod config;
pub mod joint;
pub mod math;
pub mod route;

pub use self::config::{builtin, RigDescription, RigRegistry};
pub use self::errors::*;
pub use self::fk::*;
pub use self::funcs::*;
pub use self::ik::*;
pub use self::layout::ConfigLayout;
pub use self::pose::{JointValue, Pose};
pub use self::rig::{Rig, RigBuilder, RigNode};

// re-export from nalgebra
pub use na::{Matrix4, RealField, Vector3};
pub use simba::scalar::{SubsetOf, SupersetOf};
