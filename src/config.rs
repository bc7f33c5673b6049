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
//! # Load rig descriptions written in [RON](https://github.com/ron-rs/ron)
//!
//! A rig description is a versioned table of nodes. Offsets are row-major
//! `4x4` matrices relative to the parent node.
//!
//! ```text
//! (
//!     name: "arm",
//!     revision: 1,
//!     nodes: [
//!         (name: "base", parent: None, kind: Fixed, offset: (...)),
//!         (name: "shoulder", parent: Some("base"), kind: Rotational(axes: [X, Y, Z]), offset: (...)),
//!         (name: "hand", parent: Some("shoulder"), kind: Effector, offset: (...)),
//!     ],
//!     home_pose: Some({ "shoulder": Triple(x: 0.0, y: 0.5, z: 0.0) }),
//! )
//! ```
use crate::errors::*;
use crate::joint::{Axis, AxisSet, NodeKind};
use crate::math::{matrix_from_rows, matrix_to_rows};
use crate::pose::{convert_pose, JointValue, Pose};
use crate::rig::{Rig, RigBuilder};
use na::RealField;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use simba::scalar::{SubsetOf, SupersetOf};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Serialized form of `NodeKind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindDescription {
    Fixed,
    Rotational { axes: Vec<Axis> },
    Effector,
}

impl From<KindDescription> for NodeKind {
    fn from(kind: KindDescription) -> Self {
        match kind {
            KindDescription::Fixed => NodeKind::Fixed,
            KindDescription::Rotational { axes } => NodeKind::Rotational {
                axes: AxisSet::from_axes(&axes),
            },
            KindDescription::Effector => NodeKind::Effector,
        }
    }
}

impl From<NodeKind> for KindDescription {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Fixed => KindDescription::Fixed,
            NodeKind::Rotational { axes } => KindDescription::Rotational {
                axes: axes.to_vec(),
            },
            NodeKind::Effector => KindDescription::Effector,
        }
    }
}

/// Serialized form of `RigNode`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    pub parent: Option<String>,
    pub kind: KindDescription,
    /// row-major transform relative to the parent
    pub offset: [[f64; 4]; 4],
}

/// Serialized form of `Rig`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDescription {
    pub name: String,
    #[serde(default)]
    pub revision: u32,
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub home_pose: Option<Pose<f64>>,
}

impl RigDescription {
    /// Parse RON text
    pub fn from_ron_str(text: &str) -> Result<Self, Error> {
        Ok(ron::from_str(text)?)
    }

    /// Read RON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("loading rig description from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Serialize into pretty RON text
    pub fn to_ron_string(&self) -> Result<String, Error> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Build the rig table
    ///
    /// # Examples
    ///
    /// ```
    /// let text = r#"(
    ///     name: "stick",
    ///     nodes: [
    ///         (name: "base", parent: None, kind: Fixed,
    ///          offset: ((1.0, 0.0, 0.0, 0.0), (0.0, 1.0, 0.0, 0.0), (0.0, 0.0, 1.0, 0.0), (0.0, 0.0, 0.0, 1.0))),
    ///         (name: "tip", parent: Some("base"), kind: Effector,
    ///          offset: ((1.0, 0.0, 0.0, 0.0), (0.0, 1.0, 0.0, 0.0), (0.0, 0.0, 1.0, 2.0), (0.0, 0.0, 0.0, 1.0))),
    ///     ],
    /// )"#;
    /// let rig = kinrig::RigDescription::from_ron_str(text)
    ///     .unwrap()
    ///     .into_rig::<f32>()
    ///     .unwrap();
    /// assert_eq!(rig.len(), 2);
    /// assert_eq!(rig.find("tip").unwrap().offset[(2, 3)], 2.0);
    /// ```
    pub fn into_rig<T>(self) -> Result<Rig<T>, Error>
    where
        T: RealField + SupersetOf<f64>,
    {
        let mut builder = RigBuilder::new(&self.name).revision(self.revision);
        for node in self.nodes {
            builder = builder.node(
                &node.name,
                node.parent.as_deref(),
                matrix_from_rows(&node.offset),
                node.kind.into(),
            );
        }
        if let Some(home) = &self.home_pose {
            builder = builder.home_pose(convert_pose(home));
        }
        builder.finalize()
    }
}

impl<T> Rig<T>
where
    T: RealField + SubsetOf<f64>,
{
    /// Convert back into the serializable description
    pub fn to_description(&self) -> RigDescription {
        let nodes = self
            .iter()
            .map(|node| NodeDescription {
                name: node.name.clone(),
                parent: node.parent.map(|p| self.nodes()[p].name.clone()),
                kind: node.kind.into(),
                offset: matrix_to_rows(&node.offset),
            })
            .collect();
        let home_pose = if self.home_pose().is_empty() {
            None
        } else {
            Some(
                self.home_pose()
                    .iter()
                    .map(|(name, value)| {
                        let value: JointValue<f64> = match value {
                            JointValue::Single(z) => JointValue::Single(na::convert(z.clone())),
                            JointValue::Triple { x, y, z } => JointValue::Triple {
                                x: na::convert(x.clone()),
                                y: na::convert(y.clone()),
                                z: na::convert(z.clone()),
                            },
                        };
                        (name.clone(), value)
                    })
                    .collect(),
            )
        };
        RigDescription {
            name: self.name().to_owned(),
            revision: self.revision(),
            nodes,
            home_pose,
        }
    }
}

/// Named rig configurations
///
/// Each variant of a rig is kept as a separate configuration, keyed by its name.
///
/// # Examples
///
/// ```
/// let registry = kinrig::RigRegistry::<f64>::with_builtin().unwrap();
/// assert_eq!(registry.names(), vec!["taiwan_bear", "three_link_arm"]);
/// let bear = registry.get("taiwan_bear").unwrap();
/// assert_eq!(bear.root().name, "TaiwanBear");
/// assert!(registry.get("dragon").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RigRegistry<T: RealField> {
    rigs: BTreeMap<String, Rig<T>>,
}

impl<T: RealField> Default for RigRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField> RigRegistry<T> {
    pub fn new() -> Self {
        RigRegistry {
            rigs: BTreeMap::new(),
        }
    }
    /// Register the rig, the rig with the same name is replaced and returned
    pub fn insert(&mut self, rig: Rig<T>) -> Option<Rig<T>> {
        let old = self.rigs.insert(rig.name().to_owned(), rig);
        if let Some(ref old) = old {
            warn!(
                "rig {} revision {} is replaced",
                old.name(),
                old.revision()
            );
        }
        old
    }
    pub fn get(&self, name: &str) -> Result<&Rig<T>, Error> {
        self.rigs.get(name).ok_or_else(|| Error::UnknownRig {
            name: name.to_owned(),
        })
    }
    pub fn contains(&self, name: &str) -> bool {
        self.rigs.contains_key(name)
    }
    /// Names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.rigs.keys().map(String::as_str).collect()
    }
    pub fn len(&self) -> usize {
        self.rigs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Rig<T>> {
        self.rigs.values()
    }
}

impl<T> RigRegistry<T>
where
    T: RealField + SupersetOf<f64>,
{
    /// Registry which contains all the built-in rigs
    pub fn with_builtin() -> Result<Self, Error> {
        let mut registry = Self::new();
        for text in builtin::SOURCES {
            registry.load_ron_str(text)?;
        }
        Ok(registry)
    }
    /// Parse and register a RON rig description, returns its name
    pub fn load_ron_str(&mut self, text: &str) -> Result<String, Error> {
        let rig = RigDescription::from_ron_str(text)?.into_rig()?;
        let name = rig.name().to_owned();
        self.insert(rig);
        Ok(name)
    }
    /// Read and register a RON rig description file, returns its name
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<String, Error> {
        let rig = RigDescription::from_file(path)?.into_rig()?;
        let name = rig.name().to_owned();
        self.insert(rig);
        Ok(name)
    }
}

/// Rigs compiled into the library
pub mod builtin {
    use super::*;

    /// Quadruped rig rooted at `TaiwanBear`
    pub const TAIWAN_BEAR: &str = include_str!("../rigs/taiwan_bear.ron");
    /// Three-link arm: `base`, two ball joints and a hinge
    pub const THREE_LINK_ARM: &str = include_str!("../rigs/three_link_arm.ron");

    pub(crate) const SOURCES: [&str; 2] = [TAIWAN_BEAR, THREE_LINK_ARM];

    pub fn taiwan_bear<T>() -> Result<Rig<T>, Error>
    where
        T: RealField + SupersetOf<f64>,
    {
        RigDescription::from_ron_str(TAIWAN_BEAR)?.into_rig()
    }

    pub fn three_link_arm<T>() -> Result<Rig<T>, Error>
    where
        T: RealField + SupersetOf<f64>,
    {
        RigDescription::from_ron_str(THREE_LINK_ARM)?.into_rig()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_round_trip() {
        let rig = builtin::taiwan_bear::<f64>().unwrap();
        let desc = rig.to_description();
        assert_eq!(desc, RigDescription::from_ron_str(builtin::TAIWAN_BEAR).unwrap());
        let text = desc.to_ron_string().unwrap();
        let rig2 = RigDescription::from_ron_str(&text)
            .unwrap()
            .into_rig::<f64>()
            .unwrap();
        assert_eq!(rig2.nodes(), rig.nodes());
        assert_eq!(rig2.home_pose(), rig.home_pose());
    }

    #[test]
    fn test_unknown_parent_in_description() {
        let text = r#"(
            name: "broken",
            nodes: [
                (name: "a", parent: Some("missing"), kind: Fixed,
                 offset: ((1.0, 0.0, 0.0, 0.0), (0.0, 1.0, 0.0, 0.0), (0.0, 0.0, 1.0, 0.0), (0.0, 0.0, 0.0, 1.0))),
            ],
        )"#;
        let err = RigDescription::from_ron_str(text)
            .unwrap()
            .into_rig::<f64>()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParent { .. }));
    }

    #[test]
    fn test_home_pose_is_validated() {
        let text = r#"(
            name: "stick",
            nodes: [
                (name: "a", parent: None, kind: Rotational(axes: [Z]),
                 offset: ((1.0, 0.0, 0.0, 0.0), (0.0, 1.0, 0.0, 0.0), (0.0, 0.0, 1.0, 0.0), (0.0, 0.0, 0.0, 1.0))),
            ],
            home_pose: Some({ "b": Single(0.1) }),
        )"#;
        let err = RigDescription::from_ron_str(text)
            .unwrap()
            .into_rig::<f64>()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownJointName { .. }));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            RigDescription::from_ron_str("(name: "),
            Err(Error::Ron(_))
        ));
    }

    #[test]
    fn test_registry_replace() {
        let mut registry = RigRegistry::<f32>::with_builtin().unwrap();
        assert_eq!(registry.len(), 2);
        let mut arm = builtin::three_link_arm::<f32>().unwrap();
        arm.set_revision(2);
        let old = registry.insert(arm).unwrap();
        assert_eq!(old.revision(), 1);
        assert_eq!(registry.get("three_link_arm").unwrap().revision(), 2);
        assert_eq!(registry.len(), 2);
    }
}
