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
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Rotation axis of a joint
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn bit(self) -> u8 {
        match self {
            Axis::X => 0b001,
            Axis::Y => 0b010,
            Axis::Z => 0b100,
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// Set of rotation axes
///
/// Iteration always yields the axes in the order they are applied: Z, Y, then X.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AxisSet(u8);

/// Evaluation order of the axes
const APPLY_ORDER: [Axis; 3] = [Axis::Z, Axis::Y, Axis::X];

impl AxisSet {
    /// Empty set
    pub const fn empty() -> Self {
        AxisSet(0)
    }
    /// `{Z}`, a single axis joint
    pub const fn z() -> Self {
        AxisSet(0b100)
    }
    /// `{X, Y, Z}`, a ball joint
    pub const fn xyz() -> Self {
        AxisSet(0b111)
    }
    /// # Examples
    ///
    /// ```
    /// use kinrig::joint::{Axis, AxisSet};
    ///
    /// let axes = AxisSet::from_axes(&[Axis::X, Axis::Z]);
    /// assert!(axes.contains(Axis::X));
    /// assert!(!axes.contains(Axis::Y));
    /// assert_eq!(axes.len(), 2);
    /// ```
    pub fn from_axes(axes: &[Axis]) -> Self {
        AxisSet(axes.iter().fold(0, |bits, axis| bits | axis.bit()))
    }
    pub fn contains(&self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }
    pub fn insert(&mut self, axis: Axis) {
        self.0 |= axis.bit();
    }
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    /// True if only the Z axis is contained, the joint takes a scalar value
    pub fn is_single_z(&self) -> bool {
        *self == AxisSet::z()
    }
    /// Iterate the axes in the order of application (Z, Y, X)
    ///
    /// # Examples
    ///
    /// ```
    /// use kinrig::joint::{Axis, AxisSet};
    ///
    /// let order = AxisSet::xyz().iter().collect::<Vec<_>>();
    /// assert_eq!(order, vec![Axis::Z, Axis::Y, Axis::X]);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        APPLY_ORDER.iter().copied().filter(move |a| self.contains(*a))
    }
    /// Axes in `X, Y, Z` order, the order used for serialization and labels
    pub fn to_vec(&self) -> Vec<Axis> {
        [Axis::X, Axis::Y, Axis::Z]
            .iter()
            .copied()
            .filter(|a| self.contains(*a))
            .collect()
    }
}

impl Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for axis in self.to_vec() {
            write!(f, "{axis}")?;
        }
        Ok(())
    }
}

#[test]
fn test_axis_set_display() {
    assert_eq!(AxisSet::xyz().to_string(), "XYZ");
    assert_eq!(AxisSet::z().to_string(), "Z");
    assert_eq!(AxisSet::empty().to_string(), "");
    let mut set = AxisSet::empty();
    set.insert(Axis::Y);
    set.insert(Axis::Y);
    assert_eq!(set.len(), 1);
    assert!(!set.is_single_z());
}
