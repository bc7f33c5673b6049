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
//! Climbing routes and hanging a rig on them
use crate::errors::*;
use crate::ik::{InverseKinematicsSolver, JacobianTransposeSolver, JacobianTransposeSolverBuilder};
use crate::math::position_of;
use crate::pose::Pose;
use crate::rig::Rig;
use na::{Matrix4, RealField, Vector3};
use nalgebra as na;
use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Leg effectors of `taiwan_bear` in the order they are placed
pub const LEG_EFFECTORS: [&str; 4] = [
    "Effector_Back_L",
    "Effector_Back_R",
    "Effector_Front_L",
    "Effector_Front_R",
];

/// An effector holds on if its squared distance to the hold is not larger than this
pub const GRIP_TOLERANCE: f64 = 0.1;

/// Which limbs may use a hold, relative to the center of mass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Only from the right of the center of mass (`x >= com.x`)
    Left,
    /// Only from the left of the center of mass (`x <= com.x`)
    Right,
    Center,
}

/// Shape of a hold, one glyph each in the route text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldKind {
    /// `U`
    JugCenter1,
    /// `R`
    JugRight1,
    /// `L`
    JugLeft1,
    /// `C`
    CrimpCenter1,
    /// `V`
    JugCenter2,
}

impl HoldKind {
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'U' => Some(HoldKind::JugCenter1),
            'R' => Some(HoldKind::JugRight1),
            'L' => Some(HoldKind::JugLeft1),
            'C' => Some(HoldKind::CrimpCenter1),
            'V' => Some(HoldKind::JugCenter2),
            _ => None,
        }
    }
    pub fn glyph(self) -> char {
        match self {
            HoldKind::JugCenter1 => 'U',
            HoldKind::JugRight1 => 'R',
            HoldKind::JugLeft1 => 'L',
            HoldKind::CrimpCenter1 => 'C',
            HoldKind::JugCenter2 => 'V',
        }
    }
    pub fn side(self) -> Side {
        match self {
            HoldKind::JugLeft1 => Side::Left,
            HoldKind::JugRight1 => Side::Right,
            HoldKind::JugCenter1 | HoldKind::CrimpCenter1 | HoldKind::JugCenter2 => Side::Center,
        }
    }
}

impl Display for HoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HoldKind::JugCenter1 => "JugCenter1",
            HoldKind::JugRight1 => "JugRight1",
            HoldKind::JugLeft1 => "JugLeft1",
            HoldKind::CrimpCenter1 => "CrimpCenter1",
            HoldKind::JugCenter2 => "JugCenter2",
        };
        f.write_str(name)
    }
}

/// A hold on the wall
#[derive(Debug, Clone, PartialEq)]
pub struct Hold<T: RealField> {
    /// `<kind>_<line>_<column>`
    pub name: String,
    pub kind: HoldKind,
    /// Position in world coordinates, the wall is the `y = 0` plane
    pub position: Vector3<T>,
}

impl<T: RealField> Hold<T> {
    /// True if a limb may grab this hold while the center of mass is at `com`
    pub fn is_legal(&self, com: &Vector3<T>) -> bool {
        match self.kind.side() {
            Side::Left => self.position.x >= com.x,
            Side::Right => self.position.x <= com.x,
            Side::Center => true,
        }
    }
}

/// Holds of a climbing wall
///
/// The text format has the level on the first line, and one row of glyphs
/// per following line. Empty lines and lines starting with `#` are skipped,
/// characters other than `U`, `R`, `L`, `C` and `V` are empty cells.
/// The hold at line `i`, column `j` is placed at
/// `((width - 1 - j - width / 2) * dx, 0, (height - 1 - i - height / 2) * dy)`
/// where `width` is the length of the first line and `height` is the number of lines.
///
/// # Examples
///
/// ```
/// use kinrig::route::Route;
///
/// let route = Route::<f64>::parse("3   \nL  R\n", 0.75, 1.0).unwrap();
/// assert_eq!(route.level(), 3);
/// assert_eq!(route.len(), 2);
/// let hold = route.find("JugRight1_1_3").unwrap();
/// assert_eq!(hold.position, nalgebra::Vector3::new(-1.5, 0.0, -0.5));
/// ```
#[derive(Debug, Clone)]
pub struct Route<T: RealField> {
    level: i64,
    holds: Vec<Hold<T>>,
}

impl<T: RealField> Route<T> {
    /// Default horizontal spacing of the columns
    pub const DEFAULT_DX: f64 = 0.75;
    /// Default vertical spacing of the lines
    pub const DEFAULT_DY: f64 = 1.0;

    pub fn parse(text: &str, dx: T, dy: T) -> Result<Self, Error> {
        let lines = text.split('\n').collect::<Vec<_>>();
        let first = lines.first().copied().unwrap_or_default();
        let level = first
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidRouteLevel {
                text: first.trim().to_owned(),
            })?;
        let width = first.chars().count() as f64;
        let height = lines.len() as f64;

        let mut holds = Vec::new();
        for (i, line) in lines.iter().enumerate().skip(1) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            for (j, glyph) in line.chars().enumerate() {
                if let Some(kind) = HoldKind::from_glyph(glyph) {
                    let x: T = na::convert(width - 1.0 - j as f64 - width / 2.0);
                    let z: T = na::convert(height - 1.0 - i as f64 - height / 2.0);
                    holds.push(Hold {
                        name: format!("{kind}_{i}_{j}"),
                        kind,
                        position: Vector3::new(x * dx.clone(), T::zero(), z * dy.clone()),
                    });
                }
            }
        }
        debug!("route level {level} with {} holds", holds.len());
        Ok(Route { level, holds })
    }
    pub fn from_file<P: AsRef<Path>>(path: P, dx: T, dy: T) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("loading route from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, dx, dy)
    }
    pub fn level(&self) -> i64 {
        self.level
    }
    pub fn holds(&self) -> &[Hold<T>] {
        &self.holds
    }
    pub fn len(&self) -> usize {
        self.holds.len()
    }
    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }
    pub fn find(&self, name: &str) -> Option<&Hold<T>> {
        self.holds.iter().find(|h| h.name == name)
    }
    /// The legal hold nearest to `position`, see [`Hold::is_legal`]
    ///
    /// Ties go to the hold which comes first in the route.
    pub fn closest_legal_hold(
        &self,
        position: &Vector3<T>,
        com: &Vector3<T>,
    ) -> Option<&Hold<T>> {
        let mut closest: Option<(&Hold<T>, T)> = None;
        for hold in self.holds.iter().filter(|h| h.is_legal(com)) {
            let distance = (&hold.position - position).norm_squared();
            trace!("{} squared distance = {distance}", hold.name);
            let closer = match &closest {
                Some((_, min)) => distance < *min,
                None => true,
            };
            if closer {
                closest = Some((hold, distance));
            }
        }
        closest.map(|(hold, _)| hold)
    }
}

impl<T: RealField> FromStr for Route<T> {
    type Err = Error;

    /// Parse with the default spacing
    fn from_str(text: &str) -> Result<Self, Error> {
        Self::parse(
            text,
            na::convert(Self::DEFAULT_DX),
            na::convert(Self::DEFAULT_DY),
        )
    }
}

/// Result of placing one effector on a hold
#[derive(Debug, Clone)]
pub struct Grip<T: RealField> {
    pub effector: String,
    /// Name of the chosen hold
    pub hold: String,
    /// `hold - effector` after the solve
    pub error: Vector3<T>,
    pub iterations: usize,
    pub converged: bool,
    /// Squared distance is within [`GRIP_TOLERANCE`]
    pub gripped: bool,
}

/// Result of [`hang_on_wall`]
#[derive(Debug, Clone)]
pub struct Hang<T: RealField> {
    /// Pose after all the effectors were placed
    pub pose: Pose<T>,
    /// One entry per effector which found a legal hold, in placement order
    pub grips: Vec<Grip<T>>,
}

/// Solver used to reach the holds: step 0.1, tolerance 0.05 and 10 iterations
pub fn hang_solver<T: RealField>() -> JacobianTransposeSolver<T> {
    JacobianTransposeSolverBuilder::new()
        .step(na::convert(0.1))
        .tolerance(na::convert(0.05))
        .max_iterations(10)
        .finalize()
}

/// Move each of `effectors` toward the closest legal hold of `route`
///
/// For every effector, in order, the hold is chosen from the effector's
/// position in the home pose placed at `base`, with the translation of
/// `base` as the center of mass. IK then starts from the pose left by the
/// previous effector. The pose is kept even if the solve does not converge.
/// Effectors without a legal hold are skipped.
///
/// # Examples
///
/// ```
/// use kinrig::*;
/// use kinrig::route::{hang_on_wall, hang_solver, Route, LEG_EFFECTORS};
///
/// let rig = builtin::taiwan_bear::<f64>().unwrap();
/// let route = Route::parse("1   \nLUR", 0.625, 1.2).unwrap();
/// let base = Matrix4::new_translation(&Vector3::new(0.0, -0.76, 0.0));
/// let hang = hang_on_wall(
///     &rig,
///     rig.home_pose(),
///     &route,
///     Some(&base),
///     &LEG_EFFECTORS,
///     &hang_solver(),
/// )
/// .unwrap();
/// assert_eq!(hang.grips.len(), 4);
/// assert!(hang.grips[0].gripped);
/// ```
pub fn hang_on_wall<T, S>(
    rig: &Rig<T>,
    pose: &Pose<T>,
    route: &Route<T>,
    base: Option<&Matrix4<T>>,
    effectors: &[&str],
    solver: &S,
) -> Result<Hang<T>, Error>
where
    T: RealField,
    S: InverseKinematicsSolver<T>,
{
    let mut pose = pose.clone();
    let mut grips = Vec::new();
    if route.is_empty() {
        debug!("route has no holds");
        return Ok(Hang { pose, grips });
    }
    let base = base.cloned().unwrap_or_else(Matrix4::identity);
    let com = position_of(&base);
    let home = rig.home_frames(None)?;
    for &effector in effectors {
        let rest = home.get(effector).ok_or_else(|| Error::UnknownJointName {
            joint_name: effector.to_owned(),
        })?;
        let current = position_of(&(&base * rest));
        let hold = match route.closest_legal_hold(&current, &com) {
            Some(hold) => hold,
            None => {
                warn!("no legal hold for {effector}");
                continue;
            }
        };
        debug!("{effector} reaches for {}", hold.name);
        let solution = solver.solve_partial(rig, &pose, effector, &hold.position, Some(&base))?;
        let tolerance: T = na::convert(GRIP_TOLERANCE);
        let gripped = solution.error.norm_squared() <= tolerance;
        grips.push(Grip {
            effector: effector.to_owned(),
            hold: hold.name.clone(),
            error: solution.error,
            iterations: solution.iterations,
            converged: solution.converged,
            gripped,
        });
        pose = solution.pose;
    }
    Ok(Hang { pose, grips })
}
