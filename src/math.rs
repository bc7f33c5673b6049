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
//! Homogeneous rotation helpers
use crate::joint::Axis;
use na::{Matrix4, RealField, Vector3};
use nalgebra as na;

/// 4x4 homogeneous rotation around the X axis
pub fn rot_x<T: RealField>(angle: T) -> Matrix4<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    #[rustfmt::skip]
    let m = Matrix4::new(
        i.clone(), o.clone(), o.clone(), o.clone(),
        o.clone(), c.clone(), -s.clone(), o.clone(),
        o.clone(), s, c, o.clone(),
        o.clone(), o.clone(), o, i,
    );
    m
}

/// 4x4 homogeneous rotation around the Y axis
pub fn rot_y<T: RealField>(angle: T) -> Matrix4<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    #[rustfmt::skip]
    let m = Matrix4::new(
        c.clone(), o.clone(), s.clone(), o.clone(),
        o.clone(), i.clone(), o.clone(), o.clone(),
        -s, o.clone(), c, o.clone(),
        o.clone(), o.clone(), o, i,
    );
    m
}

/// 4x4 homogeneous rotation around the Z axis
pub fn rot_z<T: RealField>(angle: T) -> Matrix4<T> {
    let (s, c) = angle.sin_cos();
    let (o, i) = (T::zero(), T::one());
    #[rustfmt::skip]
    let m = Matrix4::new(
        c.clone(), -s.clone(), o.clone(), o.clone(),
        s, c, o.clone(), o.clone(),
        o.clone(), o.clone(), i.clone(), o.clone(),
        o.clone(), o.clone(), o, i,
    );
    m
}

/// Rotation around `axis`
pub fn rot<T: RealField>(axis: Axis, angle: T) -> Matrix4<T> {
    match axis {
        Axis::X => rot_x(angle),
        Axis::Y => rot_y(angle),
        Axis::Z => rot_z(angle),
    }
}

/// `Rz(z) * Ry(y) * Rx(x)`
///
/// # Examples
///
/// ```
/// use kinrig::math::*;
///
/// let r = euler_zyx(0.0_f64, 0.0, 0.0);
/// assert_eq!(r, nalgebra::Matrix4::identity());
/// ```
pub fn euler_zyx<T: RealField>(z: T, y: T, x: T) -> Matrix4<T> {
    rot_z(z) * rot_y(y) * rot_x(x)
}

/// Translation part of a homogeneous transform
pub fn position_of<T: RealField>(m: &Matrix4<T>) -> Vector3<T> {
    Vector3::new(m[(0, 3)].clone(), m[(1, 3)].clone(), m[(2, 3)].clone())
}

/// Convert a row-major `[[f64; 4]; 4]` into a matrix
pub fn matrix_from_rows<T>(rows: &[[f64; 4]; 4]) -> Matrix4<T>
where
    T: RealField + simba::scalar::SupersetOf<f64>,
{
    Matrix4::from_fn(|r, c| na::convert(rows[r][c]))
}

/// Convert a matrix into row-major `[[f64; 4]; 4]`
pub fn matrix_to_rows<T>(m: &Matrix4<T>) -> [[f64; 4]; 4]
where
    T: RealField + simba::scalar::SubsetOf<f64>,
{
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = na::convert(m[(r, c)].clone());
        }
    }
    rows
}
