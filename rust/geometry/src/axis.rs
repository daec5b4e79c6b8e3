// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate system normalization
//!
//! Source scenes describe their convention as an up axis and a forward axis,
//! each with a sign. The target convention is Z up, X forward (both
//! positive). Two paths remap data into it:
//!
//! - positions go through an axis permutation keyed by (up, forward),
//!   followed by a half-turn about Z when forward is negative and a per-axis
//!   sign multiply (`x *= forward_sign`, `z *= up_sign`);
//! - normals are rotated by the quaternion of [`resolve_rotation`].
//!
//! [`transform_normal`] offers the inverse-transpose permutation path for
//! normals. The two vertex/normal paths are not exact duals for every axis
//! combination.

use crate::scene::{metadata_keys, Metadata};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Which source axis a convention refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Unknown,
    X,
    Y,
    Z,
}

impl Orientation {
    /// All orientations, in code order
    pub const ALL: [Orientation; 4] = [
        Orientation::Unknown,
        Orientation::X,
        Orientation::Y,
        Orientation::Z,
    ];

    /// Decode a metadata code: 1 = X, 2 = Y, 3 = Z, anything else unknown
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Orientation::X,
            2 => Orientation::Y,
            3 => Orientation::Z,
            _ => Orientation::Unknown,
        }
    }
}

/// Direction of increasing coordinates along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    #[default]
    Unknown,
    Positive,
    Negative,
}

impl Sign {
    pub const ALL: [Sign; 3] = [Sign::Unknown, Sign::Positive, Sign::Negative];

    /// Decode a metadata code: 1 = positive, -1 = negative, anything else unknown
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Sign::Positive,
            -1 => Sign::Negative,
            _ => Sign::Unknown,
        }
    }

    /// Multiplier applied to a component; unknown behaves as positive
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Sign::Negative => -1.0,
            Sign::Positive | Sign::Unknown => 1.0,
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }
}

/// Up/forward axis convention of a source scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisConvention {
    pub up: Orientation,
    pub up_sign: Sign,
    pub forward: Orientation,
    pub forward_sign: Sign,
}

impl AxisConvention {
    /// The convention every mesh is normalized into
    pub const TARGET: AxisConvention = AxisConvention {
        up: Orientation::Z,
        up_sign: Sign::Positive,
        forward: Orientation::X,
        forward_sign: Sign::Positive,
    };

    pub fn new(up: Orientation, up_sign: Sign, forward: Orientation, forward_sign: Sign) -> Self {
        Self {
            up,
            up_sign,
            forward,
            forward_sign,
        }
    }

    /// Whether [`transform_vector`] leaves every position unchanged
    pub fn preserves_positions(&self) -> bool {
        let identity_permutation = matches!(
            (self.up, self.forward),
            (Orientation::Z, Orientation::X) | (Orientation::Z, Orientation::Z) | (Orientation::Unknown, _)
        );
        identity_permutation && !self.up_sign.is_negative() && !self.forward_sign.is_negative()
    }

    /// Read the convention from scene metadata; missing keys are unknown
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let orientation = |key| {
            metadata
                .get_int(key)
                .map(Orientation::from_code)
                .unwrap_or_default()
        };
        let sign = |key| metadata.get_int(key).map(Sign::from_code).unwrap_or_default();

        Self {
            up: orientation(metadata_keys::UP_AXIS),
            up_sign: sign(metadata_keys::UP_AXIS_SIGN),
            forward: orientation(metadata_keys::FRONT_AXIS),
            forward_sign: sign(metadata_keys::FRONT_AXIS_SIGN),
        }
    }
}

/// Euler rotation in degrees: pitch about Y, yaw about Z, roll about X
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    const fn pitch(degrees: f64) -> Self {
        Self::new(degrees, 0.0, 0.0)
    }

    const fn yaw(degrees: f64) -> Self {
        Self::new(0.0, degrees, 0.0)
    }

    const fn roll(degrees: f64) -> Self {
        Self::new(0.0, 0.0, degrees)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0 && self.roll == 0.0
    }

    /// Quaternion form, composed as yaw * pitch * roll
    ///
    /// Positive pitch turns +X toward +Z, positive yaw turns +X toward +Y and
    /// positive roll turns +Y toward -Z, so pitch and roll run opposite to the
    /// right-handed angles `from_euler_angles` expects.
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(
            -self.roll.to_radians(),
            -self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }

    /// Rotate a vector by this rotation
    #[inline]
    pub fn rotate_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        if self.is_zero() {
            return *v;
        }
        self.to_quaternion() * v
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw, self.roll + rhs.roll)
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.pitch - rhs.pitch, self.yaw - rhs.yaw, self.roll - rhs.roll)
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Rotation) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rotation {
    fn sub_assign(&mut self, rhs: Rotation) {
        *self = *self - rhs;
    }
}

/// Base rotation for an up axis; an unknown up sign counts as positive
pub fn up_rotation(up: Orientation, up_sign: Sign) -> Rotation {
    let negative = up_sign.is_negative();
    match up {
        Orientation::Unknown => Rotation::ZERO,
        Orientation::X if negative => Rotation::pitch(-90.0),
        Orientation::X => Rotation::pitch(90.0),
        Orientation::Y if negative => Rotation::roll(90.0),
        Orientation::Y => Rotation::roll(-90.0),
        Orientation::Z if negative => Rotation::pitch(180.0),
        Orientation::Z => Rotation::ZERO,
    }
}

/// Correction contributed by the forward axis, before its sign is applied
fn forward_adjustment(convention: &AxisConvention) -> Rotation {
    // Up == forward cannot describe a frame; keep the up rotation alone
    if convention.forward == convention.up {
        return Rotation::ZERO;
    }

    let up_negative = convention.up_sign.is_negative();
    match convention.forward {
        Orientation::X => match convention.up {
            Orientation::Y if up_negative => Rotation::yaw(-90.0),
            Orientation::Y => Rotation::yaw(90.0),
            Orientation::Z if up_negative => Rotation::roll(90.0),
            Orientation::Z if convention.forward_sign.is_negative() => Rotation::roll(-90.0),
            // Z up / X+ forward is already the target frame
            Orientation::Z | Orientation::X => Rotation::ZERO,
            Orientation::Unknown if convention.forward_sign.is_negative() => Rotation::roll(90.0),
            Orientation::Unknown => Rotation::roll(-90.0),
        },
        Orientation::Y => Rotation::roll(-90.0),
        Orientation::Z | Orientation::Unknown => Rotation::ZERO,
    }
}

/// Rotation that takes a source convention into the target convention
///
/// The up axis selects a base rotation; a known forward axis then adds its
/// correction when the forward sign is negative and subtracts it otherwise.
pub fn resolve_rotation(convention: &AxisConvention) -> Rotation {
    let mut rotation = up_rotation(convention.up, convention.up_sign);
    if convention.forward == Orientation::Unknown {
        return rotation;
    }

    let adjustment = forward_adjustment(convention);
    if convention.forward_sign.is_negative() {
        rotation += adjustment;
    } else {
        rotation -= adjustment;
    }
    rotation
}

/// Swap components so the source up/forward axes land on target Z/X
pub fn permute_axes(v: &Vector3<f64>, up: Orientation, forward: Orientation) -> Vector3<f64> {
    use Orientation::*;

    let (x, y, z) = (v.x, v.y, v.z);
    match (up, forward) {
        (X, Y) => Vector3::new(y, z, x),
        (X, _) => Vector3::new(z, y, x),
        (Y, Z) => Vector3::new(z, x, y),
        (Y, _) => Vector3::new(x, z, y),
        (Z, X) | (Z, Z) => Vector3::new(x, y, z),
        (Z, _) => Vector3::new(y, x, z),
        (Unknown, _) => *v,
    }
}

/// Exact half turn about Z
#[inline]
fn half_turn_yaw(v: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.x, -v.y, v.z)
}

#[inline]
fn apply_signs(mut v: Vector3<f64>, convention: &AxisConvention) -> Vector3<f64> {
    if convention.forward_sign.is_negative() {
        v = half_turn_yaw(v);
    }
    v.x *= convention.forward_sign.factor();
    v.z *= convention.up_sign.factor();
    v
}

/// Remap a position into the target convention
pub fn transform_vector(v: &Vector3<f64>, convention: &AxisConvention) -> Vector3<f64> {
    let permuted = permute_axes(v, convention.up, convention.forward);
    apply_signs(permuted, convention)
}

/// Row basis of the linear map used on the normal path
fn normal_basis(up: Orientation, forward: Orientation) -> Matrix3<f64> {
    use Orientation::*;

    match (up, forward) {
        (X, Z) => Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0,
        ),
        (Y, X) => Matrix3::new(
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0,
        ),
        (Y, Z) => Matrix3::new(
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0,
        ),
        (Z, X) => Matrix3::new(
            0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ),
        (Z, Y) => Matrix3::new(
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0,
        ),
        _ => Matrix3::identity(),
    }
}

/// Normalize, returning zero for vectors too short to have a direction
#[inline]
pub fn safe_normalize(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(1e-8).unwrap_or_else(Vector3::zeros)
}

/// Remap a normal through the inverse-transpose of the axis basis
///
/// The vector is treated as a row vector (`n * M`), then the same half turn
/// and sign multiply as [`transform_vector`] are applied. The result is unit
/// length, or zero for a degenerate input.
pub fn transform_normal(normal: &Vector3<f64>, convention: &AxisConvention) -> Vector3<f64> {
    let basis = normal_basis(convention.up, convention.forward);
    let normal_matrix = basis
        .try_inverse()
        .unwrap_or_else(Matrix3::identity)
        .transpose();

    let transformed = normal_matrix.tr_mul(normal);
    safe_normalize(apply_signs(transformed, convention))
}

/// Rotate a normal by the resolved rotation, optionally flip it, and normalize
pub fn rotate_normal(normal: &Vector3<f64>, rotation: &Rotation, invert: bool) -> Vector3<f64> {
    let mut n = rotation.rotate_vector(normal);
    if invert {
        n = -n;
    }
    safe_normalize(n)
}
