//! Xform (transform) samples.
//!
//! An xform sample is an ordered list of operations that compose into a
//! local 4x4 matrix, plus the flag saying whether the parent transform is
//! inherited.

use serde::{Deserialize, Serialize};

use crate::util::{matrix_from_row_major, DMat4, DVec3};

/// Xform schema identifier.
pub const XFORM_SCHEMA: &str = "AbcGeom_Xform_v3";

/// Transform operation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XformOpType {
    Scale,
    Translate,
    RotateX,
    RotateY,
    RotateZ,
    Rotate,    // axis + angle
    Matrix,
}

impl XformOpType {
    /// Number of values the operation consumes.
    pub fn num_values(&self) -> usize {
        match self {
            Self::Scale | Self::Translate => 3,
            Self::RotateX | Self::RotateY | Self::RotateZ => 1,
            Self::Rotate => 4,
            Self::Matrix => 16,
        }
    }
}

/// A single transform operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XformOp {
    pub op_type: XformOpType,
    pub values: Vec<f64>,
}

impl XformOp {
    /// Create a scale operation.
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self { op_type: XformOpType::Scale, values: vec![x, y, z] }
    }

    /// Create a translate operation.
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self { op_type: XformOpType::Translate, values: vec![x, y, z] }
    }

    /// Create a rotation around Z axis (angle in degrees).
    pub fn rotate_z(angle: f64) -> Self {
        Self { op_type: XformOpType::RotateZ, values: vec![angle] }
    }

    /// Check the value count matches the operation.
    pub fn is_well_formed(&self) -> bool {
        self.values.len() >= self.op_type.num_values()
    }

    /// The operation as a matrix; malformed operations yield identity.
    pub fn to_matrix(&self) -> DMat4 {
        if !self.is_well_formed() {
            return DMat4::IDENTITY;
        }
        let v = &self.values;
        match self.op_type {
            XformOpType::Scale => DMat4::from_scale(DVec3::new(v[0], v[1], v[2])),
            XformOpType::Translate => DMat4::from_translation(DVec3::new(v[0], v[1], v[2])),
            XformOpType::RotateX => DMat4::from_rotation_x(v[0].to_radians()),
            XformOpType::RotateY => DMat4::from_rotation_y(v[0].to_radians()),
            XformOpType::RotateZ => DMat4::from_rotation_z(v[0].to_radians()),
            XformOpType::Rotate => {
                let axis = DVec3::new(v[0], v[1], v[2]).normalize_or_zero();
                if axis.length_squared() > 0.0001 {
                    DMat4::from_axis_angle(axis, v[3].to_radians())
                } else {
                    DMat4::IDENTITY
                }
            }
            XformOpType::Matrix => {
                let mut m = [0.0; 16];
                m.copy_from_slice(&v[..16]);
                matrix_from_row_major(&m)
            }
        }
    }
}

/// Transform sample with operations and inheritance flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XformSample {
    /// Transform operations in order.
    pub ops: Vec<XformOp>,
    /// Whether this xform inherits from parent.
    pub inherits: bool,
}

impl Default for XformSample {
    fn default() -> Self {
        Self { ops: Vec::new(), inherits: true }
    }
}

impl XformSample {
    /// Create identity xform.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Compute the local 4x4 transformation matrix.
    pub fn matrix(&self) -> DMat4 {
        // Archive ops apply first-listed outermost: with row vectors
        // ret = op * ret, which for column vectors is result * op.
        self.ops
            .iter()
            .fold(DMat4::IDENTITY, |acc, op| acc * op.to_matrix())
    }
}
