//! Well-known datum identifiers.
//!
//! Every CAD system ships default planes, axes and an origin under its own
//! names. References to them are persisted with these fixed IDs instead, so a
//! model can say "the XY plane" without a concrete feature existing for it.

use crate::geometry::{Point3d, Vec3};
use crate::reference::{DatumPlaneRef, ReferenceEntity};

pub const PLANE_XY: &str = "STD_DATUM_XY";
pub const PLANE_YZ: &str = "STD_DATUM_YZ";
pub const PLANE_ZX: &str = "STD_DATUM_ZX";

pub const AXIS_X: &str = "STD_AXIS_X";
pub const AXIS_Y: &str = "STD_AXIS_Y";
pub const AXIS_Z: &str = "STD_AXIS_Z";

pub const ORIGIN: &str = "STD_POINT_ORIGIN";

/// (id, normal, x direction)
const PLANES: [(&str, Vec3, Vec3); 3] = [
    (PLANE_XY, Vec3::Z, Vec3::X),
    (PLANE_YZ, Vec3::X, Vec3::Y),
    (PLANE_ZX, Vec3::Y, Vec3::Z),
];

const AXES: [(&str, Vec3); 3] = [(AXIS_X, Vec3::X), (AXIS_Y, Vec3::Y), (AXIS_Z, Vec3::Z)];

pub fn is_standard_plane(id: &str) -> bool {
    PLANES.iter().any(|(std_id, _, _)| *std_id == id)
}

pub fn is_standard_axis(id: &str) -> bool {
    AXES.iter().any(|(std_id, _)| *std_id == id)
}

pub fn is_standard_point(id: &str) -> bool {
    id == ORIGIN
}

pub fn is_standard_id(id: &str) -> bool {
    is_standard_plane(id) || is_standard_axis(id) || is_standard_point(id)
}

/// Standard plane whose normal is parallel to `normal`, if any.
pub fn match_plane(normal: &Vec3) -> Option<&'static str> {
    PLANES
        .iter()
        .find(|(_, n, _)| n.is_parallel_to(normal))
        .map(|(id, _, _)| *id)
}

/// Standard axis parallel to `direction`, if any.
pub fn match_axis(direction: &Vec3) -> Option<&'static str> {
    AXES.iter()
        .find(|(_, d)| d.is_parallel_to(direction))
        .map(|(id, _)| *id)
}

pub fn plane_normal(id: &str) -> Option<Vec3> {
    PLANES
        .iter()
        .find(|(std_id, _, _)| *std_id == id)
        .map(|(_, n, _)| *n)
}

pub fn axis_direction(id: &str) -> Option<Vec3> {
    AXES.iter()
        .find(|(std_id, _)| *std_id == id)
        .map(|(_, d)| *d)
}

/// Fully populated datum-plane reference for one of the standard planes.
pub fn standard_plane(id: &str) -> Option<ReferenceEntity> {
    let (std_id, normal, x_dir) = PLANES.iter().find(|(std_id, _, _)| *std_id == id)?;
    Some(ReferenceEntity::DatumPlane(DatumPlaneRef::new(
        *std_id,
        Point3d::ORIGIN,
        *x_dir,
        *normal,
        None,
    )))
}
