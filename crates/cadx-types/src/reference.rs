use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Point3d, Vec3};
use crate::standard;

/// Topology index value meaning "not assigned by the originating system".
pub const UNSET_TOPOLOGY_INDEX: i32 = -1;

/// Which of the two reference families a kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceFamily {
    /// Points at a whole feature through `target_feature_id`.
    Feature,
    /// Points at a sub-element of a feature through `parent_feature_id` and
    /// `topology_index`.
    SubTopology,
}

/// The tag of a [`ReferenceEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    DatumPlane,
    DatumAxis,
    DatumPoint,
    WholeSketch,
    Face,
    Edge,
    Vertex,
    SketchSegment,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 8] = [
        ReferenceKind::DatumPlane,
        ReferenceKind::DatumAxis,
        ReferenceKind::DatumPoint,
        ReferenceKind::WholeSketch,
        ReferenceKind::Face,
        ReferenceKind::Edge,
        ReferenceKind::Vertex,
        ReferenceKind::SketchSegment,
    ];

    pub fn family(&self) -> ReferenceFamily {
        match self {
            ReferenceKind::DatumPlane
            | ReferenceKind::DatumAxis
            | ReferenceKind::DatumPoint
            | ReferenceKind::WholeSketch => ReferenceFamily::Feature,
            ReferenceKind::Face
            | ReferenceKind::Edge
            | ReferenceKind::Vertex
            | ReferenceKind::SketchSegment => ReferenceFamily::SubTopology,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identity shared by all sub-topology references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTopology {
    pub parent_feature_id: String,
    /// Position within the parent's topology enumeration, as numbered by the
    /// originating system. [`UNSET_TOPOLOGY_INDEX`] when unknown.
    pub topology_index: i32,
}

impl SubTopology {
    pub fn new(parent_feature_id: impl Into<String>, topology_index: i32) -> Self {
        Self {
            parent_feature_id: parent_feature_id.into(),
            topology_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatumPlaneRef {
    pub target_feature_id: String,
    pub origin: Point3d,
    pub x_dir: Vec3,
    pub y_dir: Vec3,
    pub normal: Vec3,
}

impl DatumPlaneRef {
    /// When `y_dir` is `None` it is derived as `normalize(normal × x_dir)`.
    pub fn new(
        target_feature_id: impl Into<String>,
        origin: Point3d,
        x_dir: Vec3,
        normal: Vec3,
        y_dir: Option<Vec3>,
    ) -> Self {
        let y_dir = y_dir.unwrap_or_else(|| derive_plane_y(&normal, &x_dir));
        Self {
            target_feature_id: target_feature_id.into(),
            origin,
            x_dir,
            y_dir,
            normal,
        }
    }
}

pub fn derive_plane_y(normal: &Vec3, x_dir: &Vec3) -> Vec3 {
    normal.cross(x_dir).normalized()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRef {
    pub topo: SubTopology,
    pub normal: Vec3,
    pub centroid: Point3d,
    pub u_dir: Vec3,
    pub v_dir: Vec3,
}

impl FaceRef {
    /// Face fingerprint with the default +X/+Y parameter directions.
    pub fn new(topo: SubTopology, normal: Vec3, centroid: Point3d) -> Self {
        Self {
            topo,
            normal,
            centroid,
            u_dir: Vec3::X,
            v_dir: Vec3::Y,
        }
    }

    pub fn with_uv(mut self, u_dir: Vec3, v_dir: Vec3) -> Self {
        self.u_dir = u_dir;
        self.v_dir = v_dir;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    pub topo: SubTopology,
    pub start_point: Point3d,
    pub end_point: Point3d,
    pub mid_point: Point3d,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRef {
    pub topo: SubTopology,
    pub position: Point3d,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchSegmentRef {
    pub topo: SubTopology,
    pub segment_local_id: String,
}

/// Exchange-neutral pointer to a feature or to a piece of a feature's
/// topology.
///
/// A reference never resolves to live geometry. Geometric fields are
/// fingerprints recorded by the originating system so a foreign system can
/// re-locate the target, and are returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReferenceEntity {
    DatumPlane(DatumPlaneRef),
    DatumAxis { target_feature_id: String },
    DatumPoint { target_feature_id: String },
    WholeSketch { target_feature_id: String },
    Face(FaceRef),
    Edge(EdgeRef),
    Vertex(VertexRef),
    SketchSegment(SketchSegmentRef),
}

impl ReferenceEntity {
    pub fn datum_axis(target_feature_id: impl Into<String>) -> Self {
        ReferenceEntity::DatumAxis {
            target_feature_id: target_feature_id.into(),
        }
    }

    pub fn datum_point(target_feature_id: impl Into<String>) -> Self {
        ReferenceEntity::DatumPoint {
            target_feature_id: target_feature_id.into(),
        }
    }

    pub fn whole_sketch(target_feature_id: impl Into<String>) -> Self {
        ReferenceEntity::WholeSketch {
            target_feature_id: target_feature_id.into(),
        }
    }

    pub fn face(topo: SubTopology, normal: Vec3, centroid: Point3d) -> Self {
        ReferenceEntity::Face(FaceRef::new(topo, normal, centroid))
    }

    pub fn edge(topo: SubTopology, start_point: Point3d, end_point: Point3d, mid_point: Point3d) -> Self {
        ReferenceEntity::Edge(EdgeRef {
            topo,
            start_point,
            end_point,
            mid_point,
        })
    }

    pub fn vertex(topo: SubTopology, position: Point3d) -> Self {
        ReferenceEntity::Vertex(VertexRef { topo, position })
    }

    pub fn sketch_segment(topo: SubTopology, segment_local_id: impl Into<String>) -> Self {
        ReferenceEntity::SketchSegment(SketchSegmentRef {
            topo,
            segment_local_id: segment_local_id.into(),
        })
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceEntity::DatumPlane(_) => ReferenceKind::DatumPlane,
            ReferenceEntity::DatumAxis { .. } => ReferenceKind::DatumAxis,
            ReferenceEntity::DatumPoint { .. } => ReferenceKind::DatumPoint,
            ReferenceEntity::WholeSketch { .. } => ReferenceKind::WholeSketch,
            ReferenceEntity::Face(_) => ReferenceKind::Face,
            ReferenceEntity::Edge(_) => ReferenceKind::Edge,
            ReferenceEntity::Vertex(_) => ReferenceKind::Vertex,
            ReferenceEntity::SketchSegment(_) => ReferenceKind::SketchSegment,
        }
    }

    pub fn family(&self) -> ReferenceFamily {
        self.kind().family()
    }

    pub fn target_feature_id(&self) -> Option<&str> {
        match self {
            ReferenceEntity::DatumPlane(plane) => Some(&plane.target_feature_id),
            ReferenceEntity::DatumAxis { target_feature_id }
            | ReferenceEntity::DatumPoint { target_feature_id }
            | ReferenceEntity::WholeSketch { target_feature_id } => Some(target_feature_id),
            _ => None,
        }
    }

    pub fn sub_topology(&self) -> Option<&SubTopology> {
        match self {
            ReferenceEntity::Face(face) => Some(&face.topo),
            ReferenceEntity::Edge(edge) => Some(&edge.topo),
            ReferenceEntity::Vertex(vertex) => Some(&vertex.topo),
            ReferenceEntity::SketchSegment(seg) => Some(&seg.topo),
            _ => None,
        }
    }

    pub fn parent_feature_id(&self) -> Option<&str> {
        self.sub_topology().map(|t| t.parent_feature_id.as_str())
    }

    pub fn topology_index(&self) -> Option<i32> {
        self.sub_topology().map(|t| t.topology_index)
    }

    /// The feature this reference depends on, whichever family it is.
    pub fn referenced_feature_id(&self) -> &str {
        match (self.target_feature_id(), self.parent_feature_id()) {
            (Some(id), _) | (None, Some(id)) => id,
            (None, None) => "",
        }
    }

    /// True when the target is the standard datum constant matching this kind
    /// (a standard plane for DatumPlane, axis for DatumAxis, origin for
    /// DatumPoint).
    pub fn is_standard(&self) -> bool {
        match self {
            ReferenceEntity::DatumPlane(plane) => standard::is_standard_plane(&plane.target_feature_id),
            ReferenceEntity::DatumAxis { target_feature_id } => {
                standard::is_standard_axis(target_feature_id)
            }
            ReferenceEntity::DatumPoint { target_feature_id } => {
                standard::is_standard_point(target_feature_id)
            }
            _ => false,
        }
    }

    pub fn origin(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::DatumPlane(plane) => Some(plane.origin),
            _ => None,
        }
    }

    pub fn x_dir(&self) -> Option<Vec3> {
        match self {
            ReferenceEntity::DatumPlane(plane) => Some(plane.x_dir),
            _ => None,
        }
    }

    pub fn y_dir(&self) -> Option<Vec3> {
        match self {
            ReferenceEntity::DatumPlane(plane) => Some(plane.y_dir),
            _ => None,
        }
    }

    /// Plane normal for datum planes, surface normal for faces.
    pub fn normal(&self) -> Option<Vec3> {
        match self {
            ReferenceEntity::DatumPlane(plane) => Some(plane.normal),
            ReferenceEntity::Face(face) => Some(face.normal),
            _ => None,
        }
    }

    pub fn centroid(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::Face(face) => Some(face.centroid),
            _ => None,
        }
    }

    pub fn u_dir(&self) -> Option<Vec3> {
        match self {
            ReferenceEntity::Face(face) => Some(face.u_dir),
            _ => None,
        }
    }

    pub fn v_dir(&self) -> Option<Vec3> {
        match self {
            ReferenceEntity::Face(face) => Some(face.v_dir),
            _ => None,
        }
    }

    pub fn start_point(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::Edge(edge) => Some(edge.start_point),
            _ => None,
        }
    }

    pub fn end_point(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::Edge(edge) => Some(edge.end_point),
            _ => None,
        }
    }

    pub fn mid_point(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::Edge(edge) => Some(edge.mid_point),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Point3d> {
        match self {
            ReferenceEntity::Vertex(vertex) => Some(vertex.position),
            _ => None,
        }
    }

    pub fn segment_local_id(&self) -> Option<&str> {
        match self {
            ReferenceEntity::SketchSegment(seg) => Some(&seg.segment_local_id),
            _ => None,
        }
    }
}
