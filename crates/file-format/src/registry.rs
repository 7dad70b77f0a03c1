//! Dispatch table for reference entities.
//!
//! Each [`ReferenceKind`] has exactly one entry holding its `Type` token and
//! the functions that write and read its attributes. The encoder and the
//! decoder both go through this table, so the two directions cannot drift
//! apart for any kind.

use cadx_types::{
    DatumPlaneRef, EdgeRef, FaceRef, ReferenceEntity, ReferenceKind, SketchSegmentRef, SubTopology,
    VertexRef,
};

use crate::errors::LoadError;
use crate::vocab::{opt_vec, req_i32, req_point, req_vec, required};
use crate::xml::Element;

pub type EncodeFn = fn(&ReferenceEntity, &mut Element);
pub type DecodeFn = fn(&Element) -> Result<ReferenceEntity, LoadError>;

pub struct ReferenceCodec {
    pub kind: ReferenceKind,
    /// Value of the `Type` attribute.
    pub token: &'static str,
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

pub static REFERENCE_CODECS: [ReferenceCodec; 8] = [
    ReferenceCodec {
        kind: ReferenceKind::DatumPlane,
        token: "Plane",
        encode: encode_plane,
        decode: decode_plane,
    },
    ReferenceCodec {
        kind: ReferenceKind::DatumAxis,
        token: "Axis",
        encode: encode_target,
        decode: decode_axis,
    },
    ReferenceCodec {
        kind: ReferenceKind::DatumPoint,
        token: "Point",
        encode: encode_target,
        decode: decode_point,
    },
    ReferenceCodec {
        kind: ReferenceKind::WholeSketch,
        token: "Sketch",
        encode: encode_target,
        decode: decode_whole_sketch,
    },
    ReferenceCodec {
        kind: ReferenceKind::Face,
        token: "Face",
        encode: encode_face,
        decode: decode_face,
    },
    ReferenceCodec {
        kind: ReferenceKind::Edge,
        token: "Edge",
        encode: encode_edge,
        decode: decode_edge,
    },
    ReferenceCodec {
        kind: ReferenceKind::Vertex,
        token: "Vertex",
        encode: encode_vertex,
        decode: decode_vertex,
    },
    ReferenceCodec {
        kind: ReferenceKind::SketchSegment,
        token: "SketchSeg",
        encode: encode_sketch_segment,
        decode: decode_sketch_segment,
    },
];

/// The table entry for `kind`.
pub fn codec_for(kind: ReferenceKind) -> &'static ReferenceCodec {
    let index = match kind {
        ReferenceKind::DatumPlane => 0,
        ReferenceKind::DatumAxis => 1,
        ReferenceKind::DatumPoint => 2,
        ReferenceKind::WholeSketch => 3,
        ReferenceKind::Face => 4,
        ReferenceKind::Edge => 5,
        ReferenceKind::Vertex => 6,
        ReferenceKind::SketchSegment => 7,
    };
    &REFERENCE_CODECS[index]
}

/// Case-insensitive lookup by `Type` token.
pub fn codec_by_token(token: &str) -> Option<&'static ReferenceCodec> {
    let token = token.trim();
    REFERENCE_CODECS
        .iter()
        .find(|codec| codec.token.eq_ignore_ascii_case(token))
}

/// Write `reference` as an element called `name`, `Type` first.
pub fn encode_reference(name: &str, reference: &ReferenceEntity) -> Element {
    let codec = codec_for(reference.kind());
    let mut element = Element::new(name).with_attr("Type", codec.token);
    (codec.encode)(reference, &mut element);
    element
}

/// Read a reference element written by [`encode_reference`].
pub fn decode_reference(element: &Element) -> Result<ReferenceEntity, LoadError> {
    let token = required(element, "Type")?;
    let codec = codec_by_token(token).ok_or_else(|| {
        LoadError::malformed(format!(
            "<{}> has unknown reference type {token:?}",
            element.name
        ))
    })?;
    (codec.decode)(element)
}

// ── Feature family ───────────────────────────────────────────────────────

fn encode_target(reference: &ReferenceEntity, element: &mut Element) {
    if let Some(target) = reference.target_feature_id() {
        element.set_attr("TargetFeatureID", target);
    }
}

fn decode_axis(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::datum_axis(required(element, "TargetFeatureID")?))
}

fn decode_point(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::datum_point(required(element, "TargetFeatureID")?))
}

fn decode_whole_sketch(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::whole_sketch(required(element, "TargetFeatureID")?))
}

fn encode_plane(reference: &ReferenceEntity, element: &mut Element) {
    let ReferenceEntity::DatumPlane(plane) = reference else {
        return;
    };
    element.set_attr("TargetFeatureID", plane.target_feature_id.as_str());
    element.set_attr("Origin", plane.origin.to_string());
    element.set_attr("XDir", plane.x_dir.to_string());
    element.set_attr("YDir", plane.y_dir.to_string());
    element.set_attr("Normal", plane.normal.to_string());
}

fn decode_plane(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::DatumPlane(DatumPlaneRef::new(
        required(element, "TargetFeatureID")?,
        req_point(element, "Origin")?,
        req_vec(element, "XDir")?,
        req_vec(element, "Normal")?,
        opt_vec(element, "YDir")?,
    )))
}

// ── Sub-topology family ──────────────────────────────────────────────────

fn encode_topo(topo: &SubTopology, element: &mut Element) {
    element.set_attr("ParentFeatureID", topo.parent_feature_id.as_str());
    element.set_attr("TopologyIndex", topo.topology_index.to_string());
}

fn decode_topo(element: &Element) -> Result<SubTopology, LoadError> {
    Ok(SubTopology::new(
        required(element, "ParentFeatureID")?,
        req_i32(element, "TopologyIndex")?,
    ))
}

fn encode_face(reference: &ReferenceEntity, element: &mut Element) {
    let ReferenceEntity::Face(face) = reference else {
        return;
    };
    encode_topo(&face.topo, element);
    element.set_attr("U", face.u_dir.to_string());
    element.set_attr("V", face.v_dir.to_string());
    element.set_attr("Normal", face.normal.to_string());
    element.set_attr("Center", face.centroid.to_string());
}

fn decode_face(element: &Element) -> Result<ReferenceEntity, LoadError> {
    let face = FaceRef::new(
        decode_topo(element)?,
        req_vec(element, "Normal")?,
        req_point(element, "Center")?,
    );
    let u_dir = opt_vec(element, "U")?.unwrap_or(face.u_dir);
    let v_dir = opt_vec(element, "V")?.unwrap_or(face.v_dir);
    Ok(ReferenceEntity::Face(face.with_uv(u_dir, v_dir)))
}

fn encode_edge(reference: &ReferenceEntity, element: &mut Element) {
    let ReferenceEntity::Edge(edge) = reference else {
        return;
    };
    encode_topo(&edge.topo, element);
    element.set_attr("StartPoint", edge.start_point.to_string());
    element.set_attr("EndPoint", edge.end_point.to_string());
    element.set_attr("MidPoint", edge.mid_point.to_string());
}

fn decode_edge(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::Edge(EdgeRef {
        topo: decode_topo(element)?,
        start_point: req_point(element, "StartPoint")?,
        end_point: req_point(element, "EndPoint")?,
        mid_point: req_point(element, "MidPoint")?,
    }))
}

fn encode_vertex(reference: &ReferenceEntity, element: &mut Element) {
    let ReferenceEntity::Vertex(vertex) = reference else {
        return;
    };
    encode_topo(&vertex.topo, element);
    element.set_attr("Position", vertex.position.to_string());
}

fn decode_vertex(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::Vertex(VertexRef {
        topo: decode_topo(element)?,
        position: req_point(element, "Position")?,
    }))
}

fn encode_sketch_segment(reference: &ReferenceEntity, element: &mut Element) {
    let ReferenceEntity::SketchSegment(segment) = reference else {
        return;
    };
    encode_topo(&segment.topo, element);
    element.set_attr("SegmentLocalID", segment.segment_local_id.as_str());
}

fn decode_sketch_segment(element: &Element) -> Result<ReferenceEntity, LoadError> {
    Ok(ReferenceEntity::SketchSegment(SketchSegmentRef {
        topo: decode_topo(element)?,
        segment_local_id: required(element, "SegmentLocalID")?.to_string(),
    }))
}
