use serde::{Deserialize, Serialize};

use cadx_types::{
    require_non_negative, require_positive, IdGenerator, InvalidArgument, Point3d, ReferenceEntity,
    ReferenceKind, SketchConstraint, SketchSegment, Vec3,
};

/// Stable position of a feature in its model's feature list.
///
/// Features are never removed or reordered once added, so a handle stays
/// valid until the model is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureHandle(pub usize);

impl FeatureHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A named, identified step in the construction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Globally unique, assigned at creation.
    id: String,
    /// User-visible name. Not unique.
    pub name: String,
    /// Identity of this feature in the originating CAD system.
    pub external_id: Option<String>,
    /// Excluded from downstream use but kept in the graph.
    pub suppressed: bool,
    pub kind: FeatureKind,
}

impl Feature {
    /// Create a feature with a fresh ID from `ids`.
    pub fn new(ids: &IdGenerator, name: impl Into<String>, kind: impl Into<FeatureKind>) -> Self {
        Self::with_id(ids.next_id(), name, kind)
    }

    /// Create a feature with an ID assigned elsewhere (persisted files,
    /// foreign systems).
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, kind: impl Into<FeatureKind>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            external_id: None,
            suppressed: false,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Empty strings are treated as "no external ID".
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        let external_id = external_id.into();
        self.external_id = (!external_id.is_empty()).then_some(external_id);
        self
    }

    pub fn suppressed(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    pub fn as_sketch(&self) -> Option<&Sketch> {
        match &self.kind {
            FeatureKind::Sketch(sketch) => Some(sketch),
            _ => None,
        }
    }

    pub fn as_extrude(&self) -> Option<&Extrude> {
        match &self.kind {
            FeatureKind::Extrude(extrude) => Some(extrude),
            _ => None,
        }
    }

    pub fn as_revolve(&self) -> Option<&Revolve> {
        match &self.kind {
            FeatureKind::Revolve(revolve) => Some(revolve),
            _ => None,
        }
    }
}

/// Feature variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureKind {
    Sketch(Sketch),
    Extrude(Extrude),
    Revolve(Revolve),
}

impl FeatureKind {
    /// Type tag used in persisted documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureKind::Sketch(_) => "Sketch",
            FeatureKind::Extrude(_) => "Extrude",
            FeatureKind::Revolve(_) => "Revolve",
        }
    }

    /// The profile sketch link of an extrude or revolve.
    pub fn profile(&self) -> Option<&ProfileLink> {
        match self {
            FeatureKind::Sketch(_) => None,
            FeatureKind::Extrude(extrude) => Some(&extrude.profile),
            FeatureKind::Revolve(revolve) => Some(&revolve.profile),
        }
    }

    pub(crate) fn profile_mut(&mut self) -> Option<&mut ProfileLink> {
        match self {
            FeatureKind::Sketch(_) => None,
            FeatureKind::Extrude(extrude) => Some(&mut extrude.profile),
            FeatureKind::Revolve(revolve) => Some(&mut revolve.profile),
        }
    }

    /// Every reference entity held by this feature, labelled with where it
    /// sits.
    pub fn references(&self) -> Vec<(&'static str, &ReferenceEntity)> {
        let mut refs = Vec::new();
        match self {
            FeatureKind::Sketch(sketch) => {
                if let Some(plane) = &sketch.reference_plane {
                    refs.push(("sketch reference plane", plane));
                }
            }
            FeatureKind::Extrude(extrude) => {
                if let Some(r) = extrude.end_condition.reference() {
                    refs.push(("end condition 1 reference", r));
                }
                if let Some(r) = extrude.end_condition2.as_ref().and_then(|ec| ec.reference()) {
                    refs.push(("end condition 2 reference", r));
                }
            }
            FeatureKind::Revolve(revolve) => {
                if let RevolveAxis::Reference(r) = &revolve.axis {
                    refs.push(("revolve axis reference", r));
                }
            }
        }
        refs
    }

    /// Check the feature's own field constraints (radii, directions, angles,
    /// draft and wall values). Cross-feature rules are the model's concern.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match self {
            FeatureKind::Sketch(sketch) => {
                for segment in &sketch.segments {
                    segment.validate()?;
                }
                for constraint in &sketch.constraints {
                    constraint.validate()?;
                }
                Ok(())
            }
            FeatureKind::Extrude(extrude) => extrude.validate(),
            FeatureKind::Revolve(revolve) => revolve.validate(),
        }
    }
}

impl From<Sketch> for FeatureKind {
    fn from(sketch: Sketch) -> Self {
        FeatureKind::Sketch(sketch)
    }
}

impl From<Extrude> for FeatureKind {
    fn from(extrude: Extrude) -> Self {
        FeatureKind::Extrude(extrude)
    }
}

impl From<Revolve> for FeatureKind {
    fn from(revolve: Revolve) -> Self {
        FeatureKind::Revolve(revolve)
    }
}

/// Link from an extrude or revolve to its profile sketch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProfileLink {
    /// Names the sketch by feature ID; not yet bound to a model entry.
    Pending { feature_id: String },
    /// Bound to the sketch's position in the owning model.
    Linked { handle: FeatureHandle },
}

impl ProfileLink {
    pub fn to(feature_id: impl Into<String>) -> Self {
        ProfileLink::Pending {
            feature_id: feature_id.into(),
        }
    }

    pub fn is_linked(&self) -> bool {
        matches!(self, ProfileLink::Linked { .. })
    }
}

// ── Sketch ───────────────────────────────────────────────────────────────

/// A planar sketch: segments plus the constraints between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    /// Plane the sketch lies on. `None` when the originating system did not
    /// record one.
    pub reference_plane: Option<ReferenceEntity>,
    pub segments: Vec<SketchSegment>,
    pub constraints: Vec<SketchConstraint>,
}

impl Sketch {
    pub fn new(reference_plane: Option<ReferenceEntity>) -> Self {
        Self {
            reference_plane,
            segments: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Append a segment. Local IDs must be unique within the sketch.
    pub fn add_segment(&mut self, segment: SketchSegment) -> Result<(), InvalidArgument> {
        if self.segment(&segment.local_id).is_some() {
            return Err(InvalidArgument(format!(
                "duplicate segment local id {:?}",
                segment.local_id
            )));
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Append a constraint. Every participant must be a segment of this
    /// sketch.
    pub fn add_constraint(&mut self, constraint: SketchConstraint) -> Result<(), InvalidArgument> {
        if let Some(missing) = constraint
            .entities
            .iter()
            .find(|id| self.segment(id).is_none())
        {
            return Err(InvalidArgument(format!(
                "constraint participant {missing:?} is not a segment of this sketch"
            )));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn with_segment(mut self, segment: SketchSegment) -> Result<Self, InvalidArgument> {
        self.add_segment(segment)?;
        Ok(self)
    }

    pub fn with_constraint(mut self, constraint: SketchConstraint) -> Result<Self, InvalidArgument> {
        self.add_constraint(constraint)?;
        Ok(self)
    }

    pub fn segment(&self, local_id: &str) -> Option<&SketchSegment> {
        self.segments.iter().find(|s| s.local_id == local_id)
    }
}

// ── Extrude ──────────────────────────────────────────────────────────────

/// How the extruded body combines with existing material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    #[default]
    Boss,
    Cut,
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DraftOption {
    /// Draft angle, >= 0.
    pub angle: f64,
    pub outward: bool,
}

impl DraftOption {
    pub fn new(angle: f64, outward: bool) -> Result<Self, InvalidArgument> {
        require_non_negative("draft angle", angle)?;
        Ok(Self { angle, outward })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinWallOption {
    /// Wall thickness, > 0.
    pub thickness: f64,
    pub one_sided: bool,
    pub covered: bool,
}

impl ThinWallOption {
    pub fn new(thickness: f64, one_sided: bool, covered: bool) -> Result<Self, InvalidArgument> {
        require_positive("thin wall thickness", thickness)?;
        Ok(Self {
            thickness,
            one_sided,
            covered,
        })
    }
}

/// The tag of an [`EndConditionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndConditionType {
    Blind,
    ThroughAll,
    UpToNext,
    UpToFace,
    UpToVertex,
    MidPlane,
    ThroughAllBothSides,
}

impl EndConditionType {
    pub const ALL: [EndConditionType; 7] = [
        EndConditionType::Blind,
        EndConditionType::ThroughAll,
        EndConditionType::UpToNext,
        EndConditionType::UpToFace,
        EndConditionType::UpToVertex,
        EndConditionType::MidPlane,
        EndConditionType::ThroughAllBothSides,
    ];
}

/// Rule that terminates an extrusion in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EndConditionKind {
    Blind {
        depth: f64,
    },
    ThroughAll,
    UpToNext,
    UpToFace {
        reference: ReferenceEntity,
        offset: f64,
        has_offset: bool,
    },
    UpToVertex {
        reference: ReferenceEntity,
        offset: f64,
        has_offset: bool,
    },
    /// Symmetric about the sketch plane; `depth` is the total depth.
    MidPlane {
        depth: f64,
    },
    ThroughAllBothSides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndCondition {
    pub kind: EndConditionKind,
    pub flip: bool,
    pub flip_material_side: bool,
}

/// Offsets smaller than this count as "no offset".
const OFFSET_EPSILON: f64 = 1e-9;

impl EndCondition {
    fn plain(kind: EndConditionKind) -> Self {
        Self {
            kind,
            flip: false,
            flip_material_side: false,
        }
    }

    pub fn blind(depth: f64) -> Result<Self, InvalidArgument> {
        require_positive("blind depth", depth)?;
        Ok(Self::plain(EndConditionKind::Blind { depth }))
    }

    pub fn through_all() -> Self {
        Self::plain(EndConditionKind::ThroughAll)
    }

    pub fn up_to_next() -> Self {
        Self::plain(EndConditionKind::UpToNext)
    }

    /// Extrude up to a face or datum plane, optionally offset from it.
    pub fn up_to_face(reference: ReferenceEntity, offset: f64) -> Result<Self, InvalidArgument> {
        Self::check_target(&reference, &[ReferenceKind::Face, ReferenceKind::DatumPlane])?;
        Ok(Self::plain(EndConditionKind::UpToFace {
            reference,
            offset,
            has_offset: offset.abs() > OFFSET_EPSILON,
        }))
    }

    /// Extrude up to a vertex or datum point, optionally offset from it.
    pub fn up_to_vertex(reference: ReferenceEntity, offset: f64) -> Result<Self, InvalidArgument> {
        Self::check_target(&reference, &[ReferenceKind::Vertex, ReferenceKind::DatumPoint])?;
        Ok(Self::plain(EndConditionKind::UpToVertex {
            reference,
            offset,
            has_offset: offset.abs() > OFFSET_EPSILON,
        }))
    }

    pub fn mid_plane(depth: f64) -> Result<Self, InvalidArgument> {
        require_positive("mid-plane depth", depth)?;
        Ok(Self::plain(EndConditionKind::MidPlane { depth }))
    }

    pub fn through_all_both_sides() -> Self {
        Self::plain(EndConditionKind::ThroughAllBothSides)
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_flip_material_side(mut self, flip_material_side: bool) -> Self {
        self.flip_material_side = flip_material_side;
        self
    }

    pub(crate) fn check_target(
        reference: &ReferenceEntity,
        allowed: &[ReferenceKind],
    ) -> Result<(), InvalidArgument> {
        if allowed.contains(&reference.kind()) {
            Ok(())
        } else {
            Err(InvalidArgument(format!(
                "end condition cannot target a {} reference (expected one of {:?})",
                reference.kind(),
                allowed
            )))
        }
    }

    pub fn condition_type(&self) -> EndConditionType {
        match self.kind {
            EndConditionKind::Blind { .. } => EndConditionType::Blind,
            EndConditionKind::ThroughAll => EndConditionType::ThroughAll,
            EndConditionKind::UpToNext => EndConditionType::UpToNext,
            EndConditionKind::UpToFace { .. } => EndConditionType::UpToFace,
            EndConditionKind::UpToVertex { .. } => EndConditionType::UpToVertex,
            EndConditionKind::MidPlane { .. } => EndConditionType::MidPlane,
            EndConditionKind::ThroughAllBothSides => EndConditionType::ThroughAllBothSides,
        }
    }

    pub fn depth(&self) -> Option<f64> {
        match self.kind {
            EndConditionKind::Blind { depth } | EndConditionKind::MidPlane { depth } => Some(depth),
            _ => None,
        }
    }

    /// `(offset, has_offset)` for the up-to conditions.
    pub fn offset(&self) -> Option<(f64, bool)> {
        match self.kind {
            EndConditionKind::UpToFace {
                offset, has_offset, ..
            }
            | EndConditionKind::UpToVertex {
                offset, has_offset, ..
            } => Some((offset, has_offset)),
            _ => None,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceEntity> {
        match &self.kind {
            EndConditionKind::UpToFace { reference, .. }
            | EndConditionKind::UpToVertex { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Re-check the local invariants (used by model validation, since the
    /// fields are public).
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match &self.kind {
            EndConditionKind::Blind { depth } => require_positive("blind depth", *depth).map(|_| ()),
            EndConditionKind::MidPlane { depth } => {
                require_positive("mid-plane depth", *depth).map(|_| ())
            }
            EndConditionKind::UpToFace { reference, .. } => {
                Self::check_target(reference, &[ReferenceKind::Face, ReferenceKind::DatumPlane])
            }
            EndConditionKind::UpToVertex { reference, .. } => {
                Self::check_target(reference, &[ReferenceKind::Vertex, ReferenceKind::DatumPoint])
            }
            EndConditionKind::ThroughAll
            | EndConditionKind::UpToNext
            | EndConditionKind::ThroughAllBothSides => Ok(()),
        }
    }
}

/// Linear extrusion of a profile sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    pub profile: ProfileLink,
    /// Unit extrusion direction.
    pub direction: Vec3,
    pub operation: BooleanOp,
    pub end_condition: EndCondition,
    pub end_condition2: Option<EndCondition>,
    pub draft: Option<DraftOption>,
    pub thin_wall: Option<ThinWallOption>,
}

impl Extrude {
    /// `direction` is normalized; a zero-length direction is rejected.
    pub fn new(
        profile: ProfileLink,
        direction: Vec3,
        operation: BooleanOp,
        end_condition: EndCondition,
    ) -> Result<Self, InvalidArgument> {
        let direction = direction.try_normalized().ok_or_else(|| {
            InvalidArgument(format!("extrude direction {direction} has zero length"))
        })?;
        Ok(Self {
            profile,
            direction,
            operation,
            end_condition,
            end_condition2: None,
            draft: None,
            thin_wall: None,
        })
    }

    pub fn with_end_condition2(mut self, end_condition: EndCondition) -> Self {
        self.end_condition2 = Some(end_condition);
        self
    }

    pub fn with_draft(mut self, draft: DraftOption) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn with_thin_wall(mut self, thin_wall: ThinWallOption) -> Self {
        self.thin_wall = Some(thin_wall);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.direction.is_degenerate() {
            return Err(InvalidArgument(format!(
                "extrude direction {} has zero length",
                self.direction
            )));
        }
        self.end_condition.validate()?;
        if let Some(ec) = &self.end_condition2 {
            ec.validate()?;
        }
        if let Some(draft) = &self.draft {
            require_non_negative("draft angle", draft.angle)?;
        }
        if let Some(thin) = &self.thin_wall {
            require_positive("thin wall thickness", thin.thickness)?;
        }
        Ok(())
    }
}

// ── Revolve ──────────────────────────────────────────────────────────────

/// Axis of revolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis")]
pub enum RevolveAxis {
    /// A line segment of the profile sketch, by local ID.
    SketchSegment { local_id: String },
    /// An explicit line; `direction` is a unit vector.
    Explicit { origin: Point3d, direction: Vec3 },
    /// An external reference (datum axis, edge, ...).
    Reference(ReferenceEntity),
}

impl RevolveAxis {
    pub fn sketch_segment(local_id: impl Into<String>) -> Result<Self, InvalidArgument> {
        let local_id = local_id.into();
        if local_id.is_empty() {
            return Err(InvalidArgument::new("revolve axis segment id must not be empty"));
        }
        Ok(RevolveAxis::SketchSegment { local_id })
    }

    pub fn explicit(origin: Point3d, direction: Vec3) -> Result<Self, InvalidArgument> {
        let direction = direction.try_normalized().ok_or_else(|| {
            InvalidArgument(format!("revolve axis direction {direction} has zero length"))
        })?;
        Ok(RevolveAxis::Explicit { origin, direction })
    }

    /// Persisted ordinal: 0 sketch segment, 1 explicit, 2 reference.
    pub fn ordinal(&self) -> i32 {
        match self {
            RevolveAxis::SketchSegment { .. } => 0,
            RevolveAxis::Explicit { .. } => 1,
            RevolveAxis::Reference(_) => 2,
        }
    }
}

/// Sweep angle specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RevolveAngle {
    Single { angle: f64 },
    TwoWay { primary: f64, secondary: f64 },
    /// Split evenly on both sides of the sketch plane.
    Symmetric { total: f64 },
}

impl RevolveAngle {
    /// Persisted ordinal: 0 single, 1 two-way, 2 symmetric.
    pub fn ordinal(&self) -> i32 {
        match self {
            RevolveAngle::Single { .. } => 0,
            RevolveAngle::TwoWay { .. } => 1,
            RevolveAngle::Symmetric { .. } => 2,
        }
    }

    pub fn primary(&self) -> f64 {
        match *self {
            RevolveAngle::Single { angle } => angle,
            RevolveAngle::TwoWay { primary, .. } => primary,
            RevolveAngle::Symmetric { total } => total,
        }
    }

    pub fn secondary(&self) -> f64 {
        match *self {
            RevolveAngle::Single { .. } => 0.0,
            RevolveAngle::TwoWay { secondary, .. } => secondary,
            RevolveAngle::Symmetric { total } => total,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match *self {
            RevolveAngle::Single { angle } => require_non_negative("revolve angle", angle).map(|_| ()),
            RevolveAngle::TwoWay { primary, secondary } => {
                require_non_negative("revolve primary angle", primary)?;
                require_non_negative("revolve secondary angle", secondary)?;
                Ok(())
            }
            RevolveAngle::Symmetric { total } => {
                require_non_negative("revolve total angle", total).map(|_| ())
            }
        }
    }
}

/// Revolution of a profile sketch about an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revolve {
    pub profile: ProfileLink,
    pub axis: RevolveAxis,
    pub angle: RevolveAngle,
}

impl Revolve {
    pub fn new(profile: ProfileLink, axis: RevolveAxis, angle: RevolveAngle) -> Result<Self, InvalidArgument> {
        let revolve = Self {
            profile,
            axis,
            angle,
        };
        revolve.validate()?;
        Ok(revolve)
    }

    pub fn validate(&self) -> Result<(), InvalidArgument> {
        self.angle.validate()?;
        match &self.axis {
            RevolveAxis::Explicit { direction, .. } if direction.is_degenerate() => Err(
                InvalidArgument(format!("revolve axis direction {direction} has zero length")),
            ),
            RevolveAxis::SketchSegment { local_id } if local_id.is_empty() => Err(
                InvalidArgument::new("revolve axis segment id must not be empty"),
            ),
            _ => Ok(()),
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────

/// Errors from building or relinking a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error("feature ID must not be empty (feature {name:?})")]
    EmptyFeatureId { name: String },

    #[error("duplicate feature ID: {id}")]
    DuplicateFeatureId { id: String },

    #[error("duplicate external ID: {external_id}")]
    DuplicateExternalId { external_id: String },

    #[error("dangling reference to {id:?} ({context})")]
    DanglingReference { id: String, context: String },

    #[error("feature {id} is not a sketch")]
    NotASketch { id: String },

    #[error("feature {referrer} names profile {id:?}, which is not in the model")]
    UnresolvedReference { id: String, referrer: String },

    #[error("feature not found: {id}")]
    FeatureNotFound { id: String },
}
