use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, require_positive, InvalidArgument};
use crate::geometry::Point3d;

/// Separator used when a constraint's participant IDs are persisted as one
/// string; local IDs may not contain it.
pub const LOCAL_ID_SEPARATOR: char = ',';

/// A geometric entity in a sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchSegment {
    /// Unique within the owning sketch.
    pub local_id: String,
    /// Construction (reference-only) geometry.
    pub construction: bool,
    pub geometry: SegmentGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SegmentGeometry {
    Line {
        start: Point3d,
        end: Point3d,
    },
    Circle {
        center: Point3d,
        radius: f64,
    },
    Arc {
        center: Point3d,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    },
    Point {
        position: Point3d,
    },
}

/// The tag of a [`SegmentGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Line,
    Circle,
    Arc,
    Point,
}

impl SegmentKind {
    pub fn token(&self) -> &'static str {
        match self {
            SegmentKind::Line => "Line",
            SegmentKind::Circle => "Circle",
            SegmentKind::Arc => "Arc",
            SegmentKind::Point => "Point",
        }
    }
}

fn check_local_id(local_id: &str) -> Result<(), InvalidArgument> {
    if local_id.is_empty() {
        return Err(InvalidArgument::new("segment local id must not be empty"));
    }
    if local_id.contains(LOCAL_ID_SEPARATOR) {
        return Err(InvalidArgument(format!(
            "segment local id {local_id:?} must not contain '{LOCAL_ID_SEPARATOR}'"
        )));
    }
    Ok(())
}

impl SketchSegment {
    /// Build a segment, checking the local ID and the geometry's own
    /// invariants (radius > 0, finite angles).
    pub fn new(
        local_id: impl Into<String>,
        geometry: SegmentGeometry,
    ) -> Result<Self, InvalidArgument> {
        let local_id = local_id.into();
        check_local_id(&local_id)?;
        geometry.validate()?;
        Ok(Self {
            local_id,
            construction: false,
            geometry,
        })
    }

    pub fn line(local_id: impl Into<String>, start: Point3d, end: Point3d) -> Result<Self, InvalidArgument> {
        Self::new(local_id, SegmentGeometry::Line { start, end })
    }

    pub fn circle(local_id: impl Into<String>, center: Point3d, radius: f64) -> Result<Self, InvalidArgument> {
        Self::new(local_id, SegmentGeometry::Circle { center, radius })
    }

    pub fn arc(
        local_id: impl Into<String>,
        center: Point3d,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    ) -> Result<Self, InvalidArgument> {
        Self::new(
            local_id,
            SegmentGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            },
        )
    }

    pub fn point(local_id: impl Into<String>, position: Point3d) -> Result<Self, InvalidArgument> {
        Self::new(local_id, SegmentGeometry::Point { position })
    }

    pub fn as_construction(mut self) -> Self {
        self.construction = true;
        self
    }

    pub fn kind(&self) -> SegmentKind {
        self.geometry.kind()
    }

    /// Re-check the invariants `new` enforces, for values built elsewhere
    /// (deserialized or edited in place).
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        check_local_id(&self.local_id)?;
        self.geometry.validate()
    }
}

impl SegmentGeometry {
    pub fn kind(&self) -> SegmentKind {
        match self {
            SegmentGeometry::Line { .. } => SegmentKind::Line,
            SegmentGeometry::Circle { .. } => SegmentKind::Circle,
            SegmentGeometry::Arc { .. } => SegmentKind::Arc,
            SegmentGeometry::Point { .. } => SegmentKind::Point,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match self {
            SegmentGeometry::Line { .. } | SegmentGeometry::Point { .. } => Ok(()),
            SegmentGeometry::Circle { radius, .. } => {
                require_positive("circle radius", *radius).map(|_| ())
            }
            SegmentGeometry::Arc {
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                require_positive("arc radius", *radius)?;
                require_finite("arc start angle", *start_angle)?;
                require_finite("arc end angle", *end_angle)?;
                Ok(())
            }
        }
    }
}

/// Kind of a sketch constraint. The discriminant is the persisted ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Horizontal = 0,
    Vertical = 1,
    Coincident = 2,
    Concentric = 3,
    Tangent = 4,
    Equal = 5,
    Parallel = 6,
    Perpendicular = 7,
    Dimensional = 8,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 9] = [
        ConstraintKind::Horizontal,
        ConstraintKind::Vertical,
        ConstraintKind::Coincident,
        ConstraintKind::Concentric,
        ConstraintKind::Tangent,
        ConstraintKind::Equal,
        ConstraintKind::Parallel,
        ConstraintKind::Perpendicular,
        ConstraintKind::Dimensional,
    ];

    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

/// A relation between sketch segments, named by their local IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConstraint {
    pub kind: ConstraintKind,
    /// Participant local IDs, in order.
    pub entities: Vec<String>,
    /// Driving value; present exactly when `kind` is `Dimensional`.
    pub value: Option<f64>,
}

impl SketchConstraint {
    /// A geometric (non-dimensional) constraint.
    pub fn new(kind: ConstraintKind, entities: Vec<String>) -> Result<Self, InvalidArgument> {
        if kind == ConstraintKind::Dimensional {
            return Err(InvalidArgument::new(
                "dimensional constraints need a value; use SketchConstraint::dimensional",
            ));
        }
        Ok(Self {
            kind,
            entities,
            value: None,
        })
    }

    pub fn dimensional(entities: Vec<String>, value: f64) -> Result<Self, InvalidArgument> {
        require_finite("dimension value", value)?;
        Ok(Self {
            kind: ConstraintKind::Dimensional,
            entities,
            value: Some(value),
        })
    }

    /// A value is present, and finite, exactly for `Dimensional`.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match (self.kind, self.value) {
            (ConstraintKind::Dimensional, Some(value)) => {
                require_finite("dimension value", value).map(|_| ())
            }
            (ConstraintKind::Dimensional, None) => {
                Err(InvalidArgument::new("dimensional constraint has no value"))
            }
            (kind, Some(_)) => Err(InvalidArgument(format!(
                "{kind:?} constraint must not carry a value"
            ))),
            (_, None) => Ok(()),
        }
    }
}
