use cadx_types::{ReferenceEntity, ReferenceKind};

use crate::model::UnifiedModel;
use crate::types::{FeatureHandle, ModelError, ProfileLink, Revolve, RevolveAxis};

/// Check that `reference` names something that exists in `model`.
///
/// Standard datums pass without a feature behind them. Otherwise the
/// referenced feature must be present; sketch references must point at a
/// sketch, and sketch-segment references at one of its segments.
pub fn check_reference(
    model: &UnifiedModel,
    reference: &ReferenceEntity,
    context: &str,
) -> Result<(), ModelError> {
    if reference.is_standard() {
        return Ok(());
    }

    let id = reference.referenced_feature_id();
    let target = model.get(id).ok_or_else(|| ModelError::DanglingReference {
        id: id.to_string(),
        context: context.to_string(),
    })?;

    match reference.kind() {
        ReferenceKind::WholeSketch => {
            target.as_sketch().ok_or_else(|| ModelError::NotASketch { id: id.to_string() })?;
        }
        ReferenceKind::SketchSegment => {
            let sketch = target
                .as_sketch()
                .ok_or_else(|| ModelError::NotASketch { id: id.to_string() })?;
            let local_id = reference.segment_local_id().unwrap_or_default();
            if sketch.segment(local_id).is_none() {
                return Err(ModelError::DanglingReference {
                    id: local_id.to_string(),
                    context: format!("{context}: segment of sketch {id}"),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

/// Bind a profile link to the sketch it names.
pub fn resolve_profile(
    model: &UnifiedModel,
    link: &ProfileLink,
    referrer: &str,
) -> Result<FeatureHandle, ModelError> {
    let handle = match link {
        ProfileLink::Pending { feature_id } => {
            model
                .handle_of(feature_id)
                .ok_or_else(|| ModelError::DanglingReference {
                    id: feature_id.clone(),
                    context: format!("profile sketch of {referrer}"),
                })?
        }
        ProfileLink::Linked { handle } => {
            if model.feature(*handle).is_none() {
                return Err(ModelError::DanglingReference {
                    id: format!("#{}", handle.index()),
                    context: format!("profile sketch of {referrer}"),
                });
            }
            *handle
        }
    };

    let target = model
        .feature(handle)
        .ok_or_else(|| ModelError::FeatureNotFound {
            id: format!("#{}", handle.index()),
        })?;
    if target.as_sketch().is_none() {
        return Err(ModelError::NotASketch {
            id: target.id().to_string(),
        });
    }
    Ok(handle)
}

/// A sketch-segment axis must name a segment of the revolve's profile.
pub fn check_revolve_axis(
    model: &UnifiedModel,
    revolve: &Revolve,
    profile: FeatureHandle,
) -> Result<(), ModelError> {
    let RevolveAxis::SketchSegment { local_id } = &revolve.axis else {
        return Ok(());
    };
    let profile_feature = model
        .feature(profile)
        .ok_or_else(|| ModelError::FeatureNotFound {
            id: format!("#{}", profile.index()),
        })?;
    let sketch = profile_feature
        .as_sketch()
        .ok_or_else(|| ModelError::NotASketch {
            id: profile_feature.id().to_string(),
        })?;
    if sketch.segment(local_id).is_none() {
        return Err(ModelError::DanglingReference {
            id: local_id.clone(),
            context: format!("revolve axis segment of sketch {}", profile_feature.id()),
        });
    }
    Ok(())
}
