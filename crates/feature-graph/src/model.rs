use std::collections::HashMap;

use tracing::{debug, info, instrument};

use cadx_types::UnitSystem;

use crate::resolve;
use crate::types::{Feature, FeatureHandle, FeatureKind, ModelError, ProfileLink, Sketch};
use crate::validate::{self, ValidationReport};

/// Owner of every feature in a construction history.
///
/// Features live in one list in creation order; two indexes map feature IDs
/// and external IDs to positions in that list. Extrudes and revolves point at
/// their profile sketches through [`FeatureHandle`]s into the same list.
#[derive(Debug, Clone, Default)]
pub struct UnifiedModel {
    pub unit: UnitSystem,
    pub name: String,
    features: Vec<Feature>,
    by_id: HashMap<String, FeatureHandle>,
    by_external_id: HashMap<String, FeatureHandle>,
}

impl UnifiedModel {
    pub fn new(unit: UnitSystem, name: impl Into<String>) -> Self {
        Self {
            unit,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature(&self, handle: FeatureHandle) -> Option<&Feature> {
        self.features.get(handle.index())
    }

    /// Look up a feature by ID.
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.handle_of(id).and_then(|h| self.feature(h))
    }

    pub fn get_by_external_id(&self, external_id: &str) -> Option<&Feature> {
        self.by_external_id
            .get(external_id)
            .and_then(|h| self.feature(*h))
    }

    pub fn handle_of(&self, id: &str) -> Option<FeatureHandle> {
        self.by_id.get(id).copied()
    }

    /// Position of the feature in construction order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.handle_of(id).map(|h| h.index())
    }

    /// ID of the first feature with the given name.
    pub fn id_by_name(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id())
    }

    pub fn sketch(&self, id: &str) -> Option<&Sketch> {
        self.get(id).and_then(|f| f.as_sketch())
    }

    /// The sketch a profile link points at, if it is bound (or names a
    /// feature that exists) and that feature is a sketch.
    pub fn profile_sketch(&self, link: &ProfileLink) -> Option<&Sketch> {
        let feature = match link {
            ProfileLink::Pending { feature_id } => self.get(feature_id),
            ProfileLink::Linked { handle } => self.feature(*handle),
        };
        feature.and_then(|f| f.as_sketch())
    }

    /// The feature ID a profile link stands for.
    pub fn feature_id_of<'a>(&'a self, link: &'a ProfileLink) -> Option<&'a str> {
        match link {
            ProfileLink::Pending { feature_id } => Some(feature_id.as_str()),
            ProfileLink::Linked { handle } => self.feature(*handle).map(|f| f.id()),
        }
    }

    /// Add a feature, enforcing every cross-feature invariant.
    ///
    /// The feature's ID (and external ID, if any) must be new to the model.
    /// A pending profile link is bound to the sketch it names, which must
    /// already be present. Every reference entity must name a feature in the
    /// model or a standard datum of the matching kind.
    #[instrument(skip(self, feature), fields(id = feature.id(), kind = feature.kind.type_name()))]
    pub fn add_feature(&mut self, mut feature: Feature) -> Result<FeatureHandle, ModelError> {
        if feature.id().is_empty() {
            return Err(ModelError::EmptyFeatureId {
                name: feature.name.clone(),
            });
        }
        if self.by_id.contains_key(feature.id()) {
            return Err(ModelError::DuplicateFeatureId {
                id: feature.id().to_string(),
            });
        }
        if let Some(external_id) = &feature.external_id {
            if self.by_external_id.contains_key(external_id) {
                return Err(ModelError::DuplicateExternalId {
                    external_id: external_id.clone(),
                });
            }
        }

        match &feature.kind {
            FeatureKind::Sketch(sketch) => {
                for segment in &sketch.segments {
                    segment.geometry.validate()?;
                }
            }
            FeatureKind::Extrude(extrude) => extrude.validate()?,
            FeatureKind::Revolve(revolve) => revolve.validate()?,
        }

        for (context, reference) in feature.kind.references() {
            resolve::check_reference(self, reference, context)?;
        }

        let profile = match feature.kind.profile() {
            Some(link) => Some(resolve::resolve_profile(self, link, feature.id())?),
            None => None,
        };
        if let (Some(handle), FeatureKind::Revolve(revolve)) = (profile, &feature.kind) {
            resolve::check_revolve_axis(self, revolve, handle)?;
        }
        if let (Some(handle), Some(link)) = (profile, feature.kind.profile_mut()) {
            *link = ProfileLink::Linked { handle };
        }

        let handle = self.insert_unchecked(feature);
        debug!(index = handle.index(), "feature added");
        Ok(handle)
    }

    /// Append a feature without ID or reference checks.
    ///
    /// Used when loading documents that are inspected afterwards with
    /// [`UnifiedModel::validate`]. Only non-empty IDs not yet in an index are
    /// indexed; the feature is appended regardless.
    pub fn insert_unchecked(&mut self, feature: Feature) -> FeatureHandle {
        let handle = FeatureHandle(self.features.len());
        if !feature.id().is_empty() && !self.by_id.contains_key(feature.id()) {
            self.by_id.insert(feature.id().to_string(), handle);
        }
        if let Some(external_id) = &feature.external_id {
            if !external_id.is_empty() && !self.by_external_id.contains_key(external_id) {
                self.by_external_id.insert(external_id.clone(), handle);
            }
        }
        self.features.push(feature);
        handle
    }

    /// Bind every pending profile link to the feature it names.
    ///
    /// Forward references are fine: the whole list is in place before any
    /// link is bound. If any target is missing nothing is changed.
    #[instrument(skip(self), fields(features = self.features.len()))]
    pub fn relink_profiles(&mut self) -> Result<(), ModelError> {
        let mut bindings = Vec::new();
        for (index, feature) in self.features.iter().enumerate() {
            if let Some(ProfileLink::Pending { feature_id }) = feature.kind.profile() {
                let handle = self.handle_of(feature_id).ok_or_else(|| {
                    ModelError::UnresolvedReference {
                        id: feature_id.clone(),
                        referrer: feature.id().to_string(),
                    }
                })?;
                bindings.push((index, handle));
            }
        }

        let count = bindings.len();
        for (index, handle) in bindings {
            if let Some(link) = self.features[index].kind.profile_mut() {
                *link = ProfileLink::Linked { handle };
            }
        }
        debug!(count, "profile links bound");
        Ok(())
    }

    /// Suppressed features stay in the graph and keep their position.
    pub fn set_suppressed(&mut self, id: &str, suppressed: bool) -> Result<(), ModelError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| ModelError::FeatureNotFound { id: id.to_string() })?;
        self.features[handle.index()].suppressed = suppressed;
        Ok(())
    }

    /// Remove every feature. Unit and name are kept.
    pub fn clear(&mut self) {
        self.features.clear();
        self.by_id.clear();
        self.by_external_id.clear();
    }

    /// Copies of the features with every profile link turned back into the
    /// feature ID it names, for formats that store links by ID.
    pub fn portable_features(&self) -> Vec<Feature> {
        self.features
            .iter()
            .map(|feature| {
                let mut copy = feature.clone();
                if let Some(ProfileLink::Linked { handle }) = feature.kind.profile() {
                    let feature_id = self
                        .feature(*handle)
                        .map(|f| f.id().to_string())
                        .unwrap_or_default();
                    if let Some(link) = copy.kind.profile_mut() {
                        *link = ProfileLink::Pending { feature_id };
                    }
                }
                copy
            })
            .collect()
    }

    /// Collect every problem in the model without stopping at the first.
    #[instrument(skip(self), fields(features = self.features.len()))]
    pub fn validate(&self) -> ValidationReport {
        let report = validate::validate_model(self);
        info!(
            is_valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "model validated"
        );
        report
    }

    /// Whether `handle` is the indexed position for `id`.
    pub(crate) fn is_indexed_at(&self, id: &str, handle: FeatureHandle) -> bool {
        self.by_id.get(id) == Some(&handle)
    }

    pub(crate) fn is_external_indexed_at(&self, external_id: &str, handle: FeatureHandle) -> bool {
        self.by_external_id.get(external_id) == Some(&handle)
    }
}

impl PartialEq for UnifiedModel {
    /// Unit, name and features in order. The indexes are derived data.
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && self.name == other.name && self.features == other.features
    }
}
