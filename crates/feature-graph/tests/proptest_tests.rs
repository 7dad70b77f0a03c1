//! Property-based tests for feature graph invariants.

use proptest::prelude::*;

use cadx_types::*;
use feature_graph::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// One step of building a model: a sketch, or an extrude of the n-th
/// sketch added so far (possibly out of range), under a chosen ID.
#[derive(Debug, Clone)]
enum Step {
    Sketch { id: String },
    Extrude { id: String, profile: usize, depth: f64 },
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
    let id = "[A-E][0-9]";
    let step = prop_oneof![
        id.prop_map(|id| Step::Sketch { id }),
        (id, 0usize..6, 0.5f64..100.0).prop_map(|(id, profile, depth)| Step::Extrude {
            id,
            profile,
            depth
        }),
    ];
    prop::collection::vec(step, 1..24)
}

fn apply(model: &mut UnifiedModel, sketches: &mut Vec<String>, step: &Step) -> Result<FeatureHandle, ModelError> {
    match step {
        Step::Sketch { id } => {
            let handle = model.add_feature(Feature::with_id(id.clone(), "Sketch", Sketch::default()))?;
            sketches.push(id.clone());
            Ok(handle)
        }
        Step::Extrude { id, profile, depth } => {
            let target = sketches.get(*profile).cloned().unwrap_or_else(|| "missing".to_string());
            let extrude = Extrude::new(
                ProfileLink::to(target),
                Vec3::Z,
                BooleanOp::Boss,
                EndCondition::blind(*depth)?,
            )?;
            model.add_feature(Feature::with_id(id.clone(), "Extrude", extrude))
        }
    }
}

// ---------------------------------------------------------------------------
// 1. The ID index always agrees with the feature list
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn index_agrees_with_list(steps in arb_steps()) {
        let mut model = UnifiedModel::new(UnitSystem::Millimeter, "prop");
        let mut sketches = Vec::new();
        let mut accepted = 0usize;

        for step in &steps {
            let before = model.len();
            match apply(&mut model, &mut sketches, step) {
                Ok(handle) => {
                    accepted += 1;
                    prop_assert_eq!(handle.index(), before);
                }
                Err(_) => prop_assert_eq!(model.len(), before),
            }
        }

        prop_assert_eq!(model.len(), accepted);
        let mut ids = std::collections::HashSet::new();
        for (i, f) in model.features().iter().enumerate() {
            prop_assert!(ids.insert(f.id()), "duplicate id {}", f.id());
            prop_assert_eq!(model.index_of(f.id()), Some(i));
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Every model built through add_feature validates cleanly
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn built_models_are_valid(steps in arb_steps()) {
        let mut model = UnifiedModel::default();
        let mut sketches = Vec::new();
        for step in &steps {
            let _ = apply(&mut model, &mut sketches, step);
        }
        let report = model.validate();
        prop_assert!(report.is_valid, "errors: {:?}", report.errors);
        for f in model.features() {
            if let Some(link) = f.kind.profile() {
                prop_assert!(link.is_linked());
                prop_assert!(model.profile_sketch(link).is_some());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Portable features relink to an equal model
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn portable_features_relink_to_equal_model(steps in arb_steps()) {
        let mut model = UnifiedModel::new(UnitSystem::Inch, "src");
        let mut sketches = Vec::new();
        for step in &steps {
            let _ = apply(&mut model, &mut sketches, step);
        }

        let mut copy = UnifiedModel::new(UnitSystem::Inch, "src");
        for f in model.portable_features() {
            copy.insert_unchecked(f);
        }
        copy.relink_profiles().unwrap();
        prop_assert_eq!(copy, model);
    }
}
