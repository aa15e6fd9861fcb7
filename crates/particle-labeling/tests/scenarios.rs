//! End-to-end labeling scenarios and properties over the public API

use geo::Coord;
use particle_labeling::{
    LabelArea, LabelBox, LabelError, ParticleStore, PointFeature, PointFeatureLabeler, SpiralDirection,
    SpiralParameters, Strategy as Stage,
};
use proptest::prelude::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

/// Shrink a box so that float noise on shared borders does not count as overlap
fn shrunk(label_box: LabelBox) -> LabelBox {
    const TOLERANCE: f32 = 1e-4;
    LabelBox::new(
        label_box.left + TOLERANCE,
        label_box.right - TOLERANCE,
        label_box.top + TOLERANCE,
        label_box.bottom - TOLERANCE,
    )
}

#[test]
fn scenario_single_feature_right_above() {
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(
            vec![PointFeature::new(500.0, 500.0, 100.0, 20.0)],
            LabelArea::new(0.0, 1000.0, 0.0, 1000.0),
        )
        .unwrap();

    assert_eq!(labeler.standard_pipeline_all(), 1);

    let feature = &labeler.levels()[0][0];
    assert!(feature.is_labeled());
    assert!(feature.is_labeled_by(Stage::Corner));
    let label_box = feature.label_box().unwrap();
    assert!(close(label_box.left, 500.1));
    assert!(close(label_box.right, 600.1));
    assert!(close(label_box.bottom, 499.9));
    assert!(close(label_box.top, 479.9));
}

#[test]
fn scenario_blocked_corner_falls_through() {
    // B's corners collide with A's label or leave the shallow area
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(
            vec![
                PointFeature::with_data(500.0, 500.0, 100.0, 20.0, 'A'),
                PointFeature::with_data(510.0, 500.0, 100.0, 20.0, 'B'),
            ],
            LabelArea::new(0.0, 1000.0, 0.0, 505.0),
        )
        .unwrap();

    assert_eq!(labeler.standard_pipeline_all(), 2);

    let level = &labeler.levels()[0];
    assert!(level[0].is_labeled_by(Stage::Corner));
    assert!(level[1].is_labeled());
    assert!(!level[1].is_labeled_by(Stage::Corner));
    assert!(!shrunk(level[0].label_box().unwrap()).overlaps_interior(&level[1].label_box().unwrap()));
}

#[test]
fn scenario_zero_width_sole_feature() {
    let mut labeler = PointFeatureLabeler::new();
    let result = labeler.load_standard(
        vec![PointFeature::new(50.0, 50.0, 0.0, 10.0)],
        LabelArea::new(0.0, 100.0, 0.0, 100.0),
    );

    assert!(matches!(result, Err(LabelError::InvalidLabelDimensions { .. })));
    assert!(!labeler.is_data_loaded());
    assert_eq!(labeler.standard_pipeline_all(), 0);
    assert_eq!(labeler.standard_pipeline_adjacent_all(), 0);
    assert_eq!(labeler.label_greedy_corner(0), 0);
}

#[test]
fn scenario_spiral_radius_escapes_obstacle() {
    let area = LabelArea::new(0.0, 400.0, 0.0, 400.0);
    let mut labeler = PointFeatureLabeler::new();
    labeler.set_spiral_parameters(SpiralParameters::new(500, 50.0, 20.0, SpiralDirection::CounterClockwise));

    let setup = |labeler: &mut PointFeatureLabeler, features: Vec<PointFeature>| {
        labeler.load_standard(features, area).unwrap();
        labeler.respect_box(100.0, 100.0, 200.0, 200.0);
        // Fill the gap rows around the feature as well
        labeler.respect_points((0..10).flat_map(|i| {
            (0..10).map(move |j| Coord {
                x: 191.0 + 2.0 * i as f32,
                y: 191.0 + 2.0 * j as f32,
            })
        }));
    };

    setup(&mut labeler, vec![PointFeature::new(200.0, 200.0, 20.0, 10.0)]);
    assert_eq!(labeler.standard_pipeline_all(), 0);
    assert!(!labeler.levels()[0][0].is_labeled());

    labeler.set_spiral_parameters(SpiralParameters::new(500, 300.0, 20.0, SpiralDirection::CounterClockwise));
    let features = labeler.take_levels().remove(0);
    setup(&mut labeler, features);
    assert_eq!(labeler.standard_pipeline_all(), 1);

    let feature = &labeler.levels()[0][0];
    assert!(feature.is_labeled_by(Stage::Spiral));
    let label_box = feature.label_box().unwrap();
    assert!(area.contains(&label_box));
    assert!(!label_box.overlaps_interior(&LabelBox::new(100.0, 300.0, 100.0, 300.0)));
}

#[test]
fn adjacent_pipeline_never_uses_spiral() {
    let features = (0..50)
        .map(|i| PointFeature::new(100.0 + (i % 5) as f32, 100.0 + (i / 5) as f32, 30.0, 10.0))
        .collect();
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(features, LabelArea::new(0.0, 300.0, 0.0, 300.0))
        .unwrap();

    let adjacent = labeler.standard_pipeline_adjacent_all();
    let level = &labeler.levels()[0];
    assert_eq!(level.iter().filter(|f| f.is_labeled()).count(), adjacent);
    assert!(level.iter().all(|f| !f.is_labeled_by(Stage::Spiral)));
    assert!(adjacent < 50);

    // The spiral picks up some of the rest
    assert!(labeler.standard_pipeline_all() > 0);
}

#[test]
fn obstacle_line_keeps_labels_clear() {
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(
            vec![PointFeature::new(200.0, 200.0, 40.0, 10.0)],
            LabelArea::new(0.0, 400.0, 0.0, 400.0),
        )
        .unwrap();
    // Horizontal line just above the feature rules out every "above" position
    labeler.respect_line_default(0.0, 195.0, 400.0, 195.0);

    assert_eq!(labeler.standard_pipeline_all(), 1);
    let feature = &labeler.levels()[0][0];
    assert!(feature.is_labeled_by(Stage::Corner));
    assert!(feature.label_box().unwrap().top > 195.0);
}

#[test]
fn sampling_functions_do_not_touch_labeler() {
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(
            vec![PointFeature::new(20.0, 20.0, 10.0, 5.0)],
            LabelArea::new(0.0, 100.0, 0.0, 100.0),
        )
        .unwrap();
    let before = labeler.particles().len();

    let line = particle_labeling::sample_line_default(0.0, 0.0, 50.0, 0.0);
    let circle = particle_labeling::sample_circle(50.0, 50.0, 10.0, 5.0);
    let cells = particle_labeling::sample_box(10.0, 10.0, 20.0, 10.0, 10.0, 5.0);
    assert_eq!(line.len(), 50);
    assert!(!circle.is_empty());
    assert_eq!(cells.len(), 9);
    assert_eq!(labeler.particles().len(), before);

    // Feeding the samples back in has the same effect as the respect call
    labeler.respect_points(line.iter().copied());
    assert_eq!(labeler.particles().len(), before + 50);
}

fn arb_features(max: usize) -> impl Strategy<Value = Vec<PointFeature>> {
    prop::collection::vec(
        (
            0u16..400,
            0u16..300,
            prop::sample::select(vec![20.0f32, 30.0, 40.0]),
            prop::sample::select(vec![8.0f32, 12.0]),
        ),
        1..max,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(x, y, w, h)| PointFeature::new(x as f32, y as f32, w, h))
            .collect()
    })
}

fn run(features: Vec<PointFeature>, adjacent_only: bool) -> PointFeatureLabeler {
    let mut labeler = PointFeatureLabeler::new();
    labeler
        .load_standard(features, LabelArea::new(0.0, 400.0, 0.0, 300.0))
        .unwrap();
    if adjacent_only {
        labeler.standard_pipeline_adjacent_all();
    } else {
        labeler.standard_pipeline_all();
    }
    labeler
}

proptest! {
    #[test]
    fn prop_grid_round_trip(points in prop::collection::vec((0.0f32..=200.0, 0.0f32..=100.0), 0..300)) {
        // Tiny initial capacity forces growth
        let mut store = ParticleStore::with_capacity(200.0, 100.0, 15.0, 7.0, 2, 1);
        for (i, &(x, y)) in points.iter().enumerate() {
            prop_assert_eq!(store.add_particle(x, y), Some(i as u32));
        }

        let mut found = store.get_involved_particles(0.0, 0.0, 200.0, 100.0);
        found.sort_by_key(|p| p.id);
        prop_assert_eq!(found.len(), points.len());
        for (particle, &(x, y)) in found.iter().zip(&points) {
            prop_assert_eq!((particle.x, particle.y), (x, y));
        }
    }

    #[test]
    fn prop_reset_idempotence(points in prop::collection::vec((0.0f32..=50.0, 0.0f32..=50.0), 1..100)) {
        let mut store = ParticleStore::with_capacity(50.0, 50.0, 10.0, 10.0, 4, 1);
        for &(x, y) in &points {
            store.add_particle(x, y);
        }
        store.reset();
        prop_assert!(store.get_involved_particles(0.0, 0.0, 50.0, 50.0).is_empty());

        let mut fresh = ParticleStore::with_capacity(50.0, 50.0, 10.0, 10.0, 4, 1);
        for &(x, y) in points.iter().rev() {
            prop_assert_eq!(store.add_particle(x, y), fresh.add_particle(x, y));
        }
        prop_assert_eq!(store.particles(), fresh.particles());
    }

    #[test]
    fn prop_adjacent_labels_do_not_overlap(features in arb_features(60)) {
        let labeler = run(features, true);
        let boxes: Vec<LabelBox> = labeler.levels()[0].iter().filter_map(|f| f.label_box()).collect();
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                prop_assert!(!shrunk(*a).overlaps_interior(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn prop_spiral_labels_avoid_existing_particles(features in arb_features(40)) {
        let mut labeler = run(features, true);
        let existing = labeler.particles().to_vec();
        labeler.label_greedy_spiral(0);

        for feature in labeler.levels()[0].iter().filter(|f| f.is_labeled_by(Stage::Spiral)) {
            let label_box = feature.label_box().unwrap();
            prop_assert!(!label_box.contains_point(feature.x(), feature.y()));
            for p in &existing {
                prop_assert!(!label_box.contains_point(p.x, p.y), "{:?} contains {:?}", label_box, p);
            }
        }
    }

    #[test]
    fn prop_deterministic(features in arb_features(40)) {
        let first = run(features.clone(), false);
        let second = run(features, false);
        prop_assert_eq!(first.levels(), second.levels());
        prop_assert_eq!(first.particles(), second.particles());
    }
}
