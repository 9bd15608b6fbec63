use kurbo::Point;
use turnkit::*;

fn polyline(points: &[(f64, f64)]) -> FeatureChain {
    let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    FeatureChain::from_points(&pts)
}

fn end_of(doc: &Document, label: ChainLabel) -> Point {
    let id = doc.find_label(label).unwrap_or_else(|| panic!("{label} missing"));
    doc.chain(id)
        .and_then(|c| c.extremity(Extremity::End))
        .unwrap_or_else(|| panic!("{label} empty"))
}

#[test]
fn test_flat_profile_produces_one_closed_pass_per_level() {
    // Flat section at the spindle axis, reaching past the stock boundary
    // at x = 0
    let mut host = FixtureHost::single(polyline(&[(12.0, 0.0), (2.0, 0.0), (-2.0, 0.0)]));
    let mut doc = Document::new();
    let config = TurningConfig {
        bar_diameter: 20.0,
        turning_depth: 1.0,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    let state = rebuild_turning_profiles(&mut doc, &mut host, &AnalyticKernel, &config)
        .expect("pipeline should succeed on a flat profile");

    // Stock radius 10 over a profile at Y 0 gives ten passes of depth 1
    assert_eq!(state.turning_times, 10, "pass count from span/depth");
    assert_eq!(state.lower_y, 0.0);
    assert!(
        state.first_feature_need,
        "a profile without grooves needs the outermost-profile patch"
    );

    // Base plus levels 1..=9, every one closing exactly at the stock radius
    assert!((end_of(&doc, ChainLabel::Base).y - 10.0).abs() < 1e-9);
    for level in 1..10u8 {
        let end = end_of(&doc, ChainLabel::Raw { level });
        assert!(
            (end.y - 10.0).abs() < 1e-9,
            "level {level} should close at the stock radius, got {end:?}"
        );
    }
    assert!(doc.find_label(ChainLabel::Raw { level: 10 }).is_none());
}

#[test]
fn test_boss_profile_splits_into_groove_and_front_pieces() {
    // Raised boss between x = 7 and x = 9, tall enough that every
    // translated level crosses the stock radius
    let mut host = FixtureHost::single(polyline(&[
        (20.0, 1.0),
        (10.0, 1.0),
        (9.0, 6.0),
        (7.0, 6.0),
        (6.0, 1.0),
        (2.0, 1.0),
        (-1.0, 1.0),
    ]));
    let mut doc = Document::new();
    let config = TurningConfig {
        bar_diameter: 8.0,
        turning_depth: 1.0,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    let state = rebuild_turning_profiles(&mut doc, &mut host, &AnalyticKernel, &config)
        .expect("pipeline should succeed on a boss profile");

    // Stock radius 4 over a floor at Y 1 gives three passes; both
    // intermediate levels split into groove and front pieces
    assert_eq!(state.turning_times, 3);
    assert_eq!(state.gr_feature, 2, "both levels produced grooves");
    assert!(
        state.first_feature_need,
        "no plain per-level profile existed, so the patch was needed"
    );
    assert_eq!(state.min_front, Some(2), "deepest front piece survives");

    // Groove pieces got renumbered into the plain sequence
    assert!(doc.find_label(ChainLabel::Raw { level: 1 }).is_some());
    assert!(doc.find_label(ChainLabel::Raw { level: 2 }).is_some());
    for level in 1..=12u8 {
        assert!(
            doc.find_label(ChainLabel::Groove { level }).is_none(),
            "groove {level} should have been renamed"
        );
    }

    // The surviving front piece was renamed to level 1 and kept its
    // geometry on the turning layer
    let front = doc
        .find_label(ChainLabel::Front { level: 1 })
        .expect("surviving front piece");
    assert_eq!(doc.get(front).unwrap().layer, TURNING_LAYER);

    // Both renumbered profiles close at the stock radius
    assert!((end_of(&doc, ChainLabel::Raw { level: 2 }).y - 4.0).abs() < 1e-9);

    // The outermost profile was re-anchored near the front piece, just
    // above the base profile's crest
    let start = doc
        .chain(doc.find_label(ChainLabel::Raw { level: 1 }).unwrap())
        .and_then(|c| c.extremity(Extremity::Start))
        .expect("outermost profile start");
    assert!(
        start.distance(Point::new(8.0, 6.05)) < 1e-9,
        "patch anchor, got {start:?}"
    );
}

#[test]
fn test_low_boss_profile_splices_groove_into_adjacent_level() {
    // Boss only 1.5 above the floor: the shallowest level crosses the
    // stock radius and splits, the next one clears it and stays plain
    let mut host = FixtureHost::single(polyline(&[
        (20.0, 1.0),
        (10.0, 1.0),
        (9.5, 2.5),
        (8.5, 2.5),
        (8.0, 1.0),
        (2.0, 1.0),
        (-1.0, 1.0),
    ]));
    let mut doc = Document::new();
    let config = TurningConfig {
        bar_diameter: 8.0,
        turning_depth: 1.0,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    let state = rebuild_turning_profiles(&mut doc, &mut host, &AnalyticKernel, &config)
        .expect("pipeline should succeed on a low boss profile");

    assert_eq!(state.turning_times, 3);
    assert_eq!(state.gr_feature, 1);
    assert!(
        !state.first_feature_need,
        "the plain level paired with the groove, no patch needed"
    );

    // The splice consumed the groove and the merged chain became the
    // single numbered profile
    assert!(doc.find_label(ChainLabel::Raw { level: 1 }).is_some());
    assert!(doc.find_label(ChainLabel::Raw { level: 2 }).is_none());
    for level in 1..=12u8 {
        assert!(doc.find_label(ChainLabel::Groove { level }).is_none());
    }

    // Merged profile still closes at the stock radius
    assert!((end_of(&doc, ChainLabel::Raw { level: 1 }).y - 4.0).abs() < 1e-9);
    assert_eq!(state.min_front, Some(1));
}

#[test]
fn test_back_turning_endpoints_sit_on_stock_radius() {
    let config = TurningConfig {
        bar_diameter: 16.0,
        chamfer_deg: 30.0,
        back_turn: 2.5,
        turning_extend: 2.0,
        ..TurningConfig::default()
    };
    let state = TurningState {
        turning_times: 5,
        turning_depth: 1.2,
        lower_y: 0.5,
        end_x_value: 14.0,
        ..TurningState::default()
    };
    let mut doc = Document::new();
    back_turning_chains(&mut doc, &config, &state);

    assert_eq!(doc.len(), 5, "one closing chain per pass");
    for pass in 1..=5u8 {
        let id = doc
            .find_label(ChainLabel::BackTurning { index: pass })
            .unwrap_or_else(|| panic!("pass {pass} missing"));
        let chain = doc.chain(id).unwrap();
        let start = chain.extremity(Extremity::Start).unwrap();
        let end = chain.extremity(Extremity::End).unwrap();
        assert!((start.y - 8.0).abs() < 1e-9, "pass {pass} start {start:?}");
        assert!((end.y - 8.0).abs() < 1e-9, "pass {pass} end {end:?}");
        // Deeper passes bottom out lower; the middle element is the floor
        let floor = chain.element(1).unwrap();
        let expected = 0.5 + (5 - pass) as f64 * 1.2;
        assert!(
            (floor.start().y - expected).abs() < 1e-9
                && (floor.end().y - expected).abs() < 1e-9,
            "pass {pass} floor at {expected}"
        );
    }
}
