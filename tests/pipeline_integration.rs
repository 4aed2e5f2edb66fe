// End-to-end tests of the lap, baseline and corner pipeline on synthetic circuits

mod common;

use approx::assert_relative_eq;
use common::{Stadium, circle_session, slowest_sample};
use trackline::{
    AnalysisConfig, LapSource, LapTrackCache, PlanarPoint, TrackAnalyzer, TurnDirection,
    locate_on_baseline,
};

fn analyzer() -> TrackAnalyzer {
    TrackAnalyzer::new(AnalysisConfig::default()).unwrap()
}

#[test]
fn test_circle_with_two_beacons_is_one_lap() {
    // 400 m loop at 10 m/s: one lap every 40 s
    let mut session = circle_session(400.0, 10.0, 1200);
    session.beacon_markers = vec![5.0, 45.0];
    let analyzer = analyzer();

    let laps = analyzer.segment_laps(&session).unwrap();
    assert_eq!(laps.len(), 1);
    assert_relative_eq!(laps[0].duration_s(), 40.0, epsilon = 0.1);
    assert_eq!(laps[0].source, LapSource::Beacon);

    let baseline = analyzer.build_baseline(&session).unwrap();
    assert!(!baseline.centerline().is_empty());
    assert_eq!(baseline.reference_lap(), 1);
    assert_relative_eq!(baseline.total_length_m(), 400.0, epsilon = 1.0);
}

#[test]
fn test_stadium_laps_and_statistics() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.1, 1.0]);
    let analyzer = analyzer();

    let laps = analyzer.segment_laps(&session).unwrap();
    assert_eq!(laps.len(), 3);
    assert!(laps.iter().all(|l| l.source == LapSource::Beacon));
    assert_eq!(
        laps.iter().map(|l| l.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let statistics = analyzer.lap_statistics(&session).unwrap();
    assert_eq!(statistics.lap_times_s.len(), 3);
    assert_eq!(statistics.best_lap_s, laps[1].duration_s());
    assert!(statistics.regularity_s > 0.0);
    assert!(statistics.theoretical_lap_s < statistics.average_lap_s);
}

#[test]
fn test_gps_crossings_match_beacon_laps() {
    let stadium = Stadium::default();
    let with_beacons = stadium.session(3, &[1.0]);
    let mut without_beacons = with_beacons.clone();
    without_beacons.beacon_markers.clear();
    let analyzer = analyzer();

    let beacon_laps = analyzer.segment_laps(&with_beacons).unwrap();
    let gps_laps = analyzer.segment_laps(&without_beacons).unwrap();
    assert_eq!(gps_laps.len(), beacon_laps.len());
    for (gps, beacon) in gps_laps.iter().zip(&beacon_laps) {
        assert_eq!(gps.source, LapSource::GpsCrossing);
        assert_relative_eq!(gps.duration_s(), beacon.duration_s(), epsilon = 0.2);
    }
}

#[test]
fn test_stadium_baseline_has_two_left_hairpins() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.1, 1.0]);
    let baseline = analyzer().build_baseline(&session).unwrap();

    // the second lap is the fastest
    assert_eq!(baseline.reference_lap(), 2);
    assert_eq!(baseline.laps().len(), 3);

    let corners = baseline.corners();
    assert_eq!(corners.len(), 2);
    for (i, corner) in corners.iter().enumerate() {
        assert_eq!(corner.number, (i + 1) as u32);
        assert_eq!(corner.direction, TurnDirection::Left);
        assert!(
            (30.0..65.0).contains(&corner.length_m),
            "corner {} is {} m",
            corner.number,
            corner.length_m
        );
        assert_relative_eq!(corner.peak_curvature, 1.0 / 15.0, max_relative = 0.25);
    }

    assert_eq!(
        baseline.corner_length_m() + baseline.straight_length_m(),
        baseline.total_length_m()
    );
    assert_relative_eq!(
        baseline.total_length_m(),
        stadium.lap_length_m(),
        max_relative = 0.01
    );
    assert_eq!(baseline.left_boundary().len(), baseline.centerline().len());
    assert_eq!(baseline.right_boundary().len(), baseline.centerline().len());
}

#[test]
fn test_query_at_apex_matches_every_lap() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.1, 1.0]);
    let analyzer = analyzer();
    let baseline = analyzer.build_baseline(&session).unwrap();
    let apex = stadium.first_apex();

    let features = analyzer
        .query_corner(&session, &baseline, apex.x, apex.y, None)
        .unwrap();
    assert_eq!(features.len(), 3);
    for feature in &features {
        let offset = PlanarPoint::new(feature.apex_x, feature.apex_y).distance_to(&apex);
        assert!(offset < 30.0, "lap {} apex {} m away", feature.lap_number, offset);
        assert_eq!(feature.corner_number, Some(1));
        assert!(feature.kinematics.speed_gain_kmh > 0.0);
        assert!(feature.kinematics.rpm_slope > 0.0);
        assert!(feature.kinematics.rpm_speed_corr > 0.99);
        assert!(!feature.kinematics.rpm_anomaly);
    }
    assert_relative_eq!(features[0].apex_speed_kmh, 8.0 * 3.6, epsilon = 1.0);
    assert_relative_eq!(features[1].apex_speed_kmh, 8.0 * 1.1 * 3.6, epsilon = 1.0);

    let second = stadium.second_apex();
    let features = analyzer
        .query_corner(&session, &baseline, second.x, second.y, None)
        .unwrap();
    assert_eq!(features.len(), 3);
    assert!(features.iter().all(|f| f.corner_number == Some(2)));
}

#[test]
fn test_query_far_from_the_track_is_empty() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0]);
    let analyzer = analyzer();
    let baseline = analyzer.build_baseline(&session).unwrap();

    // 100 m north of the upper straight
    let features = analyzer
        .query_corner(&session, &baseline, 150.0, 130.0, None)
        .unwrap();
    assert!(features.is_empty());
}

#[test]
fn test_rpm_flare_after_apex_is_flagged() {
    let stadium = Stadium::default();
    let mut session = stadium.session(3, &[1.0]);
    let analyzer = analyzer();
    let laps = analyzer.segment_laps(&session).unwrap();

    // first half of lap 3 holds the first hairpin
    let lap = &laps[2].samples;
    let apex = slowest_sample(&session, lap.start..lap.start + lap.len() / 2);
    if let Some(rpm) = session.samples[apex + 10].engine_rpm.as_mut() {
        *rpm += 2000.0;
    }

    let baseline = analyzer.build_baseline(&session).unwrap();
    let target = stadium.first_apex();
    let features = analyzer
        .query_corner(&session, &baseline, target.x, target.y, None)
        .unwrap();
    assert_eq!(features.len(), 3);
    for feature in &features {
        assert_eq!(
            feature.kinematics.rpm_anomaly,
            feature.lap_number == 3,
            "lap {}",
            feature.lap_number
        );
    }
}

#[test]
fn test_cached_queries_match_stateless_queries() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.05, 0.95]);
    let analyzer = analyzer();
    let baseline = analyzer.build_baseline(&session).unwrap();
    let mut cache = LapTrackCache::new();

    for apex in [stadium.first_apex(), stadium.second_apex()] {
        let stateless = analyzer
            .query_corner(&session, &baseline, apex.x, apex.y, Some(25.0))
            .unwrap();
        let cached = analyzer
            .query_corner_cached(&session, &baseline, apex.x, apex.y, Some(25.0), &mut cache)
            .unwrap();
        assert_eq!(stateless, cached);
    }
    assert_eq!(cache.len(), 3);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_locate_apex_on_baseline() {
    let stadium = Stadium::default();
    let session = stadium.session(2, &[1.0]);
    let baseline = analyzer().build_baseline(&session).unwrap();
    let apex = stadium.first_apex();

    let location = locate_on_baseline(&baseline, apex.x, apex.y).unwrap();
    assert!(location.distance_m < 1.0);
    // straight plus half a hairpin from the start of the lap
    assert_relative_eq!(
        location.arc_length_m,
        stadium.straight_m + std::f64::consts::PI * stadium.radius_m / 2.0,
        epsilon = 2.0
    );
}

#[test]
fn test_reference_corners_of_fastest_lap() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.1, 1.0]);
    let reference = analyzer().reference_corners(&session).unwrap();

    assert_eq!(reference.lap_number, 2);
    assert_eq!(reference.corners.len(), 2);
    assert_eq!(
        reference
            .corners
            .iter()
            .map(|c| c.corner_number)
            .collect::<Vec<_>>(),
        vec![Some(1), Some(2)]
    );
    for corner in &reference.corners {
        assert_eq!(corner.lap_number, 2);
        assert_relative_eq!(corner.apex_speed_kmh, 8.0 * 1.1 * 3.6, epsilon = 1.0);
    }
}

#[test]
fn test_explicit_baseline_lap() {
    let stadium = Stadium::default();
    let session = stadium.session(3, &[1.0, 1.1, 1.0]);
    let analyzer = analyzer();

    let baseline = analyzer.build_baseline_for_lap(&session, 3).unwrap();
    assert_eq!(baseline.reference_lap(), 3);
    assert!(analyzer.build_baseline_for_lap(&session, 9).is_err());
}

#[test]
fn test_circuit_characteristics_of_stadium() {
    let stadium = Stadium::default();
    let session = stadium.session(2, &[1.0]);
    let analyzer = analyzer();

    let characteristics = analyzer.compute_circuit_characteristics(&session);
    assert!(characteristics.braking > 0.8);
    assert!(characteristics.engine > 0.0 && characteristics.engine < 1.0);
    assert!(characteristics.downforce > 0.0);
    assert!(characteristics.tyre_wear > 0.0);
    assert!(characteristics.mechanical_grip > 0.0);

    let outline = analyzer.track_outline(&session);
    assert!(!outline.is_empty() && outline.len() <= 200);
}

#[test]
fn test_zero_acceleration_circuit_has_no_braking_or_engine() {
    let mut session = circle_session(400.0, 10.0, 1200);
    for sample in session.samples.iter_mut() {
        sample.lon_accel_g = Some(0.0);
        sample.lat_accel_g = Some(0.0);
    }
    let characteristics = analyzer().compute_circuit_characteristics(&session);
    assert_eq!(characteristics.braking, 0.0);
    assert_eq!(characteristics.engine, 0.0);
}

#[test]
fn test_session_without_position_cannot_build_baseline() {
    let mut session = circle_session(400.0, 10.0, 1200);
    session.beacon_markers = vec![5.0, 45.0];
    for sample in session.samples.iter_mut() {
        sample.longitude = None;
    }
    let analyzer = analyzer();
    assert!(matches!(
        analyzer.build_baseline(&session),
        Err(trackline::TracklineError::MissingData { .. })
    ));
    // laps still come from the beacons
    assert_eq!(analyzer.segment_laps(&session).unwrap().len(), 1);
}
