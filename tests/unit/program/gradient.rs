use super::*;

#[test]
fn ratio_between_first_two_stops_interpolates_locally() {
    let ratios = [0.0, 0.2, 1.0];
    match select_stops(&ratios, 0.1) {
        StopSelection::Between { index, local_ratio } => {
            assert_eq!(index, 0);
            assert!((local_ratio - 0.5).abs() < 1e-12);
        }
        other => panic!("unexpected selection {other:?}"),
    }
}

#[test]
fn ratios_outside_the_table_pick_the_end_stops() {
    let ratios = [0.25_f32, 0.75];
    assert_eq!(select_stops(&ratios, 0.0), StopSelection::Single(0));
    assert_eq!(select_stops(&ratios, 0.25), StopSelection::Single(0));
    assert_eq!(select_stops(&ratios, 0.9), StopSelection::Single(1));
    assert_eq!(select_stops(&[0.5_f64], 0.7), StopSelection::Single(0));
}

#[test]
fn coincident_stops_produce_a_hard_edge() {
    let ratios = [0.0, 0.5, 0.5, 1.0];
    assert_eq!(
        select_stops(&ratios, 0.5),
        StopSelection::Between {
            index: 2,
            local_ratio: 0.0
        }
    );
    match select_stops(&ratios, 0.49) {
        StopSelection::Between { index, .. } => assert_eq!(index, 0),
        other => panic!("unexpected selection {other:?}"),
    }
}

#[test]
fn extend_modes_fold_ratios_back_into_unit_range() {
    assert_eq!(ExtendMode::Pad.apply(-0.5), 0.0);
    assert_eq!(ExtendMode::Pad.apply(1.5), 1.0);
    assert!((ExtendMode::Repeat.apply(1.25) - 0.25).abs() < 1e-12);
    assert!((ExtendMode::Repeat.apply(-0.25) - 0.75).abs() < 1e-12);
    assert!((ExtendMode::Reflect.apply(1.25) - 0.75).abs() < 1e-12);
    assert!((ExtendMode::Reflect.apply(-0.25) - 0.25).abs() < 1e-12);
    assert!((ExtendMode::Reflect.apply(2.25) - 0.25).abs() < 1e-12);
}

#[test]
fn ratio_validation_rejects_bad_tables() {
    assert!(validate_ratios(&[0.0, 0.5, 1.0]).is_ok());
    assert!(validate_ratios(&[]).is_err());
    assert!(validate_ratios(&[0.5, 0.2]).is_err());
    assert!(validate_ratios(&[0.0, f64::NAN]).is_err());
}

#[test]
fn accuracy_flags_and_wire_values() {
    for (i, a) in RenderGradientAccuracy::ALL.iter().enumerate() {
        assert_eq!(*a as u8 as usize, i);
        assert_eq!(RenderGradientAccuracy::from_u8(i as u8), Some(*a));
    }
    assert_eq!(RenderGradientAccuracy::from_u8(5), None);
    assert!(RenderGradientAccuracy::SplitAccurate.reads_centroid());
    assert!(!RenderGradientAccuracy::SplitPixelCenter.reads_centroid());
    assert!(RenderGradientAccuracy::SplitPixelCenter.needs_face());
    assert!(!RenderGradientAccuracy::UnsplitCentroid.needs_face());
    assert_eq!(ExtendMode::from_u8(2), Some(ExtendMode::Repeat));
    assert_eq!(ExtendMode::from_u8(3), None);
}
