use mapquery::prelude::*;
use mapquery::{Feature, MapQueryError, ScaleMapper, read_data_header, segments_intersect_rect};
use tempfile::NamedTempFile;

fn line(points: &[(f64, f64)]) -> Vec<Coord<f64>> {
    points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect()
}

fn emitted<S: FeatureSource>(source: &S, r: &Rect<f64>) -> usize {
    let mut n = 0;
    source
        .for_each_feature(r, |_: &Feature| {
            n += 1;
            Ok(())
        })
        .unwrap();
    n
}

fn store_with_crossing_line() -> FeatureStore {
    let mut writer = StoreWriter::new(rect(0.0, 0.0, 10.0, 10.0), ScaleRange::new(0, 17).unwrap())
        .unwrap();
    writer
        .add_feature(1, &[(0, line(&[(0.0, 5.0), (10.0, 5.0)]))])
        .unwrap();
    writer.add_feature(2, &[(0, line(&[(5.0, 5.0)]))]).unwrap();
    FeatureStore::from_bytes(writer.finish()).unwrap()
}

#[test]
fn test_non_finite_query_emits_nothing() {
    let store = store_with_crossing_line();
    let filter = VisibilityFilter::new(|_: u32, _: u8| true);
    let index = IndexedSource::build(&store, &filter, &IndexConfig::default()).unwrap();
    let linear = LinearScanSource::new(&store, &filter, index.scale_mapper());

    let bad = rect(f64::NAN, 0.0, 10.0, 10.0);
    assert_eq!(emitted(&index, &bad), 0);
    assert_eq!(emitted(&linear, &bad), 0);
}

#[test]
fn test_single_point_features_never_intersect() {
    let store = store_with_crossing_line();
    let filter = VisibilityFilter::new(|_: u32, _: u8| true);
    let index = IndexedSource::build(&store, &filter, &IndexConfig::default()).unwrap();
    let linear = LinearScanSource::new(&store, &filter, index.scale_mapper());

    let r = rect(4.0, 4.0, 6.0, 6.0);
    assert_eq!(emitted(&linear, &r), 1);
    // The point's envelope lies inside the rectangle, so the index may
    // return it as a tolerated extra.
    assert_eq!(emitted(&index, &r), 2);
    assert!(!segments_intersect_rect(&r, &line(&[(5.0, 5.0)])));
}

#[test]
fn test_degenerate_rect_maps_to_finest_scale() {
    let mapper = ScaleMapper::new(ScaleRange::new(3, 15).unwrap(), 360.0).unwrap();
    assert_eq!(mapper.level_for(&rect(2.0, 2.0, 2.0, 2.0)), 15);
    assert_eq!(mapper.level_for(&rect(-1000.0, 0.0, 1000.0, 1.0)), 3);
}

#[test]
fn test_zero_size_query_uses_index_envelopes() {
    let store = store_with_crossing_line();
    let filter = VisibilityFilter::new(|_: u32, _: u8| true);
    let index = IndexedSource::build(&store, &filter, &IndexConfig::default()).unwrap();

    let on_line = rect(3.0, 5.0, 3.0, 5.0);
    assert_eq!(index.scale_mapper().level_for(&on_line), 17);
    assert_eq!(emitted(&index, &on_line), 1);
}

#[test]
fn test_header_only_read() {
    let mut writer = StoreWriter::new(rect(-5.0, -2.0, 5.0, 2.0), ScaleRange::new(1, 9).unwrap())
        .unwrap();
    writer
        .add_feature(1, &[(1, line(&[(0.0, 0.0), (1.0, 1.0)]))])
        .unwrap();
    let file = NamedTempFile::new().unwrap();
    writer.write_to(file.path()).unwrap();

    let header = read_data_header(file.path()).unwrap();
    assert_eq!(header.bounds(), rect(-5.0, -2.0, 5.0, 2.0));
    assert_eq!(header.scale_range(), ScaleRange::new(1, 9).unwrap());
    assert_eq!(header.feature_count(), 1);
}

#[test]
fn test_empty_file_header_reports_nothing_read() {
    let file = NamedTempFile::new().unwrap();
    match read_data_header(file.path()) {
        Err(MapQueryError::HeaderRead { size, .. }) => assert!(size <= 0),
        other => panic!("expected header read error, got {:?}", other),
    }
}

#[test]
fn test_invalid_scale_range() {
    assert!(ScaleRange::new(9, 3).is_err());
}

#[cfg(feature = "toml")]
#[test]
fn test_config_from_toml() {
    let config = IndexConfig::from_toml(
        r#"
scale_buckets = [3, 8, 17]
world_size = 180.0
"#,
    )
    .unwrap();
    assert_eq!(config.scale_buckets, vec![3, 8, 17]);
    assert!(config.check_determinism);
}
