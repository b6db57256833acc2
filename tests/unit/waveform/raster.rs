use super::*;

#[test]
fn amplitude_mapping() {
    assert_eq!(amplitude_to_y(0.0, 150), 75);
    assert_eq!(amplitude_to_y(1.0, 150), 2);
    assert_eq!(amplitude_to_y(-1.0, 150), 148);
    assert_eq!(amplitude_to_y(0.0, 1), 0);
}

#[test]
fn silence_draws_nothing() {
    let peaks = vec![PeakPair::SILENT; 100];
    let img = rasterize(100, 50, Bilevel::WHITE, Bilevel::BLACK, &peaks).unwrap();
    assert_eq!(img.count(Bilevel::BLACK), 0);
    assert_eq!(img.count(Bilevel::WHITE), 100 * 50);
}

#[test]
fn vertical_stroke_is_inclusive() {
    let img = rasterize(
        1,
        10,
        Bilevel::WHITE,
        Bilevel::BLACK,
        &[PeakPair::new(1.0, -1.0)],
    )
    .unwrap();
    assert_eq!(img.count(Bilevel::BLACK), 7);
    for y in 2..=8 {
        assert_eq!(img.pixel(0, y), Some(Bilevel::BLACK));
    }
    assert_eq!(img.pixel(0, 9), Some(Bilevel::WHITE));
    assert_eq!(img.pixel(1, 0), None);
}

#[test]
fn columns_are_connected() {
    let peaks = [PeakPair::new(0.5, 0.5), PeakPair::new(-0.5, -0.5)];
    let img = rasterize(2, 10, Bilevel::WHITE, Bilevel::BLACK, &peaks).unwrap();
    for (x, y) in [(0, 3), (0, 4), (1, 5), (1, 6)] {
        assert_eq!(img.pixel(x, y), Some(Bilevel::BLACK), "({x}, {y})");
    }
    assert_eq!(img.count(Bilevel::BLACK), 4);
}

#[test]
fn out_of_range_amplitudes_are_clipped() {
    let peaks = [PeakPair::new(4.0, -4.0), PeakPair::new(-4.0, 4.0)];
    let img = rasterize(2, 10, Bilevel::WHITE, Bilevel::BLACK, &peaks).unwrap();
    assert_eq!(img.pixel(0, 0), Some(Bilevel::BLACK));
    assert_eq!(img.pixel(0, 9), Some(Bilevel::BLACK));
}

#[test]
fn zero_sized_raster_is_rejected() {
    let err = WaveformImage::new(0, 10, Bilevel::WHITE, Bilevel::BLACK).unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
    assert!(WaveformImage::new(10, 0, Bilevel::WHITE, Bilevel::BLACK).is_err());
}

#[test]
fn oversize_raster_is_rejected_before_allocating() {
    let err = WaveformImage::new(100_000, 100_000, Bilevel::WHITE, Bilevel::BLACK).unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
    let err = WaveformImage::new(1, MAX_RASTER_DIMENSION + 1, Bilevel::WHITE, Bilevel::BLACK)
        .unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
    check_raster_size(MAX_RASTER_DIMENSION, 1).unwrap();
}

#[test]
fn luma_buffer_is_row_major() {
    let img = rasterize(
        2,
        5,
        Bilevel::WHITE,
        Bilevel::BLACK,
        &[PeakPair::new(1.0, -1.0), PeakPair::SILENT],
    )
    .unwrap();
    let luma = img.to_luma8().unwrap();
    assert_eq!(luma.dimensions(), (2, 5));
    assert_eq!(luma.as_raw().len(), 10);
    for y in 0..5 {
        for x in 0..2 {
            let expected = img.pixel(x, y).unwrap().luma();
            assert_eq!(luma.get_pixel(x, y).0, [expected], "({x}, {y})");
        }
    }
    assert!(luma.pixels().any(|p| p.0 == [0]));
}

#[test]
fn png_uses_full_scale_grey() {
    let img = rasterize(
        3,
        4,
        Bilevel::BLACK,
        Bilevel::WHITE,
        &[PeakPair::SILENT, PeakPair::new(1.0, -1.0), PeakPair::SILENT],
    )
    .unwrap();
    let png = img.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (3, 4));
    assert_eq!(decoded.get_pixel(0, 0).0, [0]);
    assert_eq!(decoded.get_pixel(1, 2).0, [255]);
}
