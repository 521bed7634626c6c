use mandelfill_core::{
    EscapeParams, FractalSample, PartialRenderConfig, PlaneRange, RenderConfig, Viewport,
};

/// Sample every pixel of a viewport and collect results into a flat Vec.
fn sample_grid(config: &RenderConfig) -> Vec<FractalSample> {
    let viewport = Viewport::from_config(config).unwrap();
    let params = EscapeParams::from_config(config);
    let mut samples = Vec::with_capacity(config.pixel_count());
    for py in 0..config.height {
        for px in 0..config.width {
            let c = viewport.pixel_to_complex(px, py);
            samples.push(FractalSample::compute(c, &params));
        }
    }
    samples
}

fn small_config(smooth: bool) -> RenderConfig {
    PartialRenderConfig {
        width: Some(90),
        height: Some(60),
        max_iterations: Some(200),
        smooth: Some(smooth),
        x_range: Some(PlaneRange::CLASSIC_X),
        ..Default::default()
    }
    .resolve(&RenderConfig::default())
    .unwrap()
}

#[test]
fn classic_view_has_interior_and_exterior() {
    let samples = sample_grid(&small_config(false));
    assert_eq!(samples.len(), 90 * 60);

    let interior = samples.iter().filter(|s| s.stability == 1.0).count();
    let escaped = samples.iter().filter(|s| s.stability < 1.0).count();
    assert!(interior > 0, "should have some interior points");
    assert!(escaped > 0, "should have some escaped points");
    assert_eq!(interior + escaped, 90 * 60);
}

#[test]
fn stability_is_bounded_everywhere() {
    for smooth in [false, true] {
        for s in sample_grid(&small_config(smooth)) {
            assert!(
                (0.0..=1.0).contains(&s.stability),
                "stability {} out of range at {}",
                s.stability,
                s.c
            );
            assert!(s.escape_count.is_finite());
        }
    }
}

#[test]
fn sampling_is_deterministic() {
    let config = small_config(true);
    assert_eq!(sample_grid(&config), sample_grid(&config));
}
