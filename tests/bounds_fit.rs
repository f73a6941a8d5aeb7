use inkframe::{
    RenderSettings, StyleMode, bounds::scene_bounds, compile_frame, fit_bounds, scene_from_json,
};
use kurbo::Rect;

#[test]
fn circle_scene_bounds_and_fit() {
    let scene = scene_from_json(
        r#"{"id":"s","duration":1000,"layers":[
            {"id":"c","type":"circle","props":{"x":100,"y":200,"r":50},"animations":[]}
        ]}"#,
    )
    .unwrap();

    // Raw extent 50..150 x 150..250, padded by 30 on each side.
    let bounds = scene_bounds(&scene).unwrap();
    assert_eq!(bounds, Rect::new(20.0, 120.0, 180.0, 280.0));

    let fit = fit_bounds(Some(bounds), 900.0, 600.0);
    assert_eq!(fit.scale, 1.0);
}

#[test]
fn content_smaller_than_surface_is_centered_at_scale_one() {
    let fit = fit_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), 900.0, 600.0);
    assert_eq!(fit.scale, 1.0);
    assert_eq!(fit.offset_x, 400.0);
    assert_eq!(fit.offset_y, 250.0);

    // The affine maps the content center onto the surface center.
    let center = fit.to_affine() * kurbo::Point::new(50.0, 50.0);
    assert_eq!(center, kurbo::Point::new(450.0, 300.0));
}

#[test]
fn wide_scene_scales_down_uniformly() {
    let scene = scene_from_json(
        r#"{"id":"s","duration":1000,"layers":[
            {"id":"a","type":"circle","props":{"x":0,"y":0,"r":30},"animations":[]},
            {"id":"b","type":"circle","props":{"x":1740,"y":0,"r":30},"animations":[]}
        ]}"#,
    )
    .unwrap();
    // Extents -30..1770 x -30..30, padded to -60..1800 x -60..60.
    let bounds = scene_bounds(&scene).unwrap();
    assert_eq!(bounds.width(), 1860.0);

    let fit = fit_bounds(Some(bounds), 900.0, 600.0);
    let expected = 900.0 / 1860.0;
    assert!((fit.scale - expected).abs() < 1e-12);

    // Both circle centers land inside the surface.
    let affine = fit.to_affine();
    for p in [kurbo::Point::new(0.0, 0.0), kurbo::Point::new(1740.0, 0.0)] {
        let mapped = affine * p;
        assert!((0.0..=900.0).contains(&mapped.x), "{mapped:?}");
        assert!((0.0..=600.0).contains(&mapped.y), "{mapped:?}");
    }
}

#[test]
fn compiled_plan_carries_the_fit_transform() {
    let scene = scene_from_json(
        r#"{"id":"s","duration":1000,"layers":[
            {"id":"c","type":"circle","props":{"x":100,"y":200,"r":50},"animations":[]}
        ]}"#,
    )
    .unwrap();
    let settings = RenderSettings {
        mode: StyleMode::Rich,
        ..RenderSettings::default()
    };
    let plan = compile_frame(&scene, 0.0, &settings);

    let fit = fit_bounds(scene_bounds(&scene), 900.0, 600.0);
    assert_eq!(plan.transform, fit.to_affine());
    assert_eq!(plan.width, 900);
    assert_eq!(plan.height, 600);
}

#[test]
fn scene_without_geometry_keeps_the_identity_viewport() {
    let scene = scene_from_json(
        r#"{"id":"s","duration":1000,"layers":[
            {"id":"b","type":"blob","props":{"x":5000,"y":5000},"animations":[]}
        ]}"#,
    )
    .unwrap();
    assert!(scene_bounds(&scene).is_none());
    let plan = compile_frame(&scene, 0.0, &RenderSettings::default());
    assert_eq!(plan.transform, kurbo::Affine::IDENTITY);
    assert!(plan.ops.is_empty());
}
