mod support;

use silhouette3d::config::{PipelineConfig, StlFormat, ThresholdConfig, load_config};
use silhouette3d::io::stl::read_stl;
use silhouette3d::io::svg::VectorDocument;
use silhouette3d::pipeline::{DEFAULT_OUTPUT_NAME, Pipeline};
use silhouette3d::{PipelineError, Sketch};
use std::fs;
use support::*;

fn pipeline(config: PipelineConfig) -> Pipeline {
    Pipeline::new(config).expect("valid config")
}

/// 100×100 black square, window 15, bias 0, height 10.
#[test]
fn square_silhouette_becomes_a_closed_solid() {
    init_logging();
    let p = pipeline(PipelineConfig::adaptive(15, 0.0).with_height(10.0));
    let img = square_image(100, 20, 80);

    let outlines = p.trace(&img).unwrap();
    assert_eq!(outlines.len(), 1);
    assert_eq!(outlines[0].exterior.area(), 3600.0);
    // only a band along the edge differs from its surroundings
    assert_eq!(outlines[0].holes.len(), 1);
    assert_eq!(outlines[0].holes[0].area(), 46.0 * 46.0);

    let sketch = p.silhouette_from_outlines(&outlines).unwrap();
    assert!(matches!(sketch, Sketch::Single(_)));
    assert!(approx_eq(sketch.area(), 3600.0 - 2116.0, 1e-6));

    let mesh = p.extrude(&sketch).unwrap();
    let bb = bounding_box(&mesh);
    assert!(approx_eq(bb[5] - bb[2], 10.0, 1e-9));
    assert_eq!([bb[0], bb[1], bb[3], bb[4]], [20.0, 20.0, 80.0, 80.0]);
    let analysis = mesh.analyze_manifold();
    assert!(analysis.is_watertight());
    assert!(approx_eq(mesh.signed_volume(), sketch.area() * 10.0, 1e-6));
}

#[test]
fn default_window_keeps_the_square_solid() {
    let p = pipeline(PipelineConfig::default());
    let mesh = p.mesh_from_image(&square_image(100, 20, 80)).unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.analyze_manifold().genus(), Some(0));
}

#[test]
fn blank_image_fails_without_writing() {
    let input = temp_path("blank.png");
    silhouette(64, 64, |_, _| false).save(&input).unwrap();
    let output = temp_path("blank.stl");
    let svg = temp_path("blank.svg");

    let mut config = PipelineConfig::adaptive(15, 0.0);
    config.vector_output = Some(svg.clone());
    let err = pipeline(config).convert(&input, Some(&output)).unwrap_err();
    assert!(matches!(err, PipelineError::GeometryEmpty), "{err}");
    assert!(!output.exists());
    assert!(!svg.exists());
}

#[test]
fn two_blobs_become_two_solids() {
    let p = pipeline(PipelineConfig::default());
    let sketch = p.silhouette_from_image(&two_blobs_image()).unwrap();
    assert_eq!(sketch.len(), 2);

    let mesh = p.extrude(&sketch).unwrap();
    assert_eq!(mesh.vertex_count(), 2 * 8);
    assert_eq!(mesh.triangle_count(), 2 * 12);
    let analysis = mesh.analyze_manifold();
    assert!(analysis.is_watertight());
    assert_eq!(analysis.connected_components, 2);
}

#[test]
fn annulus_keeps_its_hollow_core() {
    let p = pipeline(PipelineConfig::default());
    let img = annulus_image();
    let outlines = p.trace(&img).unwrap();
    assert_eq!(outlines.len(), 1);
    assert_eq!(outlines[0].rings().count(), 2);

    let sketch = p.silhouette_from_outlines(&outlines).unwrap();
    assert_eq!(sketch.len(), 1);
    assert_eq!(sketch.hole_count(), 1);

    let mesh = p.extrude(&sketch).unwrap();
    let analysis = mesh.analyze_manifold();
    assert!(analysis.is_watertight(), "{analysis:?}");
    assert_eq!(analysis.connected_components, 1);
    assert_eq!(analysis.genus(), Some(1));
}

#[test]
fn diagonal_neighbours_stay_closed() {
    let mut config = PipelineConfig::default().with_height(5.0);
    config.threshold = ThresholdConfig::Global { level: 128 };
    let p = pipeline(config);
    let sketch = p.silhouette_from_image(&diagonal_squares_image()).unwrap();
    assert!(approx_eq(sketch.area(), 200.0, 1e-9));

    let mesh = p.extrude(&sketch).unwrap();
    let analysis = mesh.analyze_manifold();
    assert!(analysis.is_watertight(), "{analysis:?}");
    assert!(approx_eq(mesh.signed_volume(), 200.0 * 5.0, 1e-6));
}

#[test]
fn speckled_image_never_yields_an_open_mesh() {
    init_logging();
    let p = pipeline(PipelineConfig::adaptive(5, 0.0));
    for seed in [1, 7, 42] {
        let mesh = p.mesh_from_image(&noise_image(64, 64, seed)).unwrap();
        let analysis = mesh.analyze_manifold();
        assert!(analysis.is_watertight(), "seed {seed}: {analysis:?}");
        assert!(mesh.indices_in_range());
        assert!(mesh.signed_volume() > 0.0);
    }
}

#[test]
fn failed_mesh_export_leaves_no_outline_behind() {
    let input = temp_path("export_fails.png");
    square_image(40, 10, 30).save(&input).unwrap();
    let svg = temp_path("export_fails.svg");
    let blocked = temp_path("export_fails_dir");
    fs::create_dir_all(&blocked).unwrap();

    let mut config = PipelineConfig::default();
    config.vector_output = Some(svg.clone());
    let err = pipeline(config).convert(&input, Some(&blocked)).unwrap_err();
    assert!(matches!(err, PipelineError::Export { .. }), "{err}");
    assert!(!svg.exists());
}

#[test]
fn failed_outline_export_removes_the_mesh() {
    let input = temp_path("outline_fails.png");
    square_image(40, 10, 30).save(&input).unwrap();
    let output = temp_path("outline_fails.stl");
    let blocked = temp_path("outline_fails_dir");
    fs::create_dir_all(&blocked).unwrap();

    let mut config = PipelineConfig::default();
    config.vector_output = Some(blocked.clone());
    let err = pipeline(config).convert(&input, Some(&output)).unwrap_err();
    assert!(matches!(err, PipelineError::Export { path, .. } if path == blocked));
    assert!(!output.exists());
}

#[test]
fn external_only_fills_the_core() {
    let mut config = PipelineConfig::default();
    config.contour_mode = silhouette3d::config::ContourMode::External;
    let sketch = pipeline(config).silhouette_from_image(&annulus_image()).unwrap();
    assert_eq!(sketch.hole_count(), 0);
}

#[test]
fn convert_writes_stl_and_outlines() {
    let input = temp_path("annulus.png");
    annulus_image().save(&input).unwrap();
    let output = temp_path("annulus.stl");
    let svg = temp_path("annulus.svg");

    let mut config = PipelineConfig::default().with_height(3.0);
    config.vector_output = Some(svg.clone());
    config.stl_format = StlFormat::Ascii;
    let report = pipeline(config).convert(&input, Some(&output)).unwrap();

    assert_eq!(report.output, output);
    assert_eq!(report.vector_output.as_ref(), Some(&svg));
    assert_eq!(report.polygons, 1);
    let back = read_stl(&output).unwrap();
    assert_eq!(back.triangle_count(), report.triangles);

    let document = VectorDocument::read_svg(&svg).unwrap();
    assert_eq!(document.subpath_count(), 2);
}

#[test]
fn svg_conversion_matches_image_conversion() {
    let img = annulus_image();
    let p = pipeline(PipelineConfig::default());
    let outlines = p.trace(&img).unwrap();
    let svg = temp_path("annulus_source.svg");
    VectorDocument::from_outlines(&outlines, img.width(), img.height())
        .write_svg(&svg)
        .unwrap();

    let from_image = p.extrude(&p.silhouette_from_outlines(&outlines).unwrap()).unwrap();
    let document = VectorDocument::read_svg(&svg).unwrap();
    let from_svg = p.extrude(&p.silhouette_from_document(&document).unwrap()).unwrap();
    assert!(approx_eq(from_svg.signed_volume(), from_image.signed_volume(), 1e-6));

    let output = temp_path("annulus_from_svg.stl");
    let report = p.convert_document(&svg, Some(&output)).unwrap();
    assert!(output.is_file());
    assert_eq!(report.polygons, 1);
}

#[test]
fn default_output_lands_next_to_input() {
    let dir = temp_path("default_output_dir");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("square.png");
    square_image(40, 10, 30).save(&input).unwrap();

    let report = pipeline(PipelineConfig::default()).convert(&input, None).unwrap();
    assert_eq!(report.output, dir.join(DEFAULT_OUTPUT_NAME));
    assert!(report.output.is_file());
}

#[test]
fn unreadable_inputs_are_reported() {
    let p = pipeline(PipelineConfig::default());
    let missing = temp_path("does_not_exist.png");
    assert!(matches!(
        p.convert(&missing, None),
        Err(PipelineError::InputDecode { .. })
    ));

    let not_svg = temp_path("broken.svg");
    fs::write(&not_svg, "<svg><path d=\"M 0 0 L\"/>").unwrap();
    assert!(matches!(
        p.convert_document(&not_svg, None),
        Err(PipelineError::VectorDocument(_))
    ));
}

#[test]
fn config_file_drives_the_pipeline() {
    let path = temp_path("config.json");
    fs::write(
        &path,
        r#"{ "extrusion_height": 2.0, "threshold": { "mode": "global", "level": 128 } }"#,
    )
    .unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.threshold, ThresholdConfig::Global { level: 128 });

    let mesh = pipeline(config).mesh_from_image(&square_image(40, 10, 30)).unwrap();
    let bb = bounding_box(&mesh);
    assert!(approx_eq(bb[5], 2.0, 1e-12));
    assert!(approx_eq(mesh.signed_volume(), 400.0 * 2.0, 1e-9));

    let bad = temp_path("bad_config.json");
    fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(load_config(&bad), Err(PipelineError::InvalidConfig(_))));
}
