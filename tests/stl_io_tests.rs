mod support;

use geo::{LineString, Polygon};
use silhouette3d::config::StlFormat;
use silhouette3d::float_types::Real;
use silhouette3d::io::IoError;
use silhouette3d::io::stl::{read_stl, to_stl_ascii, to_stl_binary, write_stl};
use silhouette3d::mesh::{Extruder, Mesh};
use std::fs::{self, File};
use support::*;

fn frame() -> Mesh {
    let polygon: Polygon<Real> = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
        vec![LineString::from(vec![(3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)])],
    );
    Extruder::new(4.0).unwrap().extrude_polygon(&polygon).unwrap()
}

#[test]
fn binary_stl_reads_back_watertight() {
    init_logging();
    let mesh = frame();
    let path = temp_path("frame_binary.stl");
    let written = write_stl(&mesh, &path, StlFormat::Binary, "frame").unwrap();
    assert_eq!(written, path);
    assert_eq!(
        fs::metadata(&path).unwrap().len(),
        84 + 50 * mesh.triangle_count() as u64
    );

    let mut file = File::open(&path).unwrap();
    let raw = stl_io::read_stl(&mut file).unwrap();
    assert_eq!(raw.faces.len(), mesh.triangle_count());
    assert_eq!(raw.vertices.len(), mesh.vertex_count());

    let back = read_stl(&path).unwrap();
    let analysis = back.analyze_manifold();
    assert!(analysis.is_watertight());
    assert_eq!(analysis.genus(), Some(1));
    assert!(approx_eq(back.signed_volume(), mesh.signed_volume(), 1e-3));
}

#[test]
fn ascii_stl_reads_back() {
    let mesh = frame();
    let path = temp_path("frame_ascii.stl");
    write_stl(&mesh, &path, StlFormat::Ascii, "frame").unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("solid frame\n"));
    assert!(text.trim_end().ends_with("endsolid frame"));
    assert_eq!(text.matches("facet normal").count(), mesh.triangle_count());

    let back = read_stl(&path).unwrap();
    assert_eq!(back.triangle_count(), mesh.triangle_count());
    assert!(back.analyze_manifold().is_watertight());
}

#[test]
fn in_memory_encodings_agree_on_size() {
    let mesh = frame();
    let ascii = to_stl_ascii(&mesh, "frame");
    assert_eq!(ascii.matches("endfacet").count(), 32);
    let binary = to_stl_binary(&mesh).unwrap();
    assert_eq!(binary.len(), 84 + 50 * 32);
}

#[test]
fn missing_parent_directories_are_created() {
    let path = temp_path("nested").join("deeper").join("frame.stl");
    write_stl(&frame(), &path, StlFormat::Binary, "frame").unwrap();
    assert!(path.is_file());
}

#[test]
fn unwritable_target_is_an_error() {
    let dir = temp_path("a_directory");
    fs::create_dir_all(&dir).unwrap();
    let err = write_stl(&frame(), &dir, StlFormat::Binary, "frame").unwrap_err();
    assert!(matches!(err, IoError::StdIo(_)));
}
