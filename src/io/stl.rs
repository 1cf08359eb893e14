use crate::config::StlFormat;
use crate::float_types::Real;
use crate::io::{IoError, verify_written};
use crate::mesh::Mesh;
use log::info;
use nalgebra::Point3;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Convert a mesh to an **ASCII STL** string with the given solid `name`.
///
/// ```rust
/// # use silhouette3d::io::stl::to_stl_ascii;
/// # use silhouette3d::mesh::Mesh;
/// let text = to_stl_ascii(&Mesh::new(), "empty");
/// assert_eq!(text, "solid empty\nendsolid empty\n");
/// ```
pub fn to_stl_ascii(mesh: &Mesh, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("solid {name}\n"));

    for (i, tri) in mesh.triangles.iter().enumerate() {
        let n = mesh.triangle_normal(i);
        out.push_str(&format!(
            "  facet normal {:.6} {:.6} {:.6}\n",
            n.x, n.y, n.z
        ));
        out.push_str("    outer loop\n");
        for &v in tri {
            let p = mesh.vertices[v];
            out.push_str(&format!(
                "      vertex {:.6} {:.6} {:.6}\n",
                p.x, p.y, p.z
            ));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Encode a mesh as binary STL: 80-byte header, triangle count, 50 bytes per facet.
#[allow(clippy::unnecessary_cast)]
pub fn to_stl_binary(mesh: &Mesh) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex};

    let triangles: Vec<Triangle> = mesh
        .triangles
        .iter()
        .enumerate()
        .map(|(i, tri)| {
            let n = mesh.triangle_normal(i);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.map(|v| {
                    let p = mesh.vertices[v];
                    Vertex::new([p.x as f32, p.y as f32, p.z as f32])
                }),
            }
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

/// Write `mesh` to `path` and check that a non-empty file landed there.
pub fn write_stl(
    mesh: &Mesh,
    path: &Path,
    format: StlFormat,
    name: &str,
) -> Result<PathBuf, IoError> {
    let bytes = match format {
        StlFormat::Ascii => to_stl_ascii(mesh, name).into_bytes(),
        StlFormat::Binary => to_stl_binary(mesh)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    verify_written(path)?;
    info!(
        "STL file saved: {} ({} triangles)",
        path.display(),
        mesh.triangle_count()
    );
    Ok(path.to_path_buf())
}

/// Read an ASCII or binary STL file back into a [`Mesh`].
///
/// Vertices with identical positions are shared, as `stl_io` indexes them.
pub fn read_stl(path: &Path) -> Result<Mesh, IoError> {
    let mut file = File::open(path)?;
    let indexed = stl_io::read_stl(&mut file)?;
    let vertices = indexed
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
        .collect();
    let triangles = indexed.faces.iter().map(|f| f.vertices).collect();
    Ok(Mesh::from_parts(vertices, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn ascii_layout() {
        let text = to_stl_ascii(&triangle(), "tri");
        assert!(text.starts_with("solid tri\n  facet normal 0.000000 0.000000 1.000000\n"));
        assert!(text.contains("      vertex 1.000000 0.000000 0.000000\n"));
        assert!(text.ends_with("  endfacet\nendsolid tri\n"));
    }

    #[test]
    fn binary_size_is_header_plus_records() {
        let bytes = to_stl_binary(&triangle()).unwrap();
        assert_eq!(bytes.len(), 80 + 4 + 50);
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 1);
    }
}
