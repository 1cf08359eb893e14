//! Manifold validation and topology analysis for indexed triangle meshes

use crate::mesh::Mesh;
use hashbrown::HashMap;

/// Topological summary of a [`Mesh`].
///
/// A closed, consistently wound 2-manifold has no boundary or non-manifold
/// edges; its Euler characteristic then gives the genus of each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshAnalysis {
    /// Number of edges used by a single triangle (0 for closed manifolds)
    pub boundary_edges: usize,
    /// Number of edges shared by more than two triangles
    pub non_manifold_edges: usize,
    /// Vertices no triangle refers to
    pub isolated_vertices: usize,
    /// Edge-connected groups of triangles
    pub connected_components: usize,
    /// Every interior edge is traversed once in each direction
    pub consistent_orientation: bool,
    /// V - E + F, isolated vertices excluded
    pub euler_characteristic: i64,
}

impl MeshAnalysis {
    pub fn is_watertight(&self) -> bool {
        self.boundary_edges == 0
            && self.non_manifold_edges == 0
            && self.isolated_vertices == 0
            && self.consistent_orientation
    }

    /// Total genus assuming a closed surface: χ = 2·components − 2·genus.
    pub fn genus(&self) -> Option<i64> {
        if !self.is_watertight() {
            return None;
        }
        let components = self.connected_components as i64;
        Some((2 * components - self.euler_characteristic) / 2)
    }
}

impl Mesh {
    pub fn analyze_manifold(&self) -> MeshAnalysis {
        // canonical (min, max) edge -> triangles using it
        let mut edge_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        // directed edge -> number of uses
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        let mut used = vec![false; self.vertices.len()];

        for (face, tri) in self.triangles.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let edge = if a < b { (a, b) } else { (b, a) };
                edge_faces.entry(edge).or_default().push(face);
                *directed.entry((a, b)).or_insert(0) += 1;
                if let Some(flag) = used.get_mut(a) {
                    *flag = true;
                }
            }
        }

        let mut boundary_edges = 0;
        let mut non_manifold_edges = 0;
        for faces in edge_faces.values() {
            match faces.len() {
                1 => boundary_edges += 1,
                2 => {},
                _ => non_manifold_edges += 1,
            }
        }

        let consistent_orientation = directed.values().all(|&count| count == 1);
        let isolated_vertices = used.iter().filter(|&&u| !u).count();
        let connected_components = self.count_components(&edge_faces);

        let v = (self.vertices.len() - isolated_vertices) as i64;
        let e = edge_faces.len() as i64;
        let f = self.triangles.len() as i64;

        MeshAnalysis {
            boundary_edges,
            non_manifold_edges,
            isolated_vertices,
            connected_components,
            consistent_orientation,
            euler_characteristic: v - e + f,
        }
    }

    fn count_components(&self, edge_faces: &HashMap<(usize, usize), Vec<usize>>) -> usize {
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.triangles.len()];
        for faces in edge_faces.values() {
            for (i, &a) in faces.iter().enumerate() {
                for &b in &faces[i + 1..] {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
        }

        let mut visited = vec![false; self.triangles.len()];
        let mut components = 0;
        let mut stack = Vec::new();
        for start in 0..self.triangles.len() {
            if visited[start] {
                continue;
            }
            components += 1;
            visited[start] = true;
            stack.push(start);
            while let Some(face) = stack.pop() {
                for &next in &adjacency[face] {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }
}
