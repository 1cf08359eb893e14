//! End-to-end conversion: image or SVG in, extruded STL out.
//!
//! Every stage runs before anything is written, so a run that fails leaves
//! no mesh and no vector document behind. Only the debug mask, when enabled,
//! is saved as soon as it is produced.

use crate::config::PipelineConfig;
use crate::errors::{ExtrusionError, PipelineError};
use crate::io::stl::write_stl;
use crate::io::svg::{PathSampler, VectorDocument};
use crate::mesh::{Extruder, Mesh};
use crate::raster::{BinaryMask, Binarizer, ContourExtractor, Outline, load_grayscale};
use crate::sketch::{PolygonBuilder, RingSet, Sketch, merge_polygons};
use image::GrayImage;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when no output path is given; placed next to the input.
pub const DEFAULT_OUTPUT_NAME: &str = "output.stl";

/// What a finished conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub vector_output: Option<PathBuf>,
    pub polygons: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Configured image → silhouette → solid conversion.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn binarize(&self, img: &GrayImage) -> BinaryMask {
        let binarizer = Binarizer::new(self.config.threshold);
        match &self.config.debug_mask {
            Some(path) => binarizer.with_debug_output(path.clone()).binarize(img),
            None => binarizer.binarize(img),
        }
    }

    /// Binarize and trace; fails with `GeometryEmpty` when no outline is found.
    pub fn trace(&self, img: &GrayImage) -> Result<Vec<Outline>, PipelineError> {
        let mask = self.binarize(img);
        let outlines = ContourExtractor::new(self.config.contour_mode, self.config.max_contour_points)
            .extract(&mask);
        if outlines.is_empty() {
            return Err(PipelineError::GeometryEmpty);
        }
        Ok(outlines)
    }

    fn builder(&self) -> PolygonBuilder {
        PolygonBuilder::new(self.config.simplification_epsilon, self.config.max_contour_points)
    }

    /// Validated, merged silhouette of traced outlines.
    pub fn silhouette_from_outlines(&self, outlines: &[Outline]) -> Result<Sketch, PipelineError> {
        let sets: Vec<RingSet> = outlines.iter().map(RingSet::from).collect();
        merge_polygons(self.builder().build_all(&sets))
    }

    /// Validated, merged silhouette of every path in a vector document.
    pub fn silhouette_from_document(
        &self,
        document: &VectorDocument,
    ) -> Result<Sketch, PipelineError> {
        let sets = PathSampler::new(self.config.sample_density).sample_document(document);
        merge_polygons(self.builder().build_all(&sets))
    }

    pub fn silhouette_from_image(&self, img: &GrayImage) -> Result<Sketch, PipelineError> {
        self.silhouette_from_outlines(&self.trace(img)?)
    }

    pub fn extrude(&self, sketch: &Sketch) -> Result<Mesh, PipelineError> {
        let extruder =
            Extruder::new(self.config.extrusion_height).map_err(|source| PipelineError::Extrusion {
                polygons: sketch.len(),
                source,
            })?;
        let mesh = extruder.extrude(sketch)?;

        let analysis = mesh.analyze_manifold();
        if !analysis.is_watertight() {
            return Err(PipelineError::Extrusion {
                polygons: sketch.len(),
                source: ExtrusionError::NotWatertight {
                    boundary_edges: analysis.boundary_edges,
                    non_manifold_edges: analysis.non_manifold_edges,
                },
            });
        }
        debug!(
            "mesh is closed: {} component(s), euler characteristic {}",
            analysis.connected_components, analysis.euler_characteristic
        );
        Ok(mesh)
    }

    pub fn mesh_from_image(&self, img: &GrayImage) -> Result<Mesh, PipelineError> {
        self.extrude(&self.silhouette_from_image(img)?)
    }

    /// Convert an image file to STL. Without `output` the mesh is written next
    /// to the input as [`DEFAULT_OUTPUT_NAME`].
    pub fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ConversionReport, PipelineError> {
        let img = load_grayscale(input)?;
        info!("Image size: {}x{}", img.width(), img.height());

        let outlines = self.trace(&img)?;
        let sketch = self.silhouette_from_outlines(&outlines)?;
        let mesh = self.extrude(&sketch)?;

        let document = self
            .config
            .vector_output
            .as_deref()
            .map(|path| (VectorDocument::from_outlines(&outlines, img.width(), img.height()), path));
        self.finish(input, output, &sketch, &mesh, document)
    }

    /// Convert an SVG document to STL.
    pub fn convert_document(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ConversionReport, PipelineError> {
        let document = VectorDocument::read_svg(input).map_err(PipelineError::VectorDocument)?;
        info!(
            "Document {}x{} with {} path(s)",
            document.width,
            document.height,
            document.paths.len()
        );
        let sketch = self.silhouette_from_document(&document)?;
        let mesh = self.extrude(&sketch)?;
        self.finish(input, output, &sketch, &mesh, None)
    }

    /// Write the mesh, then the vector document. A failed document write
    /// removes the mesh again.
    fn finish(
        &self,
        input: &Path,
        output: Option<&Path>,
        sketch: &Sketch,
        mesh: &Mesh,
        document: Option<(VectorDocument, &Path)>,
    ) -> Result<ConversionReport, PipelineError> {
        let path = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
        let written = write_stl(mesh, &path, self.config.stl_format, &self.config.solid_name)
            .map_err(|source| PipelineError::Export {
                path: path.clone(),
                source,
            })?;

        let vector_output = match document {
            Some((document, svg_path)) => {
                if let Err(source) = document.write_svg(svg_path) {
                    if let Err(e) = fs::remove_file(&written) {
                        warn!("could not remove {}: {e}", written.display());
                    }
                    return Err(PipelineError::Export {
                        path: svg_path.to_path_buf(),
                        source,
                    });
                }
                Some(svg_path.to_path_buf())
            },
            None => None,
        };

        Ok(ConversionReport {
            output: written,
            vector_output,
            polygons: sketch.len(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
        })
    }
}

/// `output.stl` in the directory of `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(DEFAULT_OUTPUT_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/data/cat.png")),
            PathBuf::from("/data/output.stl")
        );
        assert_eq!(default_output_path(Path::new("cat.png")), PathBuf::from("output.stl"));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = PipelineConfig::default().with_height(-1.0);
        assert!(matches!(Pipeline::new(config), Err(PipelineError::InvalidConfig(_))));
    }
}
