//! Live preview: rasterize once, re-synthesize on every style change.
//!
//! Rasterization is the expensive half of the pipeline, and it depends
//! only on the source markup and the grid size. The session keeps the last
//! buffer keyed by `(path, blake3(markup), grid)`; any other setting
//! (colors, shape, jitter, threshold) reuses it.

use std::path::{Path, PathBuf};

use crate::config::VoxelConfig;
use crate::debug;
use crate::image::raster::{PixelBuffer, Rasterizer, RenderError};
use crate::image::voxel::{RandomSource, synthesize};

struct CachedRaster {
    source: PathBuf,
    content: blake3::Hash,
    grid: u32,
    buffer: PixelBuffer,
}

impl CachedRaster {
    fn matches(&self, source: &Path, content: &blake3::Hash, grid: u32) -> bool {
        self.grid == grid && self.content == *content && self.source == source
    }
}

/// Preview state for one source file at a time.
pub struct PreviewSession<R> {
    rasterizer: R,
    cache: Option<CachedRaster>,
    /// Rasterizer calls so far.
    rasterized: usize,
}

impl<R: Rasterizer> PreviewSession<R> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            cache: None,
            rasterized: 0,
        }
    }

    /// Synthesize `markup` with `config`, rasterizing only on a cache miss.
    pub fn render(
        &mut self,
        source: &Path,
        markup: &str,
        config: &VoxelConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<String, RenderError> {
        let buffer = self.buffer(source, markup, config.grid_resolution)?;
        Ok(synthesize(buffer, config, rng))
    }

    fn buffer(&mut self, source: &Path, markup: &str, grid: u32) -> Result<&PixelBuffer, RenderError> {
        let content = blake3::hash(markup.as_bytes());

        if let Some(cached) = self.cache.take()
            && cached.matches(source, &content, grid)
        {
            return Ok(&self.cache.insert(cached).buffer);
        }

        debug!("preview"; "rasterizing {} at {grid}x{grid}", source.display());
        let buffer = self.rasterizer.rasterize(markup, grid)?;
        self.rasterized += 1;

        let cached = self.cache.insert(CachedRaster {
            source: source.to_path_buf(),
            content,
            grid,
            buffer,
        });
        Ok(&cached.buffer)
    }

    /// Drop the cached buffer.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn rasterized(&self) -> usize {
        self.rasterized
    }
}
