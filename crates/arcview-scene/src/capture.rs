//! Frame-buffer-to-texture capture cache
//!
//! Backs the z-buffer overlay: the current color or depth buffer is
//! copied into a power-of-two texture at least as large as the viewport.
//! The texture is cached and only reallocated when the padded size or the
//! requested format changes. Since the texture may be padded, the
//! sub-rectangle actually covered by buffer content is exposed as maximum
//! normalized coordinates.

/// Smallest texture edge ever allocated.
const MIN_TEXTURE_EDGE: u32 = 16;

/// Round up to the next power of two, starting at [`MIN_TEXTURE_EDGE`].
fn padded_edge(size: u32) -> u32 {
    let mut edge = MIN_TEXTURE_EDGE;
    while edge < size {
        edge <<= 1;
    }
    edge
}

/// Single-entry cache for the buffer capture texture.
///
/// No eviction: the entry is invalidated when the viewport outgrows the
/// padded size or the format changes.
#[derive(Debug, Default)]
pub struct BufferTextureCache {
    texture: Option<wgpu::Texture>,
    texture_width: u32,
    texture_height: u32,
    max_u: f32,
    max_v: f32,
    format: Option<wgpu::TextureFormat>,
}

impl BufferTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the cached geometry for a viewport/format pair.
    ///
    /// Returns true when the texture must be (re)allocated. Separated
    /// from the allocation so the sizing logic is testable without a GPU
    /// device.
    pub fn prepare(&mut self, viewport: (u32, u32), format: wgpu::TextureFormat) -> bool {
        let width = padded_edge(viewport.0);
        let height = padded_edge(viewport.1);

        let mut realloc = self.texture.is_none();

        if width != self.texture_width || height != self.texture_height {
            self.texture_width = width;
            self.texture_height = height;
            realloc = true;
        }
        // The covered sub-rectangle follows the viewport even when the
        // padded texture size is unchanged.
        self.max_u = viewport.0 as f32 / width as f32;
        self.max_v = viewport.1 as f32 / height as f32;

        if self.format != Some(format) {
            self.format = Some(format);
            realloc = true;
        }

        realloc
    }

    /// The capture texture for this viewport and format, allocating or
    /// reallocating only when [`Self::prepare`] demands it.
    pub fn texture_for(
        &mut self,
        device: &wgpu::Device,
        viewport: (u32, u32),
        format: wgpu::TextureFormat,
    ) -> &wgpu::Texture {
        if self.prepare(viewport, format) {
            log::debug!(
                "allocating {}x{} capture texture ({:?})",
                self.texture_width,
                self.texture_height,
                format
            );
            self.texture = Some(device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Buffer Capture Texture"),
                size: wgpu::Extent3d {
                    width: self.texture_width,
                    height: self.texture_height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            }));
        }
        self.texture.as_ref().expect("texture allocated above")
    }

    /// Padded texture width in texels (0 before the first prepare).
    pub fn texture_width(&self) -> u32 {
        self.texture_width
    }

    /// Padded texture height in texels (0 before the first prepare).
    pub fn texture_height(&self) -> u32 {
        self.texture_height
    }

    /// Maximum u coordinate covered by buffer content.
    pub fn max_u(&self) -> f32 {
        self.max_u
    }

    /// Maximum v coordinate covered by buffer content.
    pub fn max_v(&self) -> f32 {
        self.max_v
    }

    /// Drop the cached texture (e.g. on device loss).
    pub fn invalidate(&mut self) {
        self.texture = None;
        self.format = None;
        self.texture_width = 0;
        self.texture_height = 0;
        self.max_u = 0.0;
        self.max_v = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_edge() {
        assert_eq!(padded_edge(0), 16);
        assert_eq!(padded_edge(16), 16);
        assert_eq!(padded_edge(17), 32);
        assert_eq!(padded_edge(800), 1024);
        assert_eq!(padded_edge(1024), 1024);
    }

    #[test]
    fn test_prepare_reports_realloc_only_on_change() {
        let mut cache = BufferTextureCache::new();
        assert!(cache.prepare((800, 600), wgpu::TextureFormat::Rgba8Unorm));
        assert_eq!(cache.texture_width(), 1024);
        assert_eq!(cache.texture_height(), 1024);

        // prepare() alone does not allocate; the texture slot is still
        // empty, so a realloc stays pending.
        assert!(cache.prepare((800, 600), wgpu::TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn test_coverage_rectangle() {
        let mut cache = BufferTextureCache::new();
        cache.prepare((800, 600), wgpu::TextureFormat::Rgba8Unorm);
        assert!((cache.max_u() - 800.0 / 1024.0).abs() < 1e-6);
        assert!((cache.max_v() - 600.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_padded_size_updates_coverage() {
        let mut cache = BufferTextureCache::new();
        cache.prepare((800, 600), wgpu::TextureFormat::Rgba8Unorm);
        // 900x700 still pads to 1024x1024.
        cache.prepare((900, 700), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(cache.texture_width(), 1024);
        assert!((cache.max_u() - 900.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_format_change_invalidates() {
        let mut cache = BufferTextureCache::new();
        cache.prepare((100, 100), wgpu::TextureFormat::Rgba8Unorm);
        let realloc = cache.prepare((100, 100), wgpu::TextureFormat::Depth32Float);
        assert!(realloc);
    }
}
