#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for ASCII Rogue adapters.
//!
//! The simulation only hands renderers a [`ViewportBuffer`] of glyphs. This
//! crate owns everything needed to put those glyphs on screen as a grid of
//! textured quads: the atlas geometry, the glyph-to-texture table, the quad
//! layout and the backend trait adapters implement.

use anyhow::Result as AnyResult;
use ascii_rogue_core::{
    index_to_coord, Coord, Glyph, ViewportBuffer, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
};
use glam::{Vec2, Vec4};
use std::time::Duration;
use thiserror::Error;

/// Number of entries in the glyph table, one per byte value.
pub const GLYPH_COUNT: usize = 256;

/// Pixel geometry of the glyph atlas texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasMetrics {
    /// Width of a single glyph cell in pixels.
    pub tile_width_px: u32,
    /// Height of a single glyph cell in pixels.
    pub tile_height_px: u32,
    /// Width of the whole atlas texture in pixels.
    pub atlas_width_px: u32,
    /// Height of the whole atlas texture in pixels.
    pub atlas_height_px: u32,
    /// Pixels that map onto one world unit.
    pub pixels_per_unit: u32,
    /// Glyphs laid out on each atlas row.
    pub glyphs_per_row: u32,
    /// Padding between the atlas edge and the first glyph, on both axes.
    pub origin_offset_px: u32,
}

impl AtlasMetrics {
    /// The 9x16 code page 437 atlas bundled with the game.
    pub const CLASSIC: Self = Self {
        tile_width_px: 9,
        tile_height_px: 16,
        atlas_width_px: 304,
        atlas_height_px: 144,
        pixels_per_unit: 100,
        glyphs_per_row: 32,
        origin_offset_px: 8,
    };

    /// Rejects metrics that would produce zero-sized tiles or divide by zero.
    pub fn validate(&self) -> Result<(), RenderingError> {
        if self.tile_width_px == 0 || self.tile_height_px == 0 {
            return Err(RenderingError::EmptyTile {
                width: self.tile_width_px,
                height: self.tile_height_px,
            });
        }
        if self.atlas_width_px < self.tile_width_px || self.atlas_height_px < self.tile_height_px
        {
            return Err(RenderingError::AtlasTooSmall {
                width: self.atlas_width_px,
                height: self.atlas_height_px,
            });
        }
        if self.pixels_per_unit == 0 {
            return Err(RenderingError::ZeroPixelsPerUnit);
        }
        if self.glyphs_per_row == 0 {
            return Err(RenderingError::ZeroGlyphsPerRow);
        }
        Ok(())
    }

    /// Size of one glyph cell in texture space.
    #[must_use]
    pub fn tile_uv_size(&self) -> Vec2 {
        Vec2::new(
            self.tile_width_px as f32 / self.atlas_width_px as f32,
            self.tile_height_px as f32 / self.atlas_height_px as f32,
        )
    }

    /// Size of one glyph quad in world units.
    #[must_use]
    pub fn tile_world_size(&self) -> Vec2 {
        Vec2::new(
            self.tile_width_px as f32 / self.pixels_per_unit as f32,
            self.tile_height_px as f32 / self.pixels_per_unit as f32,
        )
    }

    /// Texture-space offset of the glyph with the provided character code.
    ///
    /// The atlas stores glyphs top to bottom while texture space grows upwards,
    /// so the vertical offset is measured from the top edge of the glyph and
    /// flipped.
    #[must_use]
    pub fn glyph_uv(&self, code: u8) -> Vec2 {
        let Coord { x: column, y: row } = index_to_coord(code as usize, self.glyphs_per_row.max(1));
        let tile = self.tile_uv_size();
        let offset = Vec2::new(
            self.origin_offset_px as f32 / self.atlas_width_px as f32,
            (self.origin_offset_px + self.tile_height_px) as f32 / self.atlas_height_px as f32,
        );

        Vec2::new(
            offset.x + tile.x * column as f32,
            1.0 - (offset.y + tile.y * row as f32),
        )
    }
}

impl Default for AtlasMetrics {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Lookup from character code to the texture region a quad samples.
///
/// Each entry is `(tile_u_width, tile_v_height, u_offset, v_offset)`, the
/// scale/offset pair renderers feed into their texture transform.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphTable {
    entries: [Vec4; GLYPH_COUNT],
}

impl GlyphTable {
    /// Builds the table for the provided atlas.
    pub fn new(metrics: &AtlasMetrics) -> Result<Self, RenderingError> {
        metrics.validate()?;
        let tile = metrics.tile_uv_size();
        let mut entries = [Vec4::ZERO; GLYPH_COUNT];
        for (code, entry) in (0..=u8::MAX).zip(entries.iter_mut()) {
            let uv = metrics.glyph_uv(code);
            *entry = Vec4::new(tile.x, tile.y, uv.x, uv.y);
        }
        Ok(Self { entries })
    }

    /// Builds the table for [`AtlasMetrics::CLASSIC`].
    pub fn classic() -> Result<Self, RenderingError> {
        Self::new(&AtlasMetrics::CLASSIC)
    }

    /// Texture region for the provided glyph.
    #[must_use]
    pub fn region(&self, glyph: Glyph) -> Vec4 {
        self.entries[glyph.code() as usize]
    }

    /// All entries indexed by character code.
    #[must_use]
    pub fn entries(&self) -> &[Vec4; GLYPH_COUNT] {
        &self.entries
    }
}

/// World-space placement of the quad grid that displays a viewport.
///
/// The grid is centred on the origin with row zero at the top, matching the
/// row-major order of [`ViewportBuffer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadLayout {
    columns: u32,
    rows: u32,
    tile_size: Vec2,
}

impl QuadLayout {
    /// Lays out `columns` x `rows` quads sized by the atlas metrics.
    pub fn new(columns: u32, rows: u32, metrics: &AtlasMetrics) -> Result<Self, RenderingError> {
        metrics.validate()?;
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyLayout { columns, rows });
        }
        Ok(Self {
            columns,
            rows,
            tile_size: metrics.tile_world_size(),
        })
    }

    /// Default 80x25 layout for the classic atlas.
    pub fn classic() -> Result<Self, RenderingError> {
        Self::new(
            DEFAULT_GRID_WIDTH,
            DEFAULT_GRID_HEIGHT,
            &AtlasMetrics::CLASSIC,
        )
    }

    /// Number of quad columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of quad rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Size of a single quad in world units.
    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Size of the whole viewport in world units.
    #[must_use]
    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(
            self.tile_size.x * self.columns as f32,
            self.tile_size.y * self.rows as f32,
        )
    }

    /// Width divided by height of the viewport.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.viewport_size();
        size.x / size.y
    }

    /// World-space centre of the quad displaying `coord`.
    ///
    /// Returns `None` when the coordinate lies outside the layout.
    #[must_use]
    pub fn tile_centre(&self, coord: Coord) -> Option<Vec2> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        if coord.x as u32 >= self.columns || coord.y as u32 >= self.rows {
            return None;
        }

        let viewport = self.viewport_size();
        let top_left = Vec2::new(
            -(viewport.x - self.tile_size.x) / 2.0,
            (viewport.y - self.tile_size.y) / 2.0,
        );
        Some(Vec2::new(
            top_left.x + coord.x as f32 * self.tile_size.x,
            top_left.y - coord.y as f32 * self.tile_size.y,
        ))
    }

    /// Quad centres for every cell in row-major order.
    pub fn tile_centres(&self) -> impl Iterator<Item = Vec2> + '_ {
        let count = self.columns as usize * self.rows as usize;
        (0..count).filter_map(move |index| self.tile_centre(index_to_coord(index, self.columns)))
    }

    /// Orthographic camera half-height that keeps the viewport on screen.
    ///
    /// Screens wider than the viewport fit its height exactly. Narrower
    /// screens shrink the half-height by the ratio of the two aspect ratios.
    pub fn fit_orthographic_size(
        &self,
        screen_width: u32,
        screen_height: u32,
    ) -> Result<f32, RenderingError> {
        if screen_width == 0 || screen_height == 0 {
            return Err(RenderingError::EmptyScreen {
                width: screen_width,
                height: screen_height,
            });
        }

        let screen_ratio = screen_width as f32 / screen_height as f32;
        let viewport_ratio = self.aspect_ratio();
        let half_height = self.viewport_size().y / 2.0;
        if screen_ratio >= viewport_ratio {
            Ok(half_height)
        } else {
            Ok(half_height * (viewport_ratio / screen_ratio))
        }
    }
}

/// Snapshot handed to backends each frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Turn number the viewport was projected at.
    pub turn: u64,
    /// Glyphs to display, row-major.
    pub viewport: ViewportBuffer,
}

impl Frame {
    /// Creates a new frame.
    #[must_use]
    pub fn new(turn: u64, viewport: ViewportBuffer) -> Self {
        Self { turn, viewport }
    }

    /// Texture region for every viewport cell in row-major order.
    pub fn regions<'a>(&'a self, table: &'a GlyphTable) -> impl Iterator<Item = Vec4> + 'a {
        self.viewport
            .glyphs()
            .iter()
            .map(move |glyph| table.region(*glyph))
    }
}

/// Tells the backend whether to keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the frame and keep running.
    Continue,
    /// Present the frame and stop.
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub window_title: String,
    /// Placement of the quad grid.
    pub layout: QuadLayout,
    /// Glyph-to-texture lookup for the atlas.
    pub glyphs: GlyphTable,
    /// Frame displayed before the first update.
    pub frame: Frame,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        layout: QuadLayout,
        glyphs: GlyphTable,
        frame: Frame,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            layout,
            glyphs,
            frame,
        }
    }
}

/// Rendering backend capable of presenting ASCII Rogue frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the simulated frame delta
    /// and refreshes the frame in place before it is presented.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Frame) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// Glyph cells must have a positive size.
    #[error("atlas tiles must be non-empty (received {width}x{height})")]
    EmptyTile {
        /// Provided tile width in pixels.
        width: u32,
        /// Provided tile height in pixels.
        height: u32,
    },
    /// The atlas cannot be smaller than a single glyph.
    #[error("atlas of {width}x{height} pixels cannot hold a single tile")]
    AtlasTooSmall {
        /// Provided atlas width in pixels.
        width: u32,
        /// Provided atlas height in pixels.
        height: u32,
    },
    /// Pixels per unit must be positive to size quads.
    #[error("pixels_per_unit must be positive")]
    ZeroPixelsPerUnit,
    /// At least one glyph must fit on an atlas row.
    #[error("glyphs_per_row must be positive")]
    ZeroGlyphsPerRow,
    /// Layouts need at least one quad.
    #[error("layout must have at least one column and row (received {columns}x{rows})")]
    EmptyLayout {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Screens with no area cannot be fitted.
    #[error("screen must be non-empty (received {width}x{height})")]
    EmptyScreen {
        /// Provided screen width in pixels.
        width: u32,
        /// Provided screen height in pixels.
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-4
    }

    #[test]
    fn glyph_table_matches_atlas_formula() {
        let table = GlyphTable::classic().expect("classic atlas is valid");

        let hash = table.region(Glyph::WALL);
        // '#' is code 35: column 3, row 1.
        assert!(approx(hash.x, 9.0 / 304.0));
        assert!(approx(hash.y, 16.0 / 144.0));
        assert!(approx(hash.z, 8.0 / 304.0 + 3.0 * 9.0 / 304.0));
        assert!(approx(hash.w, 1.0 - (24.0 / 144.0 + 16.0 / 144.0)));

        let nul = table.entries()[0];
        assert!(approx(nul.z, 8.0 / 304.0));
        assert!(approx(nul.w, 1.0 - 24.0 / 144.0));
    }

    #[test]
    fn glyph_table_is_stable_across_builds() {
        let first = GlyphTable::classic().expect("valid");
        let second = GlyphTable::new(&AtlasMetrics::default()).expect("valid");

        assert_eq!(first, second);
    }

    #[test]
    fn glyph_table_rejects_degenerate_metrics() {
        let metrics = AtlasMetrics {
            glyphs_per_row: 0,
            ..AtlasMetrics::CLASSIC
        };
        assert_eq!(
            GlyphTable::new(&metrics),
            Err(RenderingError::ZeroGlyphsPerRow)
        );

        let metrics = AtlasMetrics {
            tile_height_px: 0,
            ..AtlasMetrics::CLASSIC
        };
        assert!(matches!(
            GlyphTable::new(&metrics),
            Err(RenderingError::EmptyTile { .. })
        ));
    }

    #[test]
    fn layout_is_centred_on_origin() {
        let layout = QuadLayout::classic().expect("valid");
        let size = layout.viewport_size();
        assert!(approx(size.x, 7.2));
        assert!(approx(size.y, 4.0));

        let first = layout.tile_centre(Coord::new(0, 0)).expect("in layout");
        let last = layout.tile_centre(Coord::new(79, 24)).expect("in layout");
        assert!(approx(first.x, -last.x));
        assert!(approx(first.y, -last.y));
        assert!(approx(first.x, -(7.2 - 0.09) / 2.0));
        assert!(approx(first.y, (4.0 - 0.16) / 2.0));

        assert_eq!(layout.tile_centre(Coord::new(80, 0)), None);
        assert_eq!(layout.tile_centre(Coord::new(0, -1)), None);
        assert_eq!(layout.tile_centres().count(), 2000);
    }

    #[test]
    fn orthographic_fit_depends_on_screen_aspect() {
        let layout = QuadLayout::classic().expect("valid");

        let wide = layout.fit_orthographic_size(1920, 600).expect("valid screen");
        assert!(approx(wide, 2.0));

        // Square screen: viewport ratio 1.8, so the half-height grows by 1.8.
        let square = layout.fit_orthographic_size(800, 800).expect("valid screen");
        assert!(approx(square, 2.0 * 1.8));

        assert!(matches!(
            layout.fit_orthographic_size(0, 600),
            Err(RenderingError::EmptyScreen { .. })
        ));
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert_eq!(
            QuadLayout::new(0, 25, &AtlasMetrics::CLASSIC),
            Err(RenderingError::EmptyLayout {
                columns: 0,
                rows: 25
            })
        );
    }

    #[test]
    fn frame_regions_follow_viewport_glyphs() {
        let table = GlyphTable::classic().expect("valid");
        let mut viewport = ViewportBuffer::new(2, 1);
        viewport.set_index(1, Glyph::CREATURE);
        let frame = Frame::new(3, viewport);

        let regions: Vec<Vec4> = frame.regions(&table).collect();

        assert_eq!(
            regions,
            vec![table.region(Glyph::FLOOR), table.region(Glyph::CREATURE)]
        );
    }
}
