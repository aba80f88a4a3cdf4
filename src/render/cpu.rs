use vello_cpu::kurbo::{Affine, Rect};
use vello_cpu::peniko::Color;

use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::render::FrameRGBA;
use crate::task::BlockColor;
use crate::task::layout::Layout;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const GRID_LINE: [u8; 3] = [51, 51, 51];
const OUTLINE: [u8; 3] = [0, 0, 0];
const LINE_WIDTH_PX: f64 = 1.0;
const OUTLINE_WIDTH_PX: f64 = 2.0;
/// Inset of a block from its cell edges, as a fraction of the cell size.
const BLOCK_PADDING: f64 = 0.08;

/// CPU rasterizer for grid frames.
///
/// Keeps one render context and reuses it while the frame size stays the same. Not `Sync`;
/// parallel batches give each worker its own renderer.
pub struct GridRenderer {
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
}

impl GridRenderer {
    pub fn new(width: u32, height: u32) -> GridShiftResult<Self> {
        let to_u16 = |v: u32, what: &str| -> GridShiftResult<u16> {
            let v: u16 = v
                .try_into()
                .map_err(|_| GridShiftError::render(format!("{what} {v} exceeds {}", u16::MAX)))?;
            if v == 0 {
                return Err(GridShiftError::render(format!("{what} must be non-zero")));
            }
            Ok(v)
        };
        Ok(Self {
            width: to_u16(width, "frame width")?,
            height: to_u16(height, "frame height")?,
            ctx: None,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Render the blocks of `layout` at their integer cells.
    pub fn render_layout(&mut self, layout: &Layout, color: BlockColor) -> GridShiftResult<FrameRGBA> {
        let blocks: Vec<(f64, f64)> = layout
            .cells()
            .iter()
            .map(|c| (f64::from(c.x), f64::from(c.y)))
            .collect();
        self.render(layout.grid().size(), &blocks, color)
    }

    /// Render blocks at `(x, y)` positions in grid units; fractional positions are allowed and
    /// used for in-between video frames.
    #[tracing::instrument(level = "trace", skip(self, blocks))]
    pub fn render(
        &mut self,
        grid_size: u32,
        blocks: &[(f64, f64)],
        color: BlockColor,
    ) -> GridShiftResult<FrameRGBA> {
        if grid_size == 0 {
            return Err(GridShiftError::render("grid size must be non-zero"));
        }

        let (width, height) = (self.width, self.height);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_transform(Affine::IDENTITY);

        let w = f64::from(width);
        let h = f64::from(height);
        let n = f64::from(grid_size);
        let cell_w = w / n;
        let cell_h = h / n;

        set_solid(&mut ctx, BACKGROUND);
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));

        set_solid(&mut ctx, GRID_LINE);
        for i in 0..=grid_size {
            let x = (f64::from(i) * cell_w).floor().min(w - LINE_WIDTH_PX);
            ctx.fill_rect(&Rect::new(x, 0.0, x + LINE_WIDTH_PX, h));
            let y = (f64::from(i) * cell_h).floor().min(h - LINE_WIDTH_PX);
            ctx.fill_rect(&Rect::new(0.0, y, w, y + LINE_WIDTH_PX));
        }

        let [r, g, b] = color.rgb();
        for &(bx, by) in blocks {
            let x0 = (bx * cell_w + cell_w * BLOCK_PADDING).floor();
            let y0 = (by * cell_h + cell_h * BLOCK_PADDING).floor();
            let x1 = (bx * cell_w + cell_w * (1.0 - BLOCK_PADDING)).floor();
            let y1 = (by * cell_h + cell_h * (1.0 - BLOCK_PADDING)).floor();

            set_solid(&mut ctx, OUTLINE);
            ctx.fill_rect(&Rect::new(x0, y0, x1, y1));

            let inner = Rect::new(
                x0 + OUTLINE_WIDTH_PX,
                y0 + OUTLINE_WIDTH_PX,
                x1 - OUTLINE_WIDTH_PX,
                y1 - OUTLINE_WIDTH_PX,
            );
            if inner.width() > 0.0 && inner.height() > 0.0 {
                ctx.set_paint(Color::from_rgba8(r, g, b, 255));
                ctx.fill_rect(&inner);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn set_solid(ctx: &mut vello_cpu::RenderContext, [r, g, b]: [u8; 3]) {
    ctx.set_paint(Color::from_rgba8(r, g, b, 255));
}
