use std::path::Path;

use anyhow::Context as _;

use crate::{
    assets::fonts::{LineLayout, TextBrushRgba8, Typeface},
    foundation::core::{Canvas, Rgba8},
    foundation::error::{StillcutError, StillcutResult},
    layout::wrap::WrappedText,
};

/// Vertical distance between consecutive line tops.
pub const LINE_HEIGHT_PX: f32 = 60.0;

/// Colors and spacing of the composed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStyle {
    pub background: Rgba8,
    pub foreground: Rgba8,
    pub line_height_px: f32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(30, 30, 30),
            foreground: Rgba8::WHITE,
            line_height_px: LINE_HEIGHT_PX,
        }
    }
}

/// A composed still frame as opaque RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Write the frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> StillcutResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Draw `text` onto a `canvas`-sized frame.
///
/// At most `max_lines` lines are drawn. The line block is centered vertically and every line is
/// centered horizontally on its own measured width.
pub fn compose_frame(
    text: &WrappedText,
    canvas: Canvas,
    max_lines: usize,
    style: &FrameStyle,
    face: &mut Typeface,
) -> StillcutResult<Frame> {
    let (width_u16, height_u16) = raster_dims(canvas)?;

    let lines = &text.lines()[..text.len().min(max_lines)];
    let block_h = (lines.len() as f32 * style.line_height_px) as i64;
    let mut y = (i64::from(canvas.height) - block_h).div_euclid(2) as f64;

    let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
    let bg = style.background;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(canvas.width),
        f64::from(canvas.height),
    ));

    let fg = style.foreground;
    let brush = TextBrushRgba8 {
        r: fg.r,
        g: fg.g,
        b: fg.b,
        a: fg.a,
    };
    for line in lines {
        let layout = face.layout_line(line, brush);
        let x = ((canvas.width as f32 - layout.width()) / 2.0).floor() as f64;
        draw_line(&mut ctx, &layout, x, y, fg);
        y += f64::from(style.line_height_px);
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(Frame {
        width: canvas.width,
        height: canvas.height,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

fn raster_dims(canvas: Canvas) -> StillcutResult<(u16, u16)> {
    let fits = |v: u32| v > 0 && v <= u32::from(u16::MAX);
    if !fits(canvas.width) || !fits(canvas.height) {
        return Err(StillcutError::missing_dependency(format!(
            "raster backend cannot allocate a {}x{} canvas",
            canvas.width, canvas.height
        )));
    }
    Ok((canvas.width as u16, canvas.height as u16))
}

fn draw_line(ctx: &mut vello_cpu::RenderContext, layout: &LineLayout, x: f64, y: f64, fg: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    match layout {
        LineLayout::Outline { layout, font } => {
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    // Positioned glyphs carry the run offset and the baseline.
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        LineLayout::Block { boxes, .. } => {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(fg.r, fg.g, fg.b, fg.a));
            for b in boxes {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    f64::from(b.x0),
                    f64::from(b.y0),
                    f64::from(b.x1),
                    f64::from(b.y1),
                ));
            }
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
