use image::{Rgba, RgbaImage};
use kirinuki_core::shape::fmt_f32;
use kirinuki_core::{Piece, PieceSet, SlotBoard};

const OUTLINE_COLOR_DEFAULT: Rgba<u8> = Rgba([32, 32, 32, 255]);
const OUTLINE_COLOR_SOLVED: Rgba<u8> = Rgba([42, 168, 74, 255]);
const BOARD_LINE_COLOR: Rgba<u8> = Rgba([200, 200, 200, 255]);
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const SVG_STROKE: &str = "fill=\"none\" stroke=\"#202020\"";

/// Coverage mask of one piece outline, anchored so that
/// `origin` is the local coordinate of the mask's top-left pixel.
pub struct PieceMask {
    pub origin: (i32, i32),
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<bool>,
}

impl PieceMask {
    pub fn covers(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.coverage[(y * self.width + x) as usize]
    }
}

/// Rasterizes the outline by sampling pixel centres against the same polygon
/// the hit test uses.
pub fn build_piece_mask(piece: &Piece) -> PieceMask {
    let path = &piece.path;
    let origin = (path.min.0.floor() as i32, path.min.1.floor() as i32);
    let width = (path.max.0.ceil() as i32 - origin.0).max(0) as u32;
    let height = (path.max.1.ceil() as i32 - origin.1).max(0) as u32;
    let mut coverage = vec![false; (width as usize) * (height as usize)];
    for y in 0..height {
        for x in 0..width {
            let local_x = origin.0 as f32 + x as f32 + 0.5;
            let local_y = origin.1 as f32 + y as f32 + 0.5;
            coverage[(y * width + x) as usize] = path.contains(local_x, local_y);
        }
    }
    PieceMask {
        origin,
        width,
        height,
        coverage,
    }
}

/// Slot grid lines, drawn under the pieces.
pub fn draw_board(target: &mut RgbaImage, board: &SlotBoard) {
    let board_width = board.cols as f32 * board.cell_width;
    let board_height = board.rows as f32 * board.cell_height;
    for col in 0..=board.cols {
        let x = (col as f32 * board.cell_width).round();
        draw_line(target, (x, 0.0), (x, board_height), BOARD_LINE_COLOR);
    }
    for row in 0..=board.rows {
        let y = (row as f32 * board.cell_height).round();
        draw_line(target, (0.0, y), (board_width, y), BOARD_LINE_COLOR);
    }
}

/// Draws every piece back to front, clipped to its outline and sampled from
/// `source` at the piece's home rectangle.
pub fn draw_pieces(target: &mut RgbaImage, source: &RgbaImage, set: &PieceSet, solved: bool) {
    let outline = if solved {
        OUTLINE_COLOR_SOLVED
    } else {
        OUTLINE_COLOR_DEFAULT
    };
    for id in set.z_order.iter().copied() {
        let Some(piece) = set.piece(id) else {
            continue;
        };
        draw_piece(target, source, piece);
        if !solved {
            draw_outline(target, piece, outline);
        }
    }
    if solved {
        for piece in &set.pieces {
            draw_outline(target, piece, outline);
        }
    }
}

/// Piece outlines as an SVG document, one path per piece in paint order.
/// The canvas grows to include pieces parked outside the playfield.
pub fn outlines_svg(set: &PieceSet) -> String {
    let (width, height) = set.pieces.iter().fold(
        (set.field_width, set.field_height),
        |(width, height), piece| {
            (
                width.max(piece.position.0 + piece.path.max.0),
                height.max(piece.position.1 + piece.path.max.1),
            )
        },
    );
    let mut out = format!(
        "<svg xmlns=\"{ns}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        ns = SVG_NS,
        w = fmt_f32(width.ceil()),
        h = fmt_f32(height.ceil()),
    );
    for id in set.z_order.iter().copied() {
        let Some(piece) = set.piece(id) else {
            continue;
        };
        out.push_str(&format!(
            "  <path data-piece=\"{}\" transform=\"translate({} {})\" d=\"{}\" {}/>\n",
            piece.id,
            fmt_f32(piece.position.0),
            fmt_f32(piece.position.1),
            piece.path.to_svg(),
            SVG_STROKE,
        ));
    }
    out.push_str("</svg>\n");
    out
}

fn draw_piece(target: &mut RgbaImage, source: &RgbaImage, piece: &Piece) {
    let mask = build_piece_mask(piece);
    let (target_w, target_h) = target.dimensions();
    let (source_w, source_h) = source.dimensions();
    if source_w == 0 || source_h == 0 {
        return;
    }
    let base_x = piece.position.0.round() as i64 + mask.origin.0 as i64;
    let base_y = piece.position.1.round() as i64 + mask.origin.1 as i64;
    let sample_x = piece.source.x.round() as i64 + mask.origin.0 as i64;
    let sample_y = piece.source.y.round() as i64 + mask.origin.1 as i64;
    for y in 0..mask.height {
        let ty = base_y + y as i64;
        if ty < 0 || ty >= target_h as i64 {
            continue;
        }
        for x in 0..mask.width {
            let tx = base_x + x as i64;
            if tx < 0 || tx >= target_w as i64 || !mask.covers(x, y) {
                continue;
            }
            let sx = (sample_x + x as i64).clamp(0, source_w as i64 - 1) as u32;
            let sy = (sample_y + y as i64).clamp(0, source_h as i64 - 1) as u32;
            target.put_pixel(tx as u32, ty as u32, *source.get_pixel(sx, sy));
        }
    }
}

fn draw_outline(target: &mut RgbaImage, piece: &Piece, color: Rgba<u8>) {
    let (px, py) = piece.position;
    for pair in piece.path.points.windows(2) {
        let from = (pair[0].0 + px, pair[0].1 + py);
        let to = (pair[1].0 + px, pair[1].1 + py);
        draw_line(target, from, to, color);
    }
}

fn draw_line(target: &mut RgbaImage, from: (f32, f32), to: (f32, f32), color: Rgba<u8>) {
    let (width, height) = target.dimensions();
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (from.0 + (to.0 - from.0) * t).floor();
        let y = (from.1 + (to.1 - from.1) * t).floor();
        if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
            continue;
        }
        target.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirinuki_core::{GridSize, PuzzleParams, ShapeStyle, TAB_RATIO_DEFAULT};

    fn quadrant_source() -> RgbaImage {
        RgbaImage::from_fn(100, 100, |x, y| match (x < 50, y < 50) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 0, 255]),
        })
    }

    fn solved_set(shape: ShapeStyle) -> PieceSet {
        let mut set = PieceSet::create(&PuzzleParams {
            field_width: 100.0,
            field_height: 100.0,
            grid: GridSize::new(2).expect("grid"),
            seed: 9,
            shape,
            tab_ratio: TAB_RATIO_DEFAULT,
        })
        .expect("set");
        set.place_all();
        set
    }

    #[test]
    fn mask_matches_hit_test() {
        let set = solved_set(ShapeStyle::Tabbed);
        let piece = &set.pieces[0];
        let mask = build_piece_mask(piece);
        for y in 0..mask.height {
            for x in 0..mask.width {
                let lx = mask.origin.0 as f32 + x as f32 + 0.5;
                let ly = mask.origin.1 as f32 + y as f32 + 0.5;
                assert_eq!(mask.covers(x, y), piece.path.contains(lx, ly));
            }
        }
    }

    #[test]
    fn solved_tabbed_board_reproduces_the_source_inside_pieces() {
        let source = quadrant_source();
        let set = solved_set(ShapeStyle::Tabbed);
        let mut target = RgbaImage::new(100, 100);
        draw_pieces(&mut target, &source, &set, true);
        for (x, y) in [(10, 10), (80, 20), (25, 75), (75, 75), (48, 25)] {
            assert_eq!(target.get_pixel(x, y), source.get_pixel(x, y), "pixel {x},{y}");
        }
    }

    #[test]
    fn svg_lists_pieces_in_paint_order() {
        let mut set = solved_set(ShapeStyle::Rectangular);
        set.z_order = vec![2, 0, 3, 1];
        let svg = outlines_svg(&set);
        let order: Vec<usize> = [2, 0, 3, 1]
            .iter()
            .map(|id| svg.find(&format!("data-piece=\"{id}\"")).expect("piece path"))
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(svg.contains("translate(50.000 50.000) d=\"M 0.000 0.000 L 50.000 0.000"));
        assert!(svg.contains("viewBox=\"0 0 100.000 100.000\""));
    }

    #[test]
    fn svg_canvas_covers_parked_pieces() {
        let mut set = solved_set(ShapeStyle::Rectangular);
        set.pieces[1].position = (180.0, 20.0);
        let svg = outlines_svg(&set);
        assert!(svg.contains("viewBox=\"0 0 230.000 100.000\""));
    }

    #[test]
    fn moved_piece_carries_its_pixels() {
        let source = quadrant_source();
        let mut set = solved_set(ShapeStyle::Rectangular);
        set.pieces[3].position = (0.0, 0.0);
        set.bring_to_front(3);
        let mut target = RgbaImage::new(100, 100);
        draw_pieces(&mut target, &source, &set, false);
        assert_eq!(*target.get_pixel(20, 20), Rgba([255, 255, 0, 255]));
    }
}
