use serde::{Deserialize, Serialize};

use crate::game::{assign_tabs, at_target, scramble_layout};
use crate::grid::{GridError, GridSize};
use crate::shape::{build_piece_path, PiecePath, ShapeStyle};

pub type PieceId = usize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Pieces move anywhere and snap onto their home position.
    #[default]
    Free,
    /// Pieces are dropped into grid slots.
    Slots,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub id: PieceId,
    pub col: u32,
    pub row: u32,
    pub width: f32,
    pub height: f32,
    pub source: SourceRect,
    pub target: (f32, f32),
    pub position: (f32, f32),
    pub tabs: [i8; 4],
    pub path: PiecePath,
    pub placed: bool,
}

impl Piece {
    /// Hit test in playfield coordinates against the outline at the current position.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.path.contains(x - self.position.0, y - self.position.1)
    }

    pub fn is_home(&self) -> bool {
        at_target(self.position, self.target)
    }

    pub fn snap_home(&mut self) {
        self.position = self.target;
        self.placed = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleParams {
    pub field_width: f32,
    pub field_height: f32,
    pub grid: GridSize,
    pub seed: u32,
    pub shape: ShapeStyle,
    pub tab_ratio: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PieceSet {
    pub grid: GridSize,
    pub field_width: f32,
    pub field_height: f32,
    pub piece_width: f32,
    pub piece_height: f32,
    pub pieces: Vec<Piece>,
    /// Paint order, back to front.
    pub z_order: Vec<PieceId>,
}

impl PieceSet {
    pub fn create(params: &PuzzleParams) -> Result<Self, GridError> {
        let PuzzleParams {
            field_width,
            field_height,
            grid,
            seed,
            shape,
            tab_ratio,
        } = *params;
        if field_width < 1.0 || field_height < 1.0 {
            return Err(GridError::EmptyPlayfield {
                width: field_width.max(0.0) as u32,
                height: field_height.max(0.0) as u32,
            });
        }
        let cols = grid.cols as usize;
        let rows = grid.rows as usize;
        let total = grid.total();
        let (piece_width, piece_height) = grid.piece_size(field_width, field_height);
        let tabs = match shape {
            ShapeStyle::Tabbed => assign_tabs(cols, rows, seed),
            ShapeStyle::Rectangular => vec![[0; 4]; total],
        };
        let (positions, z_order) = scramble_layout(
            seed,
            total,
            piece_width,
            piece_height,
            field_width,
            field_height,
        );

        let mut pieces = Vec::with_capacity(total);
        for id in 0..total {
            let (col, row) = grid.cell_of(id);
            let x = col as f32 * piece_width;
            let y = row as f32 * piece_height;
            pieces.push(Piece {
                id,
                col,
                row,
                width: piece_width,
                height: piece_height,
                source: SourceRect {
                    x,
                    y,
                    width: piece_width,
                    height: piece_height,
                },
                target: (x, y),
                position: positions[id],
                tabs: tabs[id],
                path: build_piece_path(piece_width, piece_height, tabs[id], tab_ratio),
                placed: false,
            });
        }

        Ok(Self {
            grid,
            field_width,
            field_height,
            piece_width,
            piece_height,
            pieces,
            z_order,
        })
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    pub fn bring_to_front(&mut self, id: PieceId) {
        if let Some(index) = self.z_order.iter().position(|entry| *entry == id) {
            self.z_order.remove(index);
        }
        self.z_order.push(id);
    }

    pub fn top_id(&self) -> Option<PieceId> {
        self.z_order.last().copied()
    }

    /// Topmost piece under the point that `pickable` accepts.
    pub fn hit_test(&self, x: f32, y: f32, pickable: impl Fn(&Piece) -> bool) -> Option<PieceId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.pieces
                .get(*id)
                .is_some_and(|piece| pickable(piece) && piece.contains_point(x, y))
        })
    }

    pub fn place_all(&mut self) {
        for piece in &mut self.pieces {
            piece.snap_home();
        }
    }

    pub fn placed_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.placed).count()
    }

    /// Free-canvas win: every piece has been locked onto its home position.
    /// A piece merely passing over its target does not count.
    pub fn is_solved(&self) -> bool {
        !self.pieces.is_empty() && self.pieces.iter().all(|piece| piece.placed)
    }

    /// Shifts every piece by `offset`, keeping the scramble pattern.
    pub fn offset_layout(&mut self, offset: (f32, f32)) {
        for piece in &mut self.pieces {
            piece.position = (piece.position.0 + offset.0, piece.position.1 + offset.1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::TAB_RATIO_DEFAULT;

    fn params(n: u32) -> PuzzleParams {
        PuzzleParams {
            field_width: 300.0,
            field_height: 300.0,
            grid: GridSize::new(n).expect("grid"),
            seed: 42,
            shape: ShapeStyle::Tabbed,
            tab_ratio: TAB_RATIO_DEFAULT,
        }
    }

    #[test]
    fn create_lays_out_sources_and_targets() {
        let set = PieceSet::create(&params(3)).expect("set");
        assert_eq!(set.len(), 9);
        let piece = &set.pieces[5];
        assert_eq!((piece.col, piece.row), (2, 1));
        assert_eq!(piece.target, (200.0, 100.0));
        assert_eq!(piece.source.x, 200.0);
        assert_eq!(piece.source.y, 100.0);
        assert!(!piece.placed);
        let mut order = set.z_order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn rectangular_style_has_flat_edges() {
        let mut rect = params(4);
        rect.shape = ShapeStyle::Rectangular;
        let set = PieceSet::create(&rect).expect("set");
        assert!(set.pieces.iter().all(|piece| piece.tabs == [0; 4]));
    }

    #[test]
    fn empty_playfield_is_rejected() {
        let mut empty = params(3);
        empty.field_width = 0.0;
        assert!(matches!(
            PieceSet::create(&empty),
            Err(GridError::EmptyPlayfield { .. })
        ));
    }

    #[test]
    fn solved_once_every_piece_is_locked_home() {
        let mut set = PieceSet::create(&params(3)).expect("set");
        set.place_all();
        assert!(set.pieces.iter().all(Piece::is_home));
        assert!(set.is_solved());
        assert_eq!(set.placed_count(), 9);
    }

    #[test]
    fn hovering_over_target_is_not_solved() {
        let mut set = PieceSet::create(&params(2)).expect("set");
        for piece in set.pieces.iter_mut().take(3) {
            piece.snap_home();
        }
        set.pieces[3].position = set.pieces[3].target;
        assert!(set.pieces[3].is_home());
        assert!(!set.is_solved());
        set.pieces[3].snap_home();
        assert!(set.is_solved());
    }

    #[test]
    fn offset_layout_keeps_relative_positions() {
        let mut set = PieceSet::create(&params(2)).expect("set");
        let before: Vec<_> = set.pieces.iter().map(|piece| piece.position).collect();
        set.offset_layout((324.0, 0.0));
        for (piece, (x, y)) in set.pieces.iter().zip(before) {
            assert_eq!(piece.position, (x + 324.0, y));
        }
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut set = PieceSet::create(&params(2)).expect("set");
        for piece in &mut set.pieces {
            piece.position = (0.0, 0.0);
        }
        set.z_order = vec![0, 1, 2, 3];
        assert_eq!(set.hit_test(75.0, 75.0, |_| true), Some(3));
        set.bring_to_front(1);
        assert_eq!(set.z_order, vec![0, 2, 3, 1]);
        assert_eq!(set.hit_test(75.0, 75.0, |_| true), Some(1));
        assert_eq!(set.hit_test(75.0, 75.0, |piece| piece.id != 1), Some(3));
        assert_eq!(set.hit_test(-80.0, -80.0, |_| true), None);
    }
}
