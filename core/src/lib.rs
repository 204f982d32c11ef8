pub mod action;
pub mod game;
pub mod grid;
pub mod shape;
pub mod slots;
pub mod state;

pub use action::{DragSession, Placement, PointerId, Release, Resolver, ResolverState};
pub use game::{assign_tabs, scramble_seed, SolvedLatch, PUZZLE_SEED, SNAP_THRESHOLD_DEFAULT};
pub use grid::{display_size, grid_label, GridError, GridSize, DEFAULT_GRID_SIZE};
pub use shape::{build_piece_path, PiecePath, ShapeStyle, TAB_RATIO_DEFAULT};
pub use slots::SlotBoard;
pub use state::{Piece, PieceId, PieceSet, PlayMode, PuzzleParams, SourceRect};
