use image::imageops::FilterType;
use image::RgbaImage;
use kirinuki_core::game::splitmix32;
use kirinuki_core::{
    display_size, scramble_seed, GridError, GridSize, PieceId, PieceSet, Placement, PlayMode,
    PointerId, PuzzleParams, Release, SlotBoard, SolvedLatch, PUZZLE_SEED,
};
use thiserror::Error;

use crate::config::Settings;
use crate::input::PointerRouter;
use crate::renderer::{draw_board, draw_pieces};
use crate::runtime::{AudioCue, GameEvent, SessionHooks};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// One puzzle in play: the scaled source image, its pieces, the slot board
/// when playing in slot mode, and per-pointer drag state.
pub struct GameSession {
    settings: Settings,
    hooks: SessionHooks,
    source: Option<RgbaImage>,
    pieces: Option<PieceSet>,
    board: Option<SlotBoard>,
    router: PointerRouter,
    latch: SolvedLatch,
    muted: bool,
    scramble_nonce: u32,
}

impl GameSession {
    pub fn new(settings: Settings) -> Self {
        let muted = settings.muted;
        Self {
            settings,
            hooks: SessionHooks::empty(),
            source: None,
            pieces: None,
            board: None,
            router: PointerRouter::new(),
            latch: SolvedLatch::new(),
            muted,
            scramble_nonce: 0,
        }
    }

    pub fn with_hooks(settings: Settings, hooks: SessionHooks) -> Self {
        let mut session = Self::new(settings);
        session.hooks = hooks;
        session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> PlayMode {
        self.settings.mode
    }

    pub fn pieces(&self) -> Option<&PieceSet> {
        self.pieces.as_ref()
    }

    pub fn board(&self) -> Option<&SlotBoard> {
        self.board.as_ref()
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    pub fn playfield_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(RgbaImage::dimensions)
    }

    /// Area a renderer needs to show everything: the playfield, plus the
    /// tray beside it in slot mode.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        let (width, height) = self.playfield_size()?;
        match self.board.as_ref() {
            Some(board) => {
                let (tray_x, _) = board.tray_origin();
                Some(((tray_x + width as f32).ceil() as u32, height))
            }
            None => Some((width, height)),
        }
    }

    pub fn scramble_nonce(&self) -> u32 {
        self.scramble_nonce
    }

    pub fn solved(&self) -> bool {
        self.latch.fired()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        tracing::debug!(muted = self.muted, "mute toggled");
        self.muted
    }

    /// Builds a fresh puzzle from `image` cut into an `n` x `n` grid. Any
    /// previous puzzle is discarded.
    pub fn start(&mut self, image: &RgbaImage, n: u32) -> Result<&PieceSet, SessionError> {
        let grid = GridSize::new(n)?;
        let (width, height) = display_size(
            image.width(),
            image.height(),
            self.settings.max_display_width,
        )?;
        let source = if image.dimensions() == (width, height) {
            image.clone()
        } else {
            image::imageops::resize(image, width, height, FilterType::Triangle)
        };

        let nonce = match self.settings.seed {
            Some(seed) => seed,
            None => time_nonce(self.scramble_nonce),
        };
        let seed = scramble_seed(PUZZLE_SEED, nonce, grid.cols as usize, grid.rows as usize);
        let mut set = PieceSet::create(&PuzzleParams {
            field_width: width as f32,
            field_height: height as f32,
            grid,
            seed,
            shape: self.settings.shape,
            tab_ratio: self.settings.tab_ratio,
        })?;

        self.scramble_nonce = nonce;
        self.board = match self.settings.mode {
            PlayMode::Slots => {
                // the scramble lands in the tray so the board starts empty
                let mut board = SlotBoard::new(grid, set.piece_width, set.piece_height);
                set.offset_layout(board.tray_origin());
                for piece in &set.pieces {
                    board.set_tray_position(piece.id, piece.position);
                }
                Some(board)
            }
            PlayMode::Free => None,
        };
        self.router.clear();
        self.latch.reset();
        self.source = Some(source);
        tracing::info!(
            cols = grid.cols,
            rows = grid.rows,
            width,
            height,
            nonce,
            mode = ?self.settings.mode,
            "puzzle started"
        );
        self.cue(AudioCue::Music);
        Ok(&*self.pieces.insert(set))
    }

    pub fn pointer_down(&mut self, pointer: PointerId, point: (f32, f32)) -> Option<PieceId> {
        let set = self.pieces.as_mut()?;
        let piece_id = self
            .router
            .down(pointer, set, self.settings.mode, point.0, point.1)?;
        tracing::debug!(pointer = pointer.0, piece_id, "picked");
        self.emit(GameEvent::Picked { pointer, piece_id });
        self.cue(AudioCue::Pickup);
        Some(piece_id)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, point: (f32, f32)) -> Option<PieceId> {
        let set = self.pieces.as_mut()?;
        self.router.move_to(pointer, set, point.0, point.1)
    }

    pub fn pointer_up(&mut self, pointer: PointerId, point: (f32, f32)) -> Option<Release> {
        let set = self.pieces.as_mut()?;
        let placement = match (self.settings.mode, self.board.as_mut()) {
            (PlayMode::Slots, Some(board)) => Placement::Slots(board),
            _ => Placement::Snap {
                threshold: self.settings.snap_threshold_px,
            },
        };
        let release = self.router.up(pointer, set, placement, point.0, point.1)?;
        tracing::debug!(pointer = pointer.0, ?release, "released");

        match release {
            Release::Snapped { piece_id } => {
                self.emit(GameEvent::Snapped { pointer, piece_id });
            }
            Release::Dropped { piece_id } | Release::Tray { piece_id } => {
                self.emit(GameEvent::Dropped { pointer, piece_id });
            }
            Release::Slotted {
                piece_id,
                slot,
                evicted,
            } => {
                self.emit(GameEvent::Slotted {
                    pointer,
                    piece_id,
                    slot,
                });
                if let Some(evicted) = evicted {
                    self.emit(GameEvent::Evicted {
                        piece_id: evicted,
                        slot,
                    });
                }
            }
        }
        self.cue(AudioCue::Drop);
        self.check_solved();
        Some(release)
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<PieceId> {
        self.router.cancel(pointer)
    }

    /// Current win evaluation; pure read.
    pub fn is_solved(&self) -> bool {
        match (self.settings.mode, self.board.as_ref(), self.pieces.as_ref()) {
            (PlayMode::Slots, Some(board), Some(_)) => board.is_solved(),
            (PlayMode::Free, _, Some(set)) => set.is_solved(),
            _ => false,
        }
    }

    /// Moves every piece home, then reports the win like a manual solve.
    pub fn solve(&mut self) {
        let Some(set) = self.pieces.as_mut() else {
            return;
        };
        self.router.clear();
        set.place_all();
        if let Some(board) = self.board.as_mut() {
            board.fill_solved();
        }
        tracing::info!("puzzle auto-solved");
        self.check_solved();
    }

    /// Discards all puzzle, drag and solved state. Idempotent.
    pub fn reset(&mut self) {
        if self.pieces.is_some() {
            tracing::info!("puzzle reset");
        }
        self.source = None;
        self.pieces = None;
        self.board = None;
        self.router.clear();
        self.latch.reset();
    }

    /// Draws the board and pieces onto `target`; reads state only.
    pub fn render(&self, target: &mut RgbaImage) {
        let (Some(set), Some(source)) = (self.pieces.as_ref(), self.source.as_ref()) else {
            return;
        };
        if let Some(board) = self.board.as_ref() {
            draw_board(target, board);
        }
        draw_pieces(target, source, set, self.latch.fired());
    }

    fn check_solved(&mut self) {
        let solved = self.is_solved();
        if self.latch.update(solved) {
            tracing::info!("puzzle solved");
            self.emit(GameEvent::Solved);
            self.cue(AudioCue::Win);
        }
    }

    fn emit(&self, event: GameEvent) {
        (self.hooks.on_event)(event);
    }

    fn cue(&self, cue: AudioCue) {
        if !self.muted {
            (self.hooks.on_cue)(cue);
        }
    }
}

pub fn time_nonce(previous: u32) -> u32 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u32)
        .unwrap_or(0);
    splitmix32(now ^ previous.wrapping_add(0x9E37_79B9))
}
