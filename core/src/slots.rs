use crate::grid::GridSize;
use crate::state::PieceId;

/// Horizontal gap between the slot board and the tray beside it.
pub const TRAY_GAP_PX: f32 = 24.0;

/// One slot per grid cell, laid over the playfield from its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotBoard {
    pub cols: u32,
    pub rows: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    slots: Vec<Option<PieceId>>,
    slot_of: Vec<Option<usize>>,
    tray_positions: Vec<(f32, f32)>,
}

impl SlotBoard {
    pub fn new(grid: GridSize, cell_width: f32, cell_height: f32) -> Self {
        let total = grid.total();
        Self {
            cols: grid.cols,
            rows: grid.rows,
            cell_width,
            cell_height,
            slots: vec![None; total],
            slot_of: vec![None; total],
            tray_positions: vec![(0.0, 0.0); total],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn board_size(&self) -> (f32, f32) {
        (
            self.cols as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    /// Top-left corner of the tray area, to the right of the board.
    pub fn tray_origin(&self) -> (f32, f32) {
        (self.board_size().0 + TRAY_GAP_PX, 0.0)
    }

    pub fn slot_at(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 || self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return None;
        }
        let col = (x / self.cell_width) as u32;
        let row = (y / self.cell_height) as u32;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }

    pub fn slot_origin(&self, slot: usize) -> (f32, f32) {
        let cols = self.cols.max(1) as usize;
        (
            (slot % cols) as f32 * self.cell_width,
            (slot / cols) as f32 * self.cell_height,
        )
    }

    pub fn occupant(&self, slot: usize) -> Option<PieceId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, piece: PieceId) -> Option<usize> {
        self.slot_of.get(piece).copied().flatten()
    }

    pub fn tray_position(&self, piece: PieceId) -> Option<(f32, f32)> {
        self.tray_positions.get(piece).copied()
    }

    pub fn set_tray_position(&mut self, piece: PieceId, position: (f32, f32)) {
        if let Some(entry) = self.tray_positions.get_mut(piece) {
            *entry = position;
        }
    }

    /// Pieces not sitting in any slot.
    pub fn tray(&self) -> Vec<PieceId> {
        (0..self.slot_of.len())
            .filter(|piece| self.slot_of[*piece].is_none())
            .collect()
    }

    /// Puts `piece` into `slot`. A different occupant is evicted and returned.
    /// `from` is remembered as the piece's tray position when it enters the
    /// board from the tray.
    pub fn place(&mut self, piece: PieceId, slot: usize, from: (f32, f32)) -> Option<PieceId> {
        if slot >= self.slots.len() || piece >= self.slot_of.len() {
            return None;
        }
        match self.slot_of[piece] {
            Some(current) if current == slot => return None,
            Some(current) => self.slots[current] = None,
            None => self.tray_positions[piece] = from,
        }
        let evicted = self.slots[slot].take();
        if let Some(other) = evicted {
            self.slot_of[other] = None;
        }
        self.slots[slot] = Some(piece);
        self.slot_of[piece] = Some(slot);
        evicted
    }

    /// Returns the piece to the tray; yields the slot it left.
    pub fn remove(&mut self, piece: PieceId) -> Option<usize> {
        let slot = self.slot_of.get_mut(piece)?.take()?;
        self.slots[slot] = None;
        Some(slot)
    }

    pub fn fill_solved(&mut self) {
        for index in 0..self.slots.len() {
            self.slots[index] = Some(index);
            self.slot_of[index] = Some(index);
        }
    }

    /// Slot win: every slot holds the piece whose id matches the slot index.
    pub fn is_solved(&self) -> bool {
        !self.slots.is_empty()
            && self
                .slots
                .iter()
                .enumerate()
                .all(|(index, occupant)| *occupant == Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> SlotBoard {
        SlotBoard::new(GridSize::new(2).expect("grid"), 50.0, 40.0)
    }

    #[test]
    fn slot_at_maps_cells_and_rejects_outside() {
        let board = board();
        assert_eq!(board.slot_at(10.0, 10.0), Some(0));
        assert_eq!(board.slot_at(60.0, 10.0), Some(1));
        assert_eq!(board.slot_at(60.0, 79.0), Some(3));
        assert_eq!(board.slot_at(100.0, 10.0), None);
        assert_eq!(board.slot_at(-1.0, 10.0), None);
        assert_eq!(board.slot_origin(3), (50.0, 40.0));
    }

    #[test]
    fn tray_starts_past_the_board_edge() {
        let board = board();
        assert_eq!(board.board_size(), (100.0, 80.0));
        let (x, y) = board.tray_origin();
        assert_eq!(board.slot_at(x, y), None);
        assert_eq!(board.slot_at(x + 1.0, y + 10.0), None);
    }

    #[test]
    fn placing_onto_occupied_slot_evicts() {
        let mut board = board();
        assert_eq!(board.place(2, 0, (7.0, 8.0)), None);
        assert_eq!(board.place(0, 0, (1.0, 1.0)), Some(2));
        assert_eq!(board.occupant(0), Some(0));
        assert_eq!(board.slot_of(2), None);
        assert_eq!(board.tray_position(2), Some((7.0, 8.0)));
        assert!(board.tray().contains(&2));
    }

    #[test]
    fn moving_between_slots_vacates_the_old_one() {
        let mut board = board();
        board.place(1, 0, (0.0, 0.0));
        board.place(1, 1, (0.0, 0.0));
        assert_eq!(board.occupant(0), None);
        assert_eq!(board.slot_of(1), Some(1));
        assert_eq!(board.remove(1), Some(1));
        assert_eq!(board.remove(1), None);
    }

    #[test]
    fn solved_only_with_identity_occupants() {
        let mut board = board();
        assert!(!board.is_solved());
        board.place(0, 0, (0.0, 0.0));
        board.place(1, 1, (0.0, 0.0));
        board.place(3, 2, (0.0, 0.0));
        board.place(2, 3, (0.0, 0.0));
        assert!(!board.is_solved());
        board.place(2, 2, (0.0, 0.0));
        board.place(3, 3, (0.0, 0.0));
        assert!(board.is_solved());
    }
}
