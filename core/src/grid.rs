use thiserror::Error;

pub const GRID_SIZE_MIN: u32 = 2;
pub const GRID_SIZE_MAX: u32 = 8;
pub const DEFAULT_GRID_SIZE: u32 = 3;
pub const MAX_DISPLAY_WIDTH_DEFAULT: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(
        "grid size {0} is outside the supported range {min}..={max}",
        min = GRID_SIZE_MIN,
        max = GRID_SIZE_MAX
    )]
    OutOfRange(u32),
    #[error("playfield {width}x{height} has no area")]
    EmptyPlayfield { width: u32, height: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

impl GridSize {
    pub fn new(n: u32) -> Result<Self, GridError> {
        if !(GRID_SIZE_MIN..=GRID_SIZE_MAX).contains(&n) {
            return Err(GridError::OutOfRange(n));
        }
        Ok(Self { cols: n, rows: n })
    }

    pub fn total(&self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }

    pub fn piece_size(&self, playfield_width: f32, playfield_height: f32) -> (f32, f32) {
        (
            playfield_width / self.cols.max(1) as f32,
            playfield_height / self.rows.max(1) as f32,
        )
    }

    pub fn cell_of(&self, id: usize) -> (u32, u32) {
        let cols = self.cols.max(1) as usize;
        ((id % cols) as u32, (id / cols) as u32)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            cols: DEFAULT_GRID_SIZE,
            rows: DEFAULT_GRID_SIZE,
        }
    }
}

pub fn grid_label(grid: &GridSize) -> String {
    format!("{} pieces ({}x{})", grid.total(), grid.cols, grid.rows)
}

/// Playfield size for an image: aspect ratio kept, width capped at `max_width`.
pub fn display_size(width: u32, height: u32, max_width: u32) -> Result<(u32, u32), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::EmptyPlayfield { width, height });
    }
    let display_width = width.min(max_width.max(1));
    let aspect = width as f64 / height as f64;
    let display_height = ((display_width as f64) / aspect).round().max(1.0) as u32;
    Ok((display_width, display_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_rejects_out_of_range() {
        assert_eq!(GridSize::new(1), Err(GridError::OutOfRange(1)));
        assert_eq!(GridSize::new(9), Err(GridError::OutOfRange(9)));
        assert_eq!(GridSize::new(0), Err(GridError::OutOfRange(0)));
        let grid = GridSize::new(4).expect("grid");
        assert_eq!(grid.total(), 16);
        assert_eq!(grid_label(&grid), "16 pieces (4x4)");
    }

    #[test]
    fn display_size_caps_width_and_keeps_aspect() {
        assert_eq!(display_size(1200, 800, 600), Ok((600, 400)));
        assert_eq!(display_size(300, 200, 600), Ok((300, 200)));
        assert_eq!(display_size(800, 1600, 600), Ok((600, 1200)));
        assert!(display_size(0, 10, 600).is_err());
    }

    #[test]
    fn cell_of_is_row_major() {
        let grid = GridSize::new(3).expect("grid");
        assert_eq!(grid.cell_of(0), (0, 0));
        assert_eq!(grid.cell_of(5), (2, 1));
        assert_eq!(grid.cell_of(7), (1, 2));
    }
}
