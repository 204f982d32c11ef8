pub const PUZZLE_SEED: u32 = 0x5EED_2520;

pub const SNAP_THRESHOLD_DEFAULT: f32 = 20.0;
pub const SNAP_THRESHOLD_MIN: f32 = 1.0;
pub const SNAP_THRESHOLD_MAX: f32 = 200.0;

pub const SOLVE_TOLERANCE_PX: f32 = 0.5;

pub const DIR_UP: usize = 0;
pub const DIR_RIGHT: usize = 1;
pub const DIR_DOWN: usize = 2;
pub const DIR_LEFT: usize = 3;

pub const TAB_FLAT: i8 = 0;
pub const TAB_OUT: i8 = 1;
pub const TAB_IN: i8 = -1;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ salt);
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

pub fn rand_range(seed: u32, salt: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * rand_unit(seed, salt)
}

pub fn neighbor_id(id: usize, cols: usize, rows: usize, dir: usize) -> Option<usize> {
    let col = id % cols;
    let row = id / cols;
    match dir {
        DIR_UP if row > 0 => Some(id - cols),
        DIR_RIGHT if col + 1 < cols => Some(id + 1),
        DIR_DOWN if row + 1 < rows => Some(id + cols),
        DIR_LEFT if col > 0 => Some(id - 1),
        _ => None,
    }
}

pub fn opposite_dir(dir: usize) -> usize {
    match dir {
        DIR_UP => DIR_DOWN,
        DIR_RIGHT => DIR_LEFT,
        DIR_DOWN => DIR_UP,
        DIR_LEFT => DIR_RIGHT,
        _ => DIR_UP,
    }
}

pub fn edge_seed(base: u32, orientation: u32, row: u32, col: u32) -> u32 {
    base ^ orientation.wrapping_mul(0x9E37_79B9)
        ^ row.wrapping_mul(0x85EB_CA6B)
        ^ col.wrapping_mul(0xC2B2_AE35)
}

fn tab_polarity(seed: u32) -> i8 {
    if rand_unit(seed, 0x7AB5) < 0.5 {
        TAB_OUT
    } else {
        TAB_IN
    }
}

/// Edge polarities for every piece of a `cols` x `rows` grid, indexed by
/// piece id and then by direction (`DIR_UP..=DIR_LEFT`).
///
/// Border edges are flat. Each internal edge is decided once, by the piece
/// above or to the left of it, and the neighbour takes the negation.
pub fn assign_tabs(cols: usize, rows: usize, seed: u32) -> Vec<[i8; 4]> {
    let total = cols * rows;
    let mut tabs = vec![[TAB_FLAT; 4]; total];
    for id in 0..total {
        let col = id % cols;
        let row = id / cols;
        if let Some(above) = neighbor_id(id, cols, rows, DIR_UP) {
            tabs[id][DIR_UP] = -tabs[above][DIR_DOWN];
        }
        if let Some(left) = neighbor_id(id, cols, rows, DIR_LEFT) {
            tabs[id][DIR_LEFT] = -tabs[left][DIR_RIGHT];
        }
        if neighbor_id(id, cols, rows, DIR_RIGHT).is_some() {
            tabs[id][DIR_RIGHT] = tab_polarity(edge_seed(seed, 1, row as u32, col as u32));
        }
        if neighbor_id(id, cols, rows, DIR_DOWN).is_some() {
            tabs[id][DIR_DOWN] = tab_polarity(edge_seed(seed, 2, row as u32, col as u32));
        }
    }
    tabs
}

pub fn scramble_seed(base: u32, nonce: u32, cols: usize, rows: usize) -> u32 {
    let grid = ((cols as u32) << 16) ^ (rows as u32);
    base ^ nonce.wrapping_mul(0x9E37_79B9) ^ grid ^ 0x5CA7_7EED
}

/// Random start positions inside the playfield plus a shuffled paint order.
pub fn scramble_layout(
    seed: u32,
    total: usize,
    piece_width: f32,
    piece_height: f32,
    field_width: f32,
    field_height: f32,
) -> (Vec<(f32, f32)>, Vec<usize>) {
    let max_x = (field_width - piece_width).max(0.0);
    let max_y = (field_height - piece_height).max(0.0);

    let mut positions = Vec::with_capacity(total);
    for id in 0..total {
        let salt = (id as u32) << 1;
        let x = rand_range(seed, salt, 0.0, max_x);
        let y = rand_range(seed, salt + 1, 0.0, max_y);
        positions.push((x, y));
    }

    let mut order: Vec<usize> = (0..total).collect();
    for i in (1..order.len()).rev() {
        let salt = 0xC0DE_u32 + i as u32;
        let j = ((rand_unit(seed, salt) * (i as f32 + 1.0)) as usize).min(i);
        order.swap(i, j);
    }
    (positions, order)
}

pub fn within_snap(position: (f32, f32), target: (f32, f32), threshold: f32) -> bool {
    (position.0 - target.0).abs() < threshold && (position.1 - target.1).abs() < threshold
}

pub fn at_target(position: (f32, f32), target: (f32, f32)) -> bool {
    (position.0 - target.0).abs() <= SOLVE_TOLERANCE_PX
        && (position.1 - target.1).abs() <= SOLVE_TOLERANCE_PX
}

/// Turns repeated win evaluations into a single transition signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolvedLatch {
    fired: bool,
}

impl SolvedLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the first call that observes `solved`.
    pub fn update(&mut self, solved: bool) -> bool {
        if solved && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}
