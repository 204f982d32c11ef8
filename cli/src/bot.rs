use kirinuki::GameSession;
use kirinuki_core::{PieceId, PieceSet, PlayMode, PointerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BOT_POINTER: PointerId = PointerId(1);
const GRAB_SAMPLES: u32 = 7;

#[derive(clap::Args)]
pub(super) struct BotArgs {
    /// Intermediate pointer moves per drag.
    #[arg(long, default_value_t = 6)]
    drag_steps: u32,
    /// Random wobble added to intermediate moves.
    #[arg(long, default_value_t = 4.0)]
    jitter_px: f32,
    #[arg(long)]
    bot_seed: Option<u64>,
}

impl BotArgs {
    pub(super) fn into_config(self) -> BotConfig {
        BotConfig {
            drag_steps: self.drag_steps.max(1),
            jitter_px: self.jitter_px.max(0.0),
            seed: self.bot_seed.unwrap_or_else(|| rand::rng().random()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct BotConfig {
    pub drag_steps: u32,
    pub jitter_px: f32,
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct BotReport {
    pub moves: usize,
}

/// Drags pieces home one at a time until the session reports a win. Falls
/// back to auto-solve when no piece can be grabbed.
pub(super) fn run_bot(session: &mut GameSession, config: &BotConfig) -> BotReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut report = BotReport::default();
    let mode = session.mode();
    let Some(total) = session.pieces().map(PieceSet::len) else {
        return report;
    };
    // every drag either homes a piece or evicts one that is then homed later
    let max_moves = total * 3;

    while !session.solved() && report.moves < max_moves {
        let next = session.pieces().and_then(|set| choose_move(set, mode));
        let Some((piece_id, grab, drop)) = next else {
            tracing::warn!("no piece reachable, auto-solving");
            session.solve();
            break;
        };
        if session.pointer_down(BOT_POINTER, grab) != Some(piece_id) {
            session.pointer_cancel(BOT_POINTER);
            tracing::warn!(piece_id, "grab missed, auto-solving");
            session.solve();
            break;
        }
        for step in 1..config.drag_steps {
            let t = step as f32 / config.drag_steps as f32;
            let wobble = if config.jitter_px > 0.0 {
                (
                    rng.random_range(-config.jitter_px..=config.jitter_px),
                    rng.random_range(-config.jitter_px..=config.jitter_px),
                )
            } else {
                (0.0, 0.0)
            };
            let x = lerp_f32(grab.0, drop.0, t) + wobble.0;
            let y = lerp_f32(grab.1, drop.1, t) + wobble.1;
            session.pointer_move(BOT_POINTER, (x, y));
        }
        session.pointer_move(BOT_POINTER, drop);
        session.pointer_up(BOT_POINTER, drop);
        report.moves += 1;
    }
    report
}

fn needs_move(set: &PieceSet, id: PieceId, mode: PlayMode) -> bool {
    set.piece(id).is_some_and(|piece| match mode {
        PlayMode::Free => !piece.placed,
        PlayMode::Slots => !piece.placed || !piece.is_home(),
    })
}

/// Topmost piece that still needs moving, with a visible grab point on it
/// and the pointer position that lands it on its home cell.
fn choose_move(set: &PieceSet, mode: PlayMode) -> Option<(PieceId, (f32, f32), (f32, f32))> {
    for id in set.z_order.iter().rev().copied() {
        if !needs_move(set, id, mode) {
            continue;
        }
        let Some(grab) = grab_point(set, id, mode) else {
            continue;
        };
        let piece = set.piece(id)?;
        let offset = (grab.0 - piece.position.0, grab.1 - piece.position.1);
        let drop = (piece.target.0 + offset.0, piece.target.1 + offset.1);
        return Some((id, grab, drop));
    }
    None
}

fn grab_point(set: &PieceSet, id: PieceId, mode: PlayMode) -> Option<(f32, f32)> {
    let piece = set.piece(id)?;
    for row in 0..GRAB_SAMPLES {
        for col in 0..GRAB_SAMPLES {
            let fx = (col as f32 + 0.5) / GRAB_SAMPLES as f32;
            let fy = (row as f32 + 0.5) / GRAB_SAMPLES as f32;
            let x = piece.position.0 + piece.width * (0.1 + 0.8 * fx);
            let y = piece.position.1 + piece.height * (0.1 + 0.8 * fy);
            let hit = set.hit_test(x, y, |other| mode == PlayMode::Slots || !other.placed);
            if hit == Some(id) {
                return Some((x, y));
            }
        }
    }
    None
}

fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
