use std::rc::Rc;

use kirinuki_core::{PieceId, PointerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Picked { pointer: PointerId, piece_id: PieceId },
    Dropped { pointer: PointerId, piece_id: PieceId },
    Snapped { pointer: PointerId, piece_id: PieceId },
    Slotted { pointer: PointerId, piece_id: PieceId, slot: usize },
    Evicted { piece_id: PieceId, slot: usize },
    Solved,
}

/// Sounds a front end may play. Muted sessions emit none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Music,
    Pickup,
    Drop,
    Win,
}

#[derive(Clone)]
pub struct SessionHooks {
    pub on_event: Rc<dyn Fn(GameEvent)>,
    pub on_cue: Rc<dyn Fn(AudioCue)>,
}

impl SessionHooks {
    pub fn empty() -> Self {
        Self {
            on_event: Rc::new(|_| {}),
            on_cue: Rc::new(|_| {}),
        }
    }
}

impl Default for SessionHooks {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks").finish_non_exhaustive()
    }
}
