use crate::game::within_snap;
use crate::slots::SlotBoard;
use crate::state::{PieceId, PieceSet, PlayMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub piece_id: PieceId,
    pub grab_offset: (f32, f32),
    pub start_position: (f32, f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ResolverState {
    #[default]
    Idle,
    Dragging(DragSession),
}

pub enum Placement<'a> {
    Snap { threshold: f32 },
    Slots(&'a mut SlotBoard),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Landed within the snap threshold and locked onto its home position.
    Snapped { piece_id: PieceId },
    /// Left where it was dropped.
    Dropped { piece_id: PieceId },
    Slotted {
        piece_id: PieceId,
        slot: usize,
        evicted: Option<PieceId>,
    },
    /// Dropped outside the slot board.
    Tray { piece_id: PieceId },
}

impl Release {
    pub fn piece_id(&self) -> PieceId {
        match *self {
            Release::Snapped { piece_id }
            | Release::Dropped { piece_id }
            | Release::Slotted { piece_id, .. }
            | Release::Tray { piece_id } => piece_id,
        }
    }
}

/// Drag state machine for one pointer over a shared piece set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Resolver {
    state: ResolverState,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn dragging(&self) -> Option<PieceId> {
        match self.state {
            ResolverState::Dragging(session) => Some(session.piece_id),
            ResolverState::Idle => None,
        }
    }

    /// Picks the topmost pickable piece under the point and raises it.
    /// Ignored while a drag is already running.
    pub fn pointer_down(
        &mut self,
        set: &mut PieceSet,
        mode: PlayMode,
        x: f32,
        y: f32,
        held_elsewhere: impl Fn(PieceId) -> bool,
    ) -> Option<PieceId> {
        if self.dragging().is_some() {
            return None;
        }
        let piece_id = set.hit_test(x, y, |piece| {
            let free_to_pick = mode == PlayMode::Slots || !piece.placed;
            free_to_pick && !held_elsewhere(piece.id)
        })?;
        let position = set.piece(piece_id)?.position;
        set.bring_to_front(piece_id);
        self.state = ResolverState::Dragging(DragSession {
            piece_id,
            grab_offset: (x - position.0, y - position.1),
            start_position: position,
        });
        Some(piece_id)
    }

    pub fn pointer_move(&mut self, set: &mut PieceSet, x: f32, y: f32) -> Option<PieceId> {
        let ResolverState::Dragging(session) = self.state else {
            return None;
        };
        let piece = set.piece_mut(session.piece_id)?;
        piece.position = (x - session.grab_offset.0, y - session.grab_offset.1);
        Some(session.piece_id)
    }

    /// Ends the drag at the point and applies the placement policy. The
    /// selection clears whatever the outcome.
    pub fn pointer_up(
        &mut self,
        set: &mut PieceSet,
        placement: Placement<'_>,
        x: f32,
        y: f32,
    ) -> Option<Release> {
        let ResolverState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let piece_id = session.piece_id;
        let piece = set.piece_mut(piece_id)?;
        piece.position = (x - session.grab_offset.0, y - session.grab_offset.1);

        match placement {
            Placement::Snap { threshold } => {
                if within_snap(piece.position, piece.target, threshold) {
                    piece.snap_home();
                    Some(Release::Snapped { piece_id })
                } else {
                    Some(Release::Dropped { piece_id })
                }
            }
            Placement::Slots(board) => {
                let Some(slot) = board.slot_at(x, y) else {
                    board.remove(piece_id);
                    board.set_tray_position(piece_id, piece.position);
                    piece.placed = false;
                    return Some(Release::Tray { piece_id });
                };
                let evicted = board.place(piece_id, slot, session.start_position);
                piece.position = board.slot_origin(slot);
                piece.placed = slot == piece_id;
                if let Some(other_id) = evicted {
                    let home = board.tray_position(other_id);
                    if let (Some(other), Some(home)) = (set.piece_mut(other_id), home) {
                        other.position = home;
                        other.placed = false;
                    }
                }
                Some(Release::Slotted {
                    piece_id,
                    slot,
                    evicted,
                })
            }
        }
    }

    /// Drops the selection without applying any placement.
    pub fn cancel(&mut self) -> Option<PieceId> {
        let id = self.dragging();
        self.state = ResolverState::Idle;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::shape::ShapeStyle;
    use crate::state::PuzzleParams;

    fn snap<'a>() -> Placement<'a> {
        Placement::Snap { threshold: 20.0 }
    }

    fn lined_up_set() -> PieceSet {
        let mut set = PieceSet::create(&PuzzleParams {
            field_width: 200.0,
            field_height: 200.0,
            grid: GridSize::new(2).expect("grid"),
            seed: 3,
            shape: ShapeStyle::Rectangular,
            tab_ratio: 0.0,
        })
        .expect("set");
        for piece in &mut set.pieces {
            piece.position = (300.0, 300.0);
        }
        set.z_order = vec![0, 1, 2, 3];
        set
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        let picked = resolver.pointer_down(&mut set, PlayMode::Free, 310.0, 320.0, |_| false);
        assert_eq!(picked, Some(3));
        resolver.pointer_move(&mut set, 410.0, 420.0);
        assert_eq!(set.pieces[3].position, (400.0, 400.0));
        assert_eq!(set.top_id(), Some(3));
    }

    #[test]
    fn release_near_target_snaps_and_locks() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        resolver.pointer_down(&mut set, PlayMode::Free, 305.0, 305.0, |_| false);
        // piece 3 target is (100, 100); land 12px off on both axes
        let release = resolver.pointer_up(&mut set, snap(), 117.0, 117.0);
        assert_eq!(release, Some(Release::Snapped { piece_id: 3 }));
        assert_eq!(set.pieces[3].position, (100.0, 100.0));
        assert!(set.pieces[3].placed);
        assert_eq!(resolver.state(), ResolverState::Idle);
        // placed pieces are no longer pickable
        assert_eq!(resolver.pointer_down(&mut set, PlayMode::Free, 150.0, 150.0, |_| false), None);
    }

    #[test]
    fn release_far_from_target_stays() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        resolver.pointer_down(&mut set, PlayMode::Free, 305.0, 305.0, |_| false);
        let release = resolver.pointer_up(&mut set, snap(), 145.0, 105.0);
        assert_eq!(release, Some(Release::Dropped { piece_id: 3 }));
        assert_eq!(set.pieces[3].position, (140.0, 100.0));
        assert!(!set.pieces[3].placed);
    }

    #[test]
    fn second_down_while_dragging_is_ignored() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        resolver.pointer_down(&mut set, PlayMode::Free, 305.0, 305.0, |_| false);
        assert_eq!(resolver.pointer_down(&mut set, PlayMode::Free, 305.0, 305.0, |_| false), None);
        assert_eq!(resolver.dragging(), Some(3));
    }

    #[test]
    fn held_pieces_are_skipped() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        let picked = resolver.pointer_down(&mut set, PlayMode::Free, 305.0, 305.0, |id| id == 3);
        assert_eq!(picked, Some(2));
    }

    #[test]
    fn moves_and_ups_without_drag_do_nothing() {
        let mut set = lined_up_set();
        let mut resolver = Resolver::new();
        assert_eq!(resolver.pointer_move(&mut set, 1.0, 1.0), None);
        assert_eq!(resolver.pointer_up(&mut set, snap(), 1.0, 1.0), None);
        assert_eq!(resolver.pointer_down(&mut set, PlayMode::Free, 5.0, 5.0, |_| false), None);
    }
}
