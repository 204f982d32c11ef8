use std::collections::HashMap;

use kirinuki_core::{PieceId, PieceSet, Placement, PlayMode, PointerId, Release, Resolver};

/// One resolver per active pointer over a shared piece set. A piece held by
/// one pointer cannot be picked by another.
#[derive(Debug, Default)]
pub struct PointerRouter {
    active: HashMap<PointerId, Resolver>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held_by(&self, piece_id: PieceId) -> Option<PointerId> {
        self.active
            .iter()
            .find(|(_, resolver)| resolver.dragging() == Some(piece_id))
            .map(|(pointer, _)| *pointer)
    }

    pub fn dragging(&self, pointer: PointerId) -> Option<PieceId> {
        self.active.get(&pointer).and_then(Resolver::dragging)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn down(
        &mut self,
        pointer: PointerId,
        set: &mut PieceSet,
        mode: PlayMode,
        x: f32,
        y: f32,
    ) -> Option<PieceId> {
        let held: Vec<PieceId> = self
            .active
            .iter()
            .filter(|(other, _)| **other != pointer)
            .filter_map(|(_, resolver)| resolver.dragging())
            .collect();
        let resolver = self.active.entry(pointer).or_default();
        let picked = resolver.pointer_down(set, mode, x, y, |id| held.contains(&id));
        if resolver.dragging().is_none() {
            self.active.remove(&pointer);
        }
        picked
    }

    pub fn move_to(
        &mut self,
        pointer: PointerId,
        set: &mut PieceSet,
        x: f32,
        y: f32,
    ) -> Option<PieceId> {
        self.active.get_mut(&pointer)?.pointer_move(set, x, y)
    }

    pub fn up(
        &mut self,
        pointer: PointerId,
        set: &mut PieceSet,
        placement: Placement<'_>,
        x: f32,
        y: f32,
    ) -> Option<Release> {
        let mut resolver = self.active.remove(&pointer)?;
        resolver.pointer_up(set, placement, x, y)
    }

    pub fn cancel(&mut self, pointer: PointerId) -> Option<PieceId> {
        self.active.remove(&pointer)?.cancel()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirinuki_core::{GridSize, PuzzleParams, ShapeStyle};

    fn stacked() -> PieceSet {
        let mut set = PieceSet::create(&PuzzleParams {
            field_width: 200.0,
            field_height: 200.0,
            grid: GridSize::new(2).expect("grid"),
            seed: 1,
            shape: ShapeStyle::Rectangular,
            tab_ratio: 0.0,
        })
        .expect("set");
        for piece in &mut set.pieces {
            piece.position = (400.0, 400.0);
        }
        set.z_order = vec![0, 1, 2, 3];
        set
    }

    #[test]
    fn second_pointer_skips_held_piece() {
        let mut set = stacked();
        let mut router = PointerRouter::new();
        assert_eq!(router.down(PointerId(1), &mut set, PlayMode::Free, 450.0, 450.0), Some(3));
        assert_eq!(router.down(PointerId(2), &mut set, PlayMode::Free, 450.0, 450.0), Some(2));
        assert_eq!(router.held_by(3), Some(PointerId(1)));
        assert_eq!(router.active_count(), 2);

        router.move_to(PointerId(2), &mut set, 460.0, 450.0);
        assert_eq!(set.pieces[2].position, (410.0, 400.0));
        assert_eq!(set.pieces[3].position, (400.0, 400.0));

        router.up(PointerId(1), &mut set, Placement::Snap { threshold: 20.0 }, 450.0, 450.0);
        assert_eq!(router.held_by(3), None);
        assert_eq!(router.dragging(PointerId(2)), Some(2));
    }

    #[test]
    fn missed_down_leaves_no_resolver() {
        let mut set = stacked();
        let mut router = PointerRouter::new();
        assert_eq!(router.down(PointerId(7), &mut set, PlayMode::Free, 1.0, 1.0), None);
        assert_eq!(router.active_count(), 0);
        assert_eq!(router.cancel(PointerId(7)), None);
    }
}
