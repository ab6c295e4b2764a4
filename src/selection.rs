// Pointer-drag region selection
use crate::config::MIN_SELECTION_PX;
use crate::types::{PixelPos, Rect, SelectionRect};

// Drag state: anchor is where the pointer went down, current tracks it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        anchor: PixelPos,
        current: PixelPos,
    },
}

/// Three-phase drag state machine producing at most one committed
/// selection rectangle in current-render pixel space.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    drag: DragState,
    committed: Option<SelectionRect>,
}

impl SelectionTracker {
    /// Pointer down: record the anchor and start dragging.
    /// Any committed selection stays until the drag resolves.
    pub fn begin(&mut self, pos: PixelPos) {
        self.drag = DragState::Dragging {
            anchor: pos,
            current: pos,
        };
    }

    /// Pointer move: returns the live rectangle for overlay feedback,
    /// or None when no drag is active.
    pub fn update(&mut self, pos: PixelPos) -> Option<Rect> {
        match &mut self.drag {
            DragState::Dragging { anchor, current } => {
                *current = pos;
                Some(Rect::from_corners(*anchor, *current))
            }
            DragState::Idle => None,
        }
    }

    /// Pointer up: commit the rectangle if both dimensions exceed the
    /// minimum, tagged with `page`. A too-small drag commits nothing and
    /// leaves any prior committed selection untouched.
    pub fn end(&mut self, pos: PixelPos, page: u32) -> Option<SelectionRect> {
        let DragState::Dragging { anchor, .. } = self.drag else {
            return None;
        };
        self.drag = DragState::Idle;

        let rect = Rect::from_corners(anchor, pos);
        if rect.w > MIN_SELECTION_PX && rect.h > MIN_SELECTION_PX {
            let sel = SelectionRect { rect, page };
            self.committed = Some(sel);
            Some(sel)
        } else {
            None
        }
    }

    /// Remove the committed selection and any in-progress drag.
    pub fn clear(&mut self) {
        self.drag = DragState::Idle;
        self.committed = None;
    }

    pub fn committed(&self) -> Option<SelectionRect> {
        self.committed
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(tracker: &mut SelectionTracker, from: (f32, f32), to: (f32, f32), page: u32) -> Option<SelectionRect> {
        tracker.begin(from.into());
        tracker.update(to.into());
        tracker.end(to.into(), page)
    }

    #[test]
    fn drag_commits_normalized_rect_tagged_with_page() {
        let mut t = SelectionTracker::default();
        let sel = drag(&mut t, (100.0, 90.0), (60.0, 60.0), 3).unwrap();
        assert_eq!(sel.page, 3);
        assert_eq!(sel.rect, Rect { x: 60.0, y: 60.0, w: 40.0, h: 30.0 });
        assert_eq!(t.committed(), Some(sel));
    }

    #[test]
    fn tiny_drag_never_commits() {
        let mut t = SelectionTracker::default();
        assert!(drag(&mut t, (10.0, 10.0), (15.0, 40.0), 1).is_none());
        assert!(drag(&mut t, (10.0, 10.0), (40.0, 15.0), 1).is_none());
        assert!(t.committed().is_none());
    }

    #[test]
    fn tiny_drag_leaves_prior_selection_untouched() {
        let mut t = SelectionTracker::default();
        let first = drag(&mut t, (0.0, 0.0), (50.0, 50.0), 2).unwrap();
        assert!(drag(&mut t, (5.0, 5.0), (7.0, 7.0), 2).is_none());
        assert_eq!(t.committed(), Some(first));
    }

    #[test]
    fn new_valid_drag_replaces_prior_selection() {
        let mut t = SelectionTracker::default();
        drag(&mut t, (0.0, 0.0), (50.0, 50.0), 1);
        let second = drag(&mut t, (100.0, 100.0), (200.0, 180.0), 1).unwrap();
        assert_eq!(t.committed(), Some(second));
    }

    #[test]
    fn update_redraws_live_rect_without_committing() {
        let mut t = SelectionTracker::default();
        t.begin((10.0, 10.0).into());
        let live = t.update((30.0, 50.0).into()).unwrap();
        assert_eq!(live, Rect { x: 10.0, y: 10.0, w: 20.0, h: 40.0 });
        let live = t.update((5.0, 5.0).into()).unwrap();
        assert_eq!(live, Rect { x: 5.0, y: 5.0, w: 5.0, h: 5.0 });
        assert!(t.committed().is_none());
    }

    #[test]
    fn update_without_begin_is_ignored() {
        let mut t = SelectionTracker::default();
        assert!(t.update((10.0, 10.0).into()).is_none());
        assert!(t.end((10.0, 10.0).into(), 1).is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let mut t = SelectionTracker::default();
        drag(&mut t, (0.0, 0.0), (60.0, 60.0), 1);
        t.clear();
        assert!(t.committed().is_none());
        assert!(!t.is_dragging());
    }
}
