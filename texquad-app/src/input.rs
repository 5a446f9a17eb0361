//! Translates winit touch, mouse and keyboard events into the raw motion and
//! key events the host queue consumes.

use texquad_core::{
    KeyEvent, MotionEvent, PointerAxes,
    input::{key_action, motion_action, source},
};
use winit::{
    event::{ElementState, TouchPhase},
    keyboard::{KeyCode, PhysicalKey},
};

/// Pointer id reported for the mouse.
const MOUSE_POINTER_ID: i32 = 0;

/// Tracks active pointers so every motion event carries a full snapshot.
#[derive(Debug, Default)]
pub struct PointerTracker {
    touches: Vec<(u64, PointerAxes)>,
    cursor: (f32, f32),
    mouse_down: bool,
}

impl PointerTracker {
    /// Motion event for one touch update, or `None` for an unknown touch.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) -> Option<MotionEvent> {
        match phase {
            TouchPhase::Started => {
                let axes = PointerAxes { id: self.next_pointer_id(), x, y };
                self.touches.push((id, axes));

                let index = self.touches.len() - 1;
                let action = if index == 0 {
                    motion_action::DOWN
                } else {
                    motion_action::with_pointer_index(motion_action::POINTER_DOWN, index)
                };
                Some(self.touch_event(action))
            },
            TouchPhase::Moved => {
                let index = self.index_of(id)?;
                let axes = &mut self.touches[index].1;
                axes.x = x;
                axes.y = y;
                Some(self.touch_event(motion_action::MOVE))
            },
            TouchPhase::Ended | TouchPhase::Cancelled => {
                let index = self.index_of(id)?;
                self.touches[index].1.x = x;
                self.touches[index].1.y = y;

                let action = match phase {
                    TouchPhase::Cancelled => {
                        motion_action::with_pointer_index(motion_action::CANCEL, index)
                    },
                    _ if self.touches.len() == 1 => motion_action::UP,
                    _ => motion_action::with_pointer_index(motion_action::POINTER_UP, index),
                };

                // the lifting pointer is still part of its own event
                let event = self.touch_event(action);
                self.touches.remove(index);
                Some(event)
            },
        }
    }

    /// Records the cursor position; a move event while the left button is held.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<MotionEvent> {
        self.cursor = (x, y);
        self.mouse_down
            .then(|| self.mouse_event(motion_action::MOVE))
    }

    /// Down or up event for the primary mouse button at the last cursor position.
    pub fn mouse_button(&mut self, state: ElementState) -> Option<MotionEvent> {
        let pressed = state.is_pressed();
        if pressed == self.mouse_down {
            return None;
        }

        self.mouse_down = pressed;
        let action = if pressed { motion_action::DOWN } else { motion_action::UP };
        Some(self.mouse_event(action))
    }

    /// Number of touches currently down.
    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.touches
            .iter()
            .position(|(touch, _)| *touch == id)
    }

    // lowest id not held by an active touch, so ids are reused like on a touchscreen
    fn next_pointer_id(&self) -> i32 {
        (0..)
            .find(|candidate| !self.touches.iter().any(|(_, p)| p.id == *candidate))
            .unwrap_or_default()
    }

    fn touch_event(&self, action: i32) -> MotionEvent {
        MotionEvent {
            action,
            source: source::TOUCHSCREEN,
            pointers: self.touches.iter().map(|(_, p)| *p).collect(),
        }
    }

    fn mouse_event(&self, action: i32) -> MotionEvent {
        let (x, y) = self.cursor;
        MotionEvent {
            action,
            source: source::MOUSE,
            pointers: vec![PointerAxes { id: MOUSE_POINTER_ID, x, y }],
        }
    }
}

/// Key event for a physical key transition. Auto-repeat arrives as further downs.
pub fn key_event(key: PhysicalKey, state: ElementState) -> KeyEvent {
    let action = match state {
        ElementState::Pressed => key_action::DOWN,
        ElementState::Released => key_action::UP,
    };

    KeyEvent { action, key_code: key_code(key) }
}

/// Android key code for a physical key; `0` (unknown) where none is mapped.
pub fn key_code(key: PhysicalKey) -> i32 {
    const KEYCODE_UNKNOWN: i32 = 0;
    const KEYCODE_0: i32 = 7;
    const KEYCODE_A: i32 = 29;

    let PhysicalKey::Code(code) = key else {
        return KEYCODE_UNKNOWN;
    };

    let digits = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    if let Some(i) = digits.iter().position(|d| *d == code) {
        return KEYCODE_0 + i as i32;
    }

    let letters = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    if let Some(i) = letters.iter().position(|l| *l == code) {
        return KEYCODE_A + i as i32;
    }

    match code {
        KeyCode::ArrowUp => 19,
        KeyCode::ArrowDown => 20,
        KeyCode::ArrowLeft => 21,
        KeyCode::ArrowRight => 22,
        KeyCode::Comma => 55,
        KeyCode::Period => 56,
        KeyCode::ShiftLeft => 59,
        KeyCode::ShiftRight => 60,
        KeyCode::Tab => 61,
        KeyCode::Space => 62,
        KeyCode::Enter => 66,
        KeyCode::Backspace => 67,
        KeyCode::Escape => 111,
        KeyCode::Delete => 112,
        KeyCode::ControlLeft => 113,
        KeyCode::ControlRight => 114,
        _ => KEYCODE_UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use texquad_core::{PointerAction, classify_motion};
    use winit::keyboard::NativeKeyCode;

    use super::*;

    #[test]
    fn first_touch_is_down_second_is_pointer_down() {
        let mut tracker = PointerTracker::default();

        let first = tracker.touch(7, TouchPhase::Started, 1.0, 2.0).unwrap();
        assert_eq!(first.action, motion_action::DOWN);
        assert_eq!(first.source, source::TOUCHSCREEN);

        let second = tracker.touch(9, TouchPhase::Started, 3.0, 4.0).unwrap();
        assert_eq!(second.action_code(), motion_action::POINTER_DOWN);
        assert_eq!(second.pointer_index(), 1);
        assert_eq!(second.pointers.len(), 2);
        assert_eq!(
            classify_motion(&second),
            PointerAction::Down(PointerAxes { id: 1, x: 3.0, y: 4.0 })
        );
    }

    #[test]
    fn lifting_touches_reports_pointer_up_then_up() {
        let mut tracker = PointerTracker::default();
        tracker.touch(7, TouchPhase::Started, 1.0, 2.0);
        tracker.touch(9, TouchPhase::Started, 3.0, 4.0);

        let lifted = tracker.touch(7, TouchPhase::Ended, 1.5, 2.5).unwrap();
        assert_eq!(lifted.action_code(), motion_action::POINTER_UP);
        assert_eq!(
            classify_motion(&lifted),
            PointerAction::Up(PointerAxes { id: 0, x: 1.5, y: 2.5 })
        );
        assert_eq!(tracker.active_touches(), 1);

        let last = tracker.touch(9, TouchPhase::Ended, 3.0, 4.0).unwrap();
        assert_eq!(last.action, motion_action::UP);
        assert_eq!(tracker.active_touches(), 0);
    }

    #[test]
    fn pointer_ids_are_reused_after_lift() {
        let mut tracker = PointerTracker::default();
        tracker.touch(1, TouchPhase::Started, 0.0, 0.0);
        tracker.touch(2, TouchPhase::Started, 0.0, 0.0);
        tracker.touch(1, TouchPhase::Ended, 0.0, 0.0);

        let again = tracker.touch(3, TouchPhase::Started, 5.0, 5.0).unwrap();
        let ids: Vec<_> = again.pointers.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 0]);
    }

    #[test]
    fn moves_carry_every_active_pointer() {
        let mut tracker = PointerTracker::default();
        tracker.touch(1, TouchPhase::Started, 0.0, 0.0);
        tracker.touch(2, TouchPhase::Started, 10.0, 10.0);

        let moved = tracker.touch(2, TouchPhase::Moved, 12.0, 11.0).unwrap();
        assert_eq!(moved.action, motion_action::MOVE);
        assert_eq!(moved.pointers[1], PointerAxes { id: 1, x: 12.0, y: 11.0 });
    }

    #[test]
    fn cancel_ends_the_pointer() {
        let mut tracker = PointerTracker::default();
        tracker.touch(4, TouchPhase::Started, 1.0, 1.0);

        let cancelled = tracker.touch(4, TouchPhase::Cancelled, 1.0, 1.0).unwrap();
        assert!(classify_motion(&cancelled).ends_pointer());
        assert_eq!(tracker.active_touches(), 0);
    }

    #[test]
    fn unknown_touches_are_ignored() {
        let mut tracker = PointerTracker::default();
        assert!(tracker.touch(3, TouchPhase::Moved, 0.0, 0.0).is_none());
        assert!(tracker.touch(3, TouchPhase::Ended, 0.0, 0.0).is_none());
    }

    #[test]
    fn mouse_drags_map_to_pointer_zero() {
        let mut tracker = PointerTracker::default();
        assert!(tracker.cursor_moved(5.0, 6.0).is_none());

        let down = tracker.mouse_button(ElementState::Pressed).unwrap();
        assert_eq!(down.action, motion_action::DOWN);
        assert_eq!(down.source, source::MOUSE);
        assert_eq!(down.pointers, [PointerAxes { id: 0, x: 5.0, y: 6.0 }]);

        assert!(tracker.mouse_button(ElementState::Pressed).is_none());
        assert_eq!(tracker.cursor_moved(7.0, 8.0).unwrap().action, motion_action::MOVE);
        assert_eq!(tracker.mouse_button(ElementState::Released).unwrap().action, motion_action::UP);
    }

    #[test]
    fn keys_map_to_android_codes() {
        let enter = key_event(PhysicalKey::Code(KeyCode::Enter), ElementState::Released);
        assert_eq!(enter, KeyEvent { action: key_action::UP, key_code: 66 });

        assert_eq!(key_code(PhysicalKey::Code(KeyCode::KeyA)), 29);
        assert_eq!(key_code(PhysicalKey::Code(KeyCode::KeyZ)), 54);
        assert_eq!(key_code(PhysicalKey::Code(KeyCode::Digit9)), 16);
        assert_eq!(key_code(PhysicalKey::Code(KeyCode::F24)), 0);
        assert_eq!(key_code(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)), 0);
    }
}
