//! Raw pointer/key events and their classification.
//!
//! Action and source codes follow the Android input constants, which is what
//! the host platforms translate into.

use std::fmt;

/// Motion event action codes.
pub mod motion_action {
    /// First pointer went down.
    pub const DOWN: i32 = 0;
    /// Last pointer went up.
    pub const UP: i32 = 1;
    /// One or more pointers moved.
    pub const MOVE: i32 = 2;
    /// The gesture was aborted.
    pub const CANCEL: i32 = 3;
    /// A non-primary pointer went down.
    pub const POINTER_DOWN: i32 = 5;
    /// A non-primary pointer went up.
    pub const POINTER_UP: i32 = 6;

    /// Bits holding the action code.
    pub const MASK: i32 = 0xff;
    /// Bits holding the index of the pointer the action refers to.
    pub const POINTER_INDEX_MASK: i32 = 0xff00;
    /// Shift applied after [`POINTER_INDEX_MASK`].
    pub const POINTER_INDEX_SHIFT: i32 = 8;

    /// Packs an action code and pointer index.
    pub const fn with_pointer_index(action: i32, index: usize) -> i32 {
        action | ((index as i32) << POINTER_INDEX_SHIFT) & POINTER_INDEX_MASK
    }
}

/// Key event action codes.
pub mod key_action {
    /// Key pressed.
    pub const DOWN: i32 = 0;
    /// Key released.
    pub const UP: i32 = 1;
    /// Repeated key events delivered at once. Deprecated on Android since API 29.
    pub const MULTIPLE: i32 = 2;
}

/// Input source bits.
pub mod source {
    /// Bits holding the source class.
    pub const CLASS_MASK: i32 = 0xff;
    /// Pointer class (touchscreens, mice, styluses).
    pub const CLASS_POINTER: i32 = 0x02;
    /// Joystick class.
    pub const CLASS_JOYSTICK: i32 = 0x10;

    /// Physical keyboard.
    pub const KEYBOARD: i32 = 0x0101;
    /// Touchscreen.
    pub const TOUCHSCREEN: i32 = 0x1002;
    /// Mouse.
    pub const MOUSE: i32 = 0x2002;
    /// Trackball, a navigation class device.
    pub const TRACKBALL: i32 = 0x0001_0004;
    /// Joystick.
    pub const JOYSTICK: i32 = 0x0100_0010;
}

/// One pointer's position within a motion event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAxes {
    /// Pointer id, stable for the pointer's lifetime.
    pub id: i32,
    /// X position in surface pixels.
    pub x: f32,
    /// Y position in surface pixels.
    pub y: f32,
}

impl fmt::Display for PointerAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.x, self.y)
    }
}

/// Raw motion event as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    /// Action code in the low byte, pointer index in the second byte.
    pub action: i32,
    /// Source bits of the originating device.
    pub source: i32,
    /// Snapshot of every active pointer.
    pub pointers: Vec<PointerAxes>,
}

impl MotionEvent {
    /// Action code without the pointer index.
    pub fn action_code(&self) -> i32 {
        self.action & motion_action::MASK
    }

    /// Index into `pointers` the action refers to.
    pub fn pointer_index(&self) -> usize {
        ((self.action & motion_action::POINTER_INDEX_MASK) >> motion_action::POINTER_INDEX_SHIFT)
            as usize
    }
}

/// Raw key event as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Action code.
    pub action: i32,
    /// Platform key code.
    pub key_code: i32,
}

/// Classified motion event.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    /// A pointer went down.
    Down(PointerAxes),
    /// A pointer went up.
    Up(PointerAxes),
    /// The gesture was aborted; ends the pointer like [`PointerAction::Up`].
    Cancel(PointerAxes),
    /// Snapshot of all active pointers.
    Move(Vec<PointerAxes>),
    /// Unrecognized action or a pointer index outside the snapshot.
    Unknown(i32),
}

impl PointerAction {
    /// True if the pointer is gone after this action.
    pub fn ends_pointer(&self) -> bool {
        matches!(self, Self::Up(_) | Self::Cancel(_))
    }
}

impl fmt::Display for PointerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down(p) => write!(f, "{p} Pointer Down"),
            Self::Up(p) | Self::Cancel(p) => write!(f, "{p} Pointer Up"),
            Self::Move(pointers) => {
                for (i, p) in pointers.iter().enumerate() {
                    let separator = if i + 1 == pointers.len() { "" } else { "," };
                    write!(f, "{p}{separator} ")?;
                }
                f.write_str("Pointer Move")
            },
            Self::Unknown(action) => write!(f, "Unknown MotionEvent Action: {action}"),
        }
    }
}

/// Classified key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
    /// Multiple repeated key events (deprecated by the platform).
    Multiple,
    /// Unrecognized action code.
    Unknown(i32),
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => f.write_str("Key Down"),
            Self::Up => f.write_str("Key Up"),
            Self::Multiple => f.write_str("Multiple Key Actions"),
            Self::Unknown(action) => write!(f, "Unknown KeyEvent Action: {action}"),
        }
    }
}

/// A classified input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer activity.
    Pointer(PointerAction),
    /// Key activity.
    Key {
        /// Platform key code.
        key_code: i32,
        /// What happened to the key.
        action: KeyAction,
    },
}

/// Classifies a motion event.
///
/// Down/Up/Cancel report the pointer selected by the action's pointer index;
/// Move reports the whole snapshot.
pub fn classify_motion(event: &MotionEvent) -> PointerAction {
    let pointer = event.pointers.get(event.pointer_index()).copied();

    match (event.action_code(), pointer) {
        (motion_action::DOWN | motion_action::POINTER_DOWN, Some(p)) => PointerAction::Down(p),
        (motion_action::UP | motion_action::POINTER_UP, Some(p)) => PointerAction::Up(p),
        (motion_action::CANCEL, Some(p)) => PointerAction::Cancel(p),
        (motion_action::MOVE, _) => PointerAction::Move(event.pointers.clone()),
        _ => PointerAction::Unknown(event.action),
    }
}

/// Classifies a key event.
pub fn classify_key(event: &KeyEvent) -> KeyAction {
    match event.action {
        key_action::DOWN => KeyAction::Down,
        key_action::UP => KeyAction::Up,
        key_action::MULTIPLE => KeyAction::Multiple,
        other => KeyAction::Unknown(other),
    }
}

/// True for motion events from pointer or joystick class devices.
pub fn accepts_motion_source(source_bits: i32) -> bool {
    let class = source_bits & source::CLASS_MASK;
    class == source::CLASS_POINTER || class == source::CLASS_JOYSTICK
}

/// Events drained from an [`InputQueue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputBatch {
    /// Motion events in arrival order.
    pub motion: Vec<MotionEvent>,
    /// Key events in arrival order.
    pub keys: Vec<KeyEvent>,
}

impl InputBatch {
    /// True if the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.motion.is_empty() && self.keys.is_empty()
    }

    /// Classifies every event, motion events first, emitting one debug event each.
    pub fn classify(&self) -> Vec<InputEvent> {
        let motion = self.motion.iter().map(|event| {
            let action = classify_motion(event);
            tracing::debug!("Pointer(s): {action}");
            InputEvent::Pointer(action)
        });

        let keys = self.keys.iter().map(|event| {
            let action = classify_key(event);
            tracing::debug!("Key: {} {action}", event.key_code);
            InputEvent::Key { key_code: event.key_code, action }
        });

        motion.chain(keys).collect()
    }
}

/// Host-side buffer of raw events between two frames.
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: InputBatch,
    rejected: usize,
}

impl InputQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a motion event from a pointer or joystick source.
    ///
    /// Returns `false` and counts the event as rejected for any other source.
    pub fn push_motion(&mut self, event: MotionEvent) -> bool {
        if !accepts_motion_source(event.source) {
            self.rejected += 1;
            return false;
        }

        self.pending.motion.push(event);
        true
    }

    /// Queues a key event.
    pub fn push_key(&mut self, event: KeyEvent) {
        self.pending.keys.push(event);
    }

    /// Takes every queued event.
    pub fn drain(&mut self) -> InputBatch {
        std::mem::take(&mut self.pending)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.pending.motion.len() + self.pending.keys.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Motion events dropped by the source filter so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
