//! Hotspot input routing.
//!
//! A widget listens to either pointer or touch events, chosen once from the
//! device's capabilities. Events of the other kind are ignored.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// enter activates, leave deactivates
    Pointer,
    /// start activates, end or cancel deactivates
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
    TouchCancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Activate,
    Deactivate,
}

impl InputMode {
    pub fn action(self, event: InputEvent) -> Option<Action> {
        use InputEvent::*;
        match (self, event) {
            (InputMode::Pointer, PointerEnter) | (InputMode::Touch, TouchStart) => {
                Some(Action::Activate)
            }
            (InputMode::Pointer, PointerLeave)
            | (InputMode::Touch, TouchEnd)
            | (InputMode::Touch, TouchCancel) => Some(Action::Deactivate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_mode_ignores_touch() {
        let mode = InputMode::Pointer;
        assert_eq!(mode.action(InputEvent::PointerEnter), Some(Action::Activate));
        assert_eq!(mode.action(InputEvent::PointerLeave), Some(Action::Deactivate));
        assert_eq!(mode.action(InputEvent::TouchStart), None);
        assert_eq!(mode.action(InputEvent::TouchEnd), None);
    }

    #[test]
    fn touch_mode_ignores_pointer() {
        let mode = InputMode::Touch;
        assert_eq!(mode.action(InputEvent::TouchStart), Some(Action::Activate));
        assert_eq!(mode.action(InputEvent::TouchEnd), Some(Action::Deactivate));
        assert_eq!(mode.action(InputEvent::TouchCancel), Some(Action::Deactivate));
        assert_eq!(mode.action(InputEvent::PointerEnter), None);
    }
}
