use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyboardInput { key: KeyCode, pressed: bool },
}

impl InputEvent {
    /// Keys the platform can't identify are dropped.
    pub fn keyboard_input(event: &KeyEvent) -> Option<InputEvent> {
        match event.physical_key {
            PhysicalKey::Code(key) => Some(InputEvent::KeyboardInput {
                key,
                pressed: event.state == ElementState::Pressed,
            }),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyboardInput {
                key: KeyCode::Escape,
                pressed: true
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::InputEvent;

    #[test]
    fn only_pressing_escape_exits() {
        let press = |key, pressed| InputEvent::KeyboardInput { key, pressed };
        assert!(press(KeyCode::Escape, true).is_exit());
        assert!(!press(KeyCode::Escape, false).is_exit());
        assert!(!press(KeyCode::Space, true).is_exit());
    }
}
