use crate::events::{KeyCode, KeyState, Modifiers};
use smallvec::SmallVec;

/// Отслеживание физически зажатых клавиш-модификаторов.
///
/// Левая и правая клавиши учитываются раздельно: отпускание правого Ctrl не
/// снимает Control, пока зажат левый.
#[derive(Debug, Default)]
pub struct ModifierState {
    held: SmallVec<[KeyCode; 8]>,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_modifiers(&self) -> Modifiers {
        self.held.iter().filter_map(|key| key.modifier()).collect()
    }

    /// Обновить состояние; возвращает true, если клавиша является модификатором
    pub fn update_key(&mut self, key: KeyCode, state: KeyState) -> bool {
        if !key.is_modifier() {
            return false;
        }
        match state {
            KeyState::Pressed | KeyState::Repeat => {
                if !self.held.contains(&key) {
                    self.held.push(key);
                }
            }
            KeyState::Released => self.held.retain(|k| *k != key),
        }
        true
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ModifierKey;

    #[test]
    fn test_press_and_release() {
        let mut state = ModifierState::new();
        assert!(state.update_key(KeyCode::LeftControl, KeyState::Pressed));
        assert!(state.update_key(KeyCode::LeftShift, KeyState::Pressed));
        assert_eq!(state.to_modifiers(), Modifiers::new().with_ctrl(true).with_shift(true));

        state.update_key(KeyCode::LeftShift, KeyState::Released);
        assert_eq!(state.to_modifiers(), Modifiers::new().with_ctrl(true));
    }

    #[test]
    fn test_left_and_right_tracked_separately() {
        let mut state = ModifierState::new();
        state.update_key(KeyCode::LeftControl, KeyState::Pressed);
        state.update_key(KeyCode::RightControl, KeyState::Pressed);
        state.update_key(KeyCode::RightControl, KeyState::Released);
        assert!(state.to_modifiers().contains(ModifierKey::Control));

        state.update_key(KeyCode::LeftControl, KeyState::Released);
        assert!(state.to_modifiers().is_empty());
    }

    #[test]
    fn test_non_modifier_ignored() {
        let mut state = ModifierState::new();
        assert!(!state.update_key(KeyCode::K, KeyState::Pressed));
        assert!(state.to_modifiers().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut state = ModifierState::new();
        state.update_key(KeyCode::LeftAlt, KeyState::Repeat);
        state.reset();
        assert!(state.to_modifiers().is_empty());
    }
}
