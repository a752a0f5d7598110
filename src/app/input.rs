use crate::render::CameraMovement;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Held arrow keys; each one orbits the camera while down.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
}

impl InputState {
    /// Returns whether the key is one of the camera keys.
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> bool {
        match key {
            PhysicalKey::Code(KeyCode::ArrowLeft) => self.aim_left = pressed,
            PhysicalKey::Code(KeyCode::ArrowRight) => self.aim_right = pressed,
            PhysicalKey::Code(KeyCode::ArrowUp) => self.aim_up = pressed,
            PhysicalKey::Code(KeyCode::ArrowDown) => self.aim_down = pressed,
            _ => return false,
        }
        true
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn movement(&self) -> CameraMovement {
        CameraMovement {
            aim_left: self.aim_left,
            aim_right: self.aim_right,
            aim_up: self.aim_up,
            aim_down: self.aim_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_to_aim_flags() {
        let mut input = InputState::default();
        assert!(input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), true));
        assert!(input.handle_key(PhysicalKey::Code(KeyCode::ArrowUp), true));
        assert!(!input.handle_key(PhysicalKey::Code(KeyCode::KeyW), true));

        let movement = input.movement();
        assert!(movement.aim_left && movement.aim_up);
        assert!(!movement.aim_right && !movement.aim_down);

        input.handle_key(PhysicalKey::Code(KeyCode::ArrowLeft), false);
        assert!(!input.movement().aim_left);
        input.release_all();
        assert!(!input.movement().aim_up);
    }
}
