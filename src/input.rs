/// Current keyboard input.
#[derive(Debug, Default)]
pub struct Input {
    /// Steer the beam counter-clockwise.
    pub left_pressed: bool,
    /// Steer the beam clockwise.
    pub right_pressed: bool,
    /// Restart the episode with a fresh seed.
    pub reset_pressed: bool,
}

impl Input {
    /// Motor command encoded by the held keys.
    pub fn action(&self) -> f32 {
        let mut action = 0.0;
        if self.left_pressed {
            action -= 1.0;
        }
        if self.right_pressed {
            action += 1.0;
        }

        action
    }
}
