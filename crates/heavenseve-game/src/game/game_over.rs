//! Game-over panel
//!
//! Fades in on the unscaled clock (the game is paused behind it) and offers
//! restart, main menu and quit, also on R / M / Q.

use crate::engine::{ClockMode, FrameTime, InputFrame, Key};
use crate::game::task::Fade;

/// What the player picked on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverChoice {
    Restart,
    MainMenu,
    Quit,
}

#[derive(Debug)]
pub struct GameOverPanel {
    visible: bool,
    alpha: f32,
    fade: Option<Fade>,
    fade_seconds: f32,
    keyboard_shortcuts: bool,
}

impl GameOverPanel {
    pub fn new(fade_seconds: f32) -> Self {
        Self {
            visible: false,
            alpha: 0.0,
            fade: None,
            fade_seconds,
            keyboard_shortcuts: true,
        }
    }

    /// Show the panel. Showing it again while up does nothing.
    pub fn show(&mut self) -> bool {
        if self.visible {
            return false;
        }
        self.visible = true;
        self.fade = Some(Fade::new(0.0, 1.0, self.fade_seconds, ClockMode::Unscaled));
        tracing::info!("Game over panel shown");
        true
    }

    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.fade = Some(Fade::new(self.alpha, 0.0, self.fade_seconds, ClockMode::Unscaled));
    }

    /// Advance the fade and read the shortcut keys
    pub fn update(&mut self, time: &FrameTime, input: &InputFrame) -> Option<GameOverChoice> {
        if let Some(fade) = &mut self.fade {
            let done = fade.tick(time);
            self.alpha = fade.value();
            if done {
                self.fade = None;
            }
        }
        if !self.visible || !self.keyboard_shortcuts {
            return None;
        }
        if input.pressed(Key::R) {
            Some(GameOverChoice::Restart)
        } else if input.pressed(Key::M) {
            Some(GameOverChoice::MainMenu)
        } else if input.pressed(Key::Q) {
            Some(GameOverChoice::Quit)
        } else {
            None
        }
    }

    /// Drop the panel at once (scene reload)
    pub fn reset(&mut self) {
        self.visible = false;
        self.alpha = 0.0;
        self.fade = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_in_on_real_time() {
        let mut panel = GameOverPanel::new(0.35);
        assert!(panel.show());
        assert!(!panel.show());
        let paused = FrameTime { delta: 0.0, unscaled_delta: 0.2 };
        panel.update(&paused, &InputFrame::none());
        assert!(panel.alpha() > 0.5 && panel.alpha() < 1.0);
        panel.update(&paused, &InputFrame::none());
        assert_eq!(panel.alpha(), 1.0);
    }

    #[test]
    fn shortcuts_only_while_visible() {
        let mut panel = GameOverPanel::new(0.35);
        let t = FrameTime::default();
        assert_eq!(panel.update(&t, &InputFrame::keys(&[Key::R])), None);
        panel.show();
        assert_eq!(panel.update(&t, &InputFrame::keys(&[Key::R])), Some(GameOverChoice::Restart));
        assert_eq!(panel.update(&t, &InputFrame::keys(&[Key::M])), Some(GameOverChoice::MainMenu));
        assert_eq!(panel.update(&t, &InputFrame::keys(&[Key::Q])), Some(GameOverChoice::Quit));
        panel.hide();
        assert!(!panel.is_visible());
    }
}
