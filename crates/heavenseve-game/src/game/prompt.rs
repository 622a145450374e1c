//! Interaction prompt service
//!
//! Three independent text surfaces:
//!   - the message panel: one prompt at a time, shown and hidden on demand
//!   - the interaction line: the current task of the scene ("- Regalos: 1/3")
//!   - the mission text: always visible, owned by the mission tracker

/// Text the HUD shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptService {
    message: Option<String>,
    interaction: String,
    mission_text: String,
}

impl PromptService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the panel with `text`, replacing any previous prompt
    pub fn show_message(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!("Prompt: {}", text);
        self.message = Some(text);
    }

    pub fn hide_message(&mut self) {
        self.message = None;
    }

    /// Text of the visible panel, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn show_interaction(&mut self, text: impl Into<String>) {
        self.interaction = text.into();
    }

    pub fn interaction(&self) -> &str {
        &self.interaction
    }

    pub fn set_mission_text(&mut self, text: impl Into<String>) {
        self.mission_text = text.into();
    }

    pub fn mission_text(&self) -> &str {
        &self.mission_text
    }

    /// Hide the panel and blank the interaction line; the mission text stays
    pub fn clear_scene_texts(&mut self) {
        self.message = None;
        self.interaction.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_replaces_previous() {
        let mut p = PromptService::new();
        p.show_message("[E para hablar]");
        p.show_message("[E para abrir]");
        assert_eq!(p.message(), Some("[E para abrir]"));
        p.hide_message();
        assert_eq!(p.message(), None);
    }

    #[test]
    fn scene_clear_keeps_mission_text() {
        let mut p = PromptService::new();
        p.set_mission_text("Regalos: 1/3");
        p.show_interaction("- Regalos: 1/3");
        p.show_message("hola");
        p.clear_scene_texts();
        assert_eq!(p.mission_text(), "Regalos: 1/3");
        assert_eq!(p.interaction(), "");
        assert!(p.message().is_none());
    }
}
