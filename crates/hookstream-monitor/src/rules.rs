//! What the monitor does with each event.

use hookstream_core::{
    KeyCombination, KeyTransition, KeyboardEvent, MouseEvent, MouseEventKind,
};
use serde::Serialize;

use crate::config::MonitorConfig;

/// A printed event, tagged with the device it came from.
#[derive(Serialize)]
#[serde(tag = "device", rename_all = "lowercase")]
enum Line<'a> {
    Keyboard(&'a KeyboardEvent),
    Mouse(&'a MouseEvent),
}

/// Swallow and quit decisions plus output formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRules {
    swallow: Vec<KeyCombination>,
    quit: Option<KeyCombination>,
    json: bool,
    log_mouse_moves: bool,
}

impl MonitorRules {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            swallow: config.filters.swallow.clone(),
            quit: config.filters.quit,
            json: config.monitor.json,
            log_mouse_moves: config.monitor.log_mouse_moves,
        }
    }

    /// Presses and repeats matching any swallow combination are swallowed.
    /// Releases always pass so no application sees a key stuck down.
    pub fn should_swallow(&self, event: &KeyboardEvent) -> bool {
        event.transition() != KeyTransition::Up
            && self.swallow.iter().any(|combo| combo.matches(event.state()))
    }

    /// Only the first press of the quit combination counts.
    pub fn should_quit(&self, event: &KeyboardEvent) -> bool {
        event.transition() == KeyTransition::Down
            && self.quit.is_some_and(|combo| combo.matches(event.state()))
    }

    pub fn should_print_mouse(&self, event: &MouseEvent) -> bool {
        self.log_mouse_moves || event.kind() != MouseEventKind::Move
    }

    pub fn format_keyboard(&self, event: &KeyboardEvent) -> String {
        if self.json {
            return to_json(&Line::Keyboard(event));
        }
        let held: Vec<String> = event.state().keys().iter().map(|k| k.to_string()).collect();
        let mut line = format!(
            "key   {:<5} {:<12} scan={:#04x} held=[{}]",
            format!("{:?}", event.transition()),
            event.key().to_string(),
            event.scan_code(),
            held.join("+"),
        );
        if event.is_char_input() {
            line.push_str(&format!(" chars={:?}", event.characters()));
        }
        if event.handled() {
            line.push_str(" swallowed");
        }
        line
    }

    pub fn format_mouse(&self, event: &MouseEvent) -> String {
        if self.json {
            return to_json(&Line::Mouse(event));
        }
        let location = event.location();
        let mut line = format!(
            "mouse {:<16} {:<8} at ({}, {})",
            format!("{:?}", event.kind()),
            format!("{:?}", event.button()),
            location.x,
            location.y,
        );
        if event.delta() != 0 {
            line.push_str(&format!(" delta={}", event.delta()));
        }
        if event.kind() == MouseEventKind::Special {
            line.push_str(&format!(" message={:#06x}", event.message()));
        }
        line
    }
}

fn to_json(line: &Line<'_>) -> String {
    serde_json::to_string(line)
        .unwrap_or_else(|e| format!("{{\"error\":{:?}}}", e.to_string()))
}
