//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The root state
//! resolves tool switches, history and Escape; `select.idle` handles the
//! selection actions.
//!
//! - Escape always cancels, whatever modifiers are held
//! - ⌘ / Ctrl combos are checked before single keys
//! - Shift alone never triggers a shortcut, so it stays free for constraints

use sk_core::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolGeo,
    ToolFrame,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    /// Edit the crop of the selected image.
    EnterCrop,

    // ── Interaction ──
    Cancel,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 9] = [
        Self::ToolSelect,
        Self::ToolGeo,
        Self::ToolFrame,
        Self::Undo,
        Self::Redo,
        Self::Delete,
        Self::SelectAll,
        Self::EnterCrop,
        Self::Cancel,
    ];

    /// Stable id used by action and tool schemas.
    pub fn id(self) -> &'static str {
        match self {
            Self::ToolSelect => "select",
            Self::ToolGeo => "geo",
            Self::ToolFrame => "frame",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Delete => "delete",
            Self::SelectAll => "select-all",
            Self::EnterCrop => "crop",
            Self::Cancel => "cancel",
        }
    }

    /// Primary key binding, `$` standing for ⌘ / Ctrl and `!` for Shift.
    pub fn kbd(self) -> &'static str {
        match self {
            Self::ToolSelect => "v",
            Self::ToolGeo => "r",
            Self::ToolFrame => "f",
            Self::Undo => "$z",
            Self::Redo => "!$z",
            Self::Delete => "⌫",
            Self::SelectAll => "$a",
            Self::EnterCrop => "⏎",
            Self::Cancel => "⎋",
        }
    }

    /// Tool switches map to a top-level state.
    pub fn tool_state(self) -> Option<&'static str> {
        match self {
            Self::ToolSelect => Some("select"),
            Self::ToolGeo => Some("geo"),
            Self::ToolFrame => Some("frame"),
            _ => None,
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if key == "Escape" {
            return Some(ShortcutAction::Cancel);
        }

        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        if modifiers.shift || modifiers.alt {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "r" | "R" => Some(ShortcutAction::ToolGeo),
            "f" | "F" => Some(ShortcutAction::ToolFrame),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Enter" => Some(ShortcutAction::EnterCrop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
        meta: true,
    };

    const CTRL: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: true,
        meta: false,
    };

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", Modifiers::NONE),
            Some(ShortcutAction::ToolSelect)
        );
        assert_eq!(
            ShortcutMap::resolve("r", Modifiers::NONE),
            Some(ShortcutAction::ToolGeo)
        );
        assert_eq!(
            ShortcutMap::resolve("F", Modifiers::NONE),
            Some(ShortcutAction::ToolFrame)
        );
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(ShortcutMap::resolve("z", CMD), Some(ShortcutAction::Undo));
        // Ctrl+Z → Undo
        assert_eq!(ShortcutMap::resolve("z", CTRL), Some(ShortcutAction::Undo));
        // Cmd+Shift+Z → Redo
        let cmd_shift = Modifiers { shift: true, ..CMD };
        assert_eq!(
            ShortcutMap::resolve("z", cmd_shift),
            Some(ShortcutAction::Redo)
        );
        // Ctrl+Y → Redo
        assert_eq!(ShortcutMap::resolve("y", CTRL), Some(ShortcutAction::Redo));
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn escape_ignores_modifiers() {
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::SHIFT),
            Some(ShortcutAction::Cancel)
        );
    }

    #[test]
    fn shift_and_alt_alone_are_free() {
        assert_eq!(ShortcutMap::resolve("Shift", Modifiers::SHIFT), None);
        assert_eq!(ShortcutMap::resolve("v", Modifiers::SHIFT), None);
        assert_eq!(ShortcutMap::resolve("r", Modifiers::ALT), None);
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("7", Modifiers::NONE), None);
    }

    #[test]
    fn resolve_modifier_precedence() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("a", CMD), Some(ShortcutAction::SelectAll));
        assert_eq!(ShortcutMap::resolve("v", CMD), None);
    }

    #[test]
    fn every_action_has_a_distinct_id() {
        let mut ids: Vec<_> = ShortcutAction::ALL.iter().map(|a| a.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ShortcutAction::ALL.len());
    }
}
