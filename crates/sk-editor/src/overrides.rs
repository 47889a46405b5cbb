//! UI override composition.
//!
//! Hosts customize menus, actions, tools and translations by passing a list
//! of `UiOverrides`. `merge_overrides` folds them into one `MergedOverrides`:
//! list-producing kinds run each override in order over the schema so far,
//! translations merge per locale and then per key, later overrides winning.

use crate::editor::Editor;
use crate::shortcuts::ShortcutAction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ─── Schemas ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: String,
    pub label: String,
    pub kbd: Option<String>,
    /// Available while the document is read-only.
    #[serde(default)]
    pub readonly_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolItem {
    pub id: String,
    pub label: String,
    pub kbd: Option<String>,
    /// State entered when the tool is picked.
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItem {
    /// Runs the action or tool with this id.
    Item { id: String },
    Group { id: String, children: Vec<MenuItem> },
    Submenu {
        id: String,
        label: String,
        children: Vec<MenuItem>,
    },
}

impl MenuItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Item { id } | Self::Group { id, .. } | Self::Submenu { id, .. } => id,
        }
    }
}

pub type ActionsSchema = BTreeMap<String, ActionItem>;
pub type ToolsSchema = BTreeMap<String, ToolItem>;
pub type MenuSchema = Vec<MenuItem>;
/// Locale → message key → text.
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Named values handed to every override, e.g. `is_mobile`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Helpers(BTreeMap<String, Value>);

impl Helpers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The helpers every override receives.
    pub fn defaults(editor: &Editor) -> Self {
        Self::new().with("is_mobile", editor.config().is_mobile)
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_mobile(&self) -> bool {
        self.get("is_mobile")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `self` overlaid with `other`; `other` wins on collisions.
    pub fn merged(&self, other: &Helpers) -> Helpers {
        let mut merged = self.clone();
        merged
            .0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

// ─── Overrides ───────────────────────────────────────────────────────────

/// Rewrites one schema, given the editor and helpers.
pub type Override<S> = Box<dyn Fn(&Editor, S, &Helpers) -> S>;

#[derive(Default)]
pub struct UiOverrides {
    pub actions: Option<Override<ActionsSchema>>,
    pub actions_menu: Option<Override<MenuSchema>>,
    pub context_menu: Option<Override<MenuSchema>>,
    pub help_menu: Option<Override<MenuSchema>>,
    pub menu: Option<Override<MenuSchema>>,
    pub toolbar: Option<Override<MenuSchema>>,
    pub keyboard_shortcuts_menu: Option<Override<MenuSchema>>,
    pub tools: Option<Override<ToolsSchema>>,
    pub translations: Option<Translations>,
}

/// The composed override set.
pub struct MergedOverrides {
    overrides: Vec<UiOverrides>,
    default_helpers: Helpers,
    /// Translations, already merged.
    pub translations: Translations,
}

pub fn merge_overrides(overrides: Vec<UiOverrides>, default_helpers: Helpers) -> MergedOverrides {
    let translations = merged_translations(&overrides);
    MergedOverrides {
        overrides,
        default_helpers,
        translations,
    }
}

/// Merge translation tables per locale, then per key. Later entries win.
pub fn merged_translations(overrides: &[UiOverrides]) -> Translations {
    let mut merged = Translations::new();
    for table in overrides.iter().filter_map(|o| o.translations.as_ref()) {
        for (locale, strings) in table {
            merged
                .entry(locale.clone())
                .or_default()
                .extend(strings.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    merged
}

impl MergedOverrides {
    fn fold<S>(
        &self,
        editor: &Editor,
        mut schema: S,
        helpers: &Helpers,
        pick: impl Fn(&UiOverrides) -> Option<&Override<S>>,
    ) -> S {
        for apply in self.overrides.iter().filter_map(&pick) {
            schema = apply(editor, schema, helpers);
        }
        schema
    }

    /// Actions only ever see the default helpers.
    pub fn actions(&self, editor: &Editor, schema: ActionsSchema) -> ActionsSchema {
        self.fold(editor, schema, &self.default_helpers, |o| o.actions.as_ref())
    }

    pub fn tools(&self, editor: &Editor, schema: ToolsSchema, helpers: &Helpers) -> ToolsSchema {
        let helpers = self.default_helpers.merged(helpers);
        self.fold(editor, schema, &helpers, |o| o.tools.as_ref())
    }

    pub fn actions_menu(&self, editor: &Editor, schema: MenuSchema, helpers: &Helpers) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.actions_menu.as_ref())
    }

    pub fn context_menu(&self, editor: &Editor, schema: MenuSchema, helpers: &Helpers) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.context_menu.as_ref())
    }

    pub fn help_menu(&self, editor: &Editor, schema: MenuSchema, helpers: &Helpers) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.help_menu.as_ref())
    }

    pub fn menu(&self, editor: &Editor, schema: MenuSchema, helpers: &Helpers) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.menu.as_ref())
    }

    pub fn toolbar(&self, editor: &Editor, schema: MenuSchema, helpers: &Helpers) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.toolbar.as_ref())
    }

    pub fn keyboard_shortcuts_menu(
        &self,
        editor: &Editor,
        schema: MenuSchema,
        helpers: &Helpers,
    ) -> MenuSchema {
        self.menu_fold(editor, schema, helpers, |o| o.keyboard_shortcuts_menu.as_ref())
    }

    fn menu_fold(
        &self,
        editor: &Editor,
        schema: MenuSchema,
        helpers: &Helpers,
        pick: impl Fn(&UiOverrides) -> Option<&Override<MenuSchema>>,
    ) -> MenuSchema {
        let helpers = self.default_helpers.merged(helpers);
        self.fold(editor, schema, &helpers, pick)
    }
}

// ─── Defaults ────────────────────────────────────────────────────────────

fn label(action: ShortcutAction) -> String {
    let id = action.id().replace('-', " ");
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One tool per tool-switch shortcut.
pub fn default_tools() -> ToolsSchema {
    ShortcutAction::ALL
        .iter()
        .filter_map(|&action| {
            let state = action.tool_state()?;
            Some((
                action.id().to_string(),
                ToolItem {
                    id: action.id().to_string(),
                    label: label(action),
                    kbd: Some(action.kbd().to_string()),
                    state: state.to_string(),
                },
            ))
        })
        .collect()
}

/// One action per non-tool shortcut.
pub fn default_actions() -> ActionsSchema {
    ShortcutAction::ALL
        .iter()
        .filter(|action| action.tool_state().is_none())
        .map(|&action| {
            (
                action.id().to_string(),
                ActionItem {
                    id: action.id().to_string(),
                    label: label(action),
                    kbd: Some(action.kbd().to_string()),
                    readonly_ok: matches!(action, ShortcutAction::Cancel),
                },
            )
        })
        .collect()
}

/// Toolbar listing every default tool.
pub fn default_toolbar() -> MenuSchema {
    default_tools()
        .into_keys()
        .map(|id| MenuItem::Item { id })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default()).unwrap()
    }

    fn strings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn list_overrides_fold_in_order() {
        let first = UiOverrides {
            toolbar: Some(Box::new(|_: &Editor, mut schema: MenuSchema, _: &Helpers| {
                schema.push(MenuItem::Item { id: "laser".into() });
                schema
            })),
            ..UiOverrides::default()
        };
        let second = UiOverrides {
            toolbar: Some(Box::new(|_: &Editor, schema: MenuSchema, _: &Helpers| -> MenuSchema {
                // Sees the item the first override added.
                schema.into_iter().filter(|i| i.id() != "geo").collect()
            })),
            ..UiOverrides::default()
        };
        let editor = editor();
        let merged = merge_overrides(vec![first, second], Helpers::defaults(&editor));
        let toolbar = merged.toolbar(&editor, default_toolbar(), &Helpers::new());
        let ids: Vec<_> = toolbar.iter().map(MenuItem::id).collect();
        assert_eq!(ids, vec!["frame", "select", "laser"]);
    }

    #[test]
    fn call_site_helpers_win_except_for_actions() {
        let seen = |_: &Editor, mut schema: ActionsSchema, helpers: &Helpers| {
            let item = ActionItem {
                id: "mobile-check".into(),
                label: helpers.is_mobile().to_string(),
                kbd: None,
                readonly_ok: false,
            };
            schema.insert(item.id.clone(), item);
            schema
        };
        let tools = |_: &Editor, mut schema: ToolsSchema, helpers: &Helpers| {
            if helpers.is_mobile() {
                schema.remove("frame");
            }
            schema
        };
        let editor = editor();
        let merged = merge_overrides(
            vec![UiOverrides {
                actions: Some(Box::new(seen)),
                tools: Some(Box::new(tools)),
                ..UiOverrides::default()
            }],
            Helpers::defaults(&editor),
        );
        let mobile = Helpers::new().with("is_mobile", true);

        let tools = merged.tools(&editor, default_tools(), &mobile);
        assert!(!tools.contains_key("frame"));

        let actions = merged.actions(&editor, default_actions());
        assert_eq!(actions["mobile-check"].label, "false");
    }

    #[test]
    fn translations_merge_per_key() {
        let a = UiOverrides {
            translations: Some(BTreeMap::from([
                ("en".to_string(), strings(&[("tool.geo", "Shape"), ("tool.frame", "Frame")])),
                ("fr".to_string(), strings(&[("tool.geo", "Forme")])),
            ])),
            ..UiOverrides::default()
        };
        let b = UiOverrides {
            translations: Some(BTreeMap::from([(
                "en".to_string(),
                strings(&[("tool.geo", "Rectangle")]),
            )])),
            ..UiOverrides::default()
        };
        let merged = merged_translations(&[a, UiOverrides::default(), b]);
        assert_eq!(
            merged["en"],
            strings(&[("tool.frame", "Frame"), ("tool.geo", "Rectangle")])
        );
        assert_eq!(merged["fr"], strings(&[("tool.geo", "Forme")]));
    }

    #[test]
    fn no_overrides_is_identity() {
        let editor = editor();
        let merged = merge_overrides(Vec::new(), Helpers::defaults(&editor));
        assert_eq!(merged.actions(&editor, default_actions()), default_actions());
        assert_eq!(merged.menu(&editor, MenuSchema::new(), &Helpers::new()), MenuSchema::new());
        assert!(merged.translations.is_empty());
    }

    #[test]
    fn defaults_follow_shortcuts() {
        let tools = default_tools();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools["geo"].kbd.as_deref(), Some("r"));
        assert_eq!(tools["geo"].state, "geo");
        let actions = default_actions();
        assert_eq!(actions["undo"].kbd.as_deref(), Some("$z"));
        assert_eq!(actions["select-all"].label, "Select all");
    }
}
