//! Minimal serde model of the i3 layout tree.
//!
//! Only the fields needed to find the focused container and its workspace
//! are kept; everything else in the JSON is ignored.

use crate::command::{FocusSnapshot, WindowRef};
use serde::Deserialize;

/// Kind of a tree node (`"type"` in the JSON).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    Output,
    #[default]
    Con,
    FloatingCon,
    Workspace,
    Dockarea,
    #[serde(other)]
    Unknown,
}

/// X11 properties of a window container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowProperties {
    #[serde(default)]
    pub class: Option<String>,
}

/// One node of the layout tree.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub focused: bool,
    /// Child ids, most recently focused first.
    #[serde(default)]
    pub focus: Vec<u64>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub floating_nodes: Vec<Node>,
    #[serde(default)]
    pub window_properties: Option<WindowProperties>,
    /// Set by sway for Wayland-native windows.
    #[serde(default)]
    pub app_id: Option<String>,
}

impl Node {
    fn children(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().chain(self.floating_nodes.iter())
    }

    /// The focused node strictly below this one.
    pub fn find_focused(&self) -> Option<&Node> {
        self.children()
            .find_map(|child| if child.focused { Some(child) } else { child.find_focused() })
    }

    /// Follow the focus stack down to a leaf.  `None` when this node has no
    /// children.
    pub fn focused_leaf(&self) -> Option<&Node> {
        let first = self.focus.first()?;
        let child = self.children().find(|c| c.id == *first)?;
        Some(child.focused_leaf().unwrap_or(child))
    }

    /// The window a workspace would give focus to: the focused descendant,
    /// or the head of its focus stack when focus is elsewhere.
    pub fn focused_window(&self) -> Option<&Node> {
        self.find_focused().or_else(|| self.focused_leaf())
    }

    /// Find the focused node together with the workspace that contains it.
    ///
    /// When a workspace is empty it is itself the focused node, in which
    /// case both halves of the pair are the workspace.
    pub fn find_focused_with_workspace(&self) -> Option<(&Node, &Node)> {
        self.focused_under(None)
    }

    fn focused_under<'a>(&'a self, workspace: Option<&'a Node>) -> Option<(&'a Node, &'a Node)> {
        let workspace = if self.node_type == NodeType::Workspace {
            Some(self)
        } else {
            workspace
        };
        if self.focused {
            return workspace.map(|ws| (ws, self));
        }
        self.children().find_map(|child| child.focused_under(workspace))
    }

    /// Reduce this container to what the history keeps.
    pub fn window_ref(&self) -> WindowRef {
        let class = self
            .window_properties
            .as_ref()
            .and_then(|p| p.class.clone())
            .or_else(|| self.app_id.clone());
        WindowRef {
            id: self.id,
            class,
            name: self.name.clone(),
        }
    }

    /// Build a [`FocusSnapshot`] from the root of the tree.
    pub fn focus_snapshot(&self) -> Option<FocusSnapshot> {
        let (workspace, focused) = self.find_focused_with_workspace()?;
        let window = if focused.id == workspace.id {
            None
        } else {
            Some(focused.window_ref())
        };
        Some(FocusSnapshot {
            workspace: workspace.name.clone().unwrap_or_default(),
            window,
        })
    }
}
