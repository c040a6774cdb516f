//! What a tick decided to do.

use serde::{Deserialize, Serialize};

use crate::page::{ControlHandle, ItemHandle};

/// Regime the current page falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageClassification {
    /// The browsable list of items.
    List,
    /// A page the walk should leave immediately.
    Detour,
    /// Anything else; taken to be the page of the item just opened.
    Detail,
}

impl std::fmt::Display for PageClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageClassification::List => write!(f, "list"),
            PageClassification::Detour => write!(f, "detour"),
            PageClassification::Detail => write!(f, "detail"),
        }
    }
}

/// The single action chosen for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Not running; do nothing.
    NoOp,
    /// Landed on a detour page: abandon the current item and go back.
    SkipAndGoBack,
    /// List page shows no items: stop the walk.
    HaltNoItems,
    /// Every listed item has been visited: ask the page for more.
    ScrollForMore,
    /// Open the item at the cursor.
    OpenItem { item: ItemHandle, total: usize },
    /// Click the action control, then go back.
    ActivateThenGoBack { control: ControlHandle },
    /// No action control on the detail page: go back without acting.
    SkipThenGoBack,
}

impl Intent {
    /// Whether executing this intent may navigate away from the page.
    #[must_use]
    pub fn may_navigate(&self) -> bool {
        matches!(
            self,
            Intent::OpenItem { .. }
                | Intent::ActivateThenGoBack { .. }
                | Intent::SkipThenGoBack
                | Intent::SkipAndGoBack
        )
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Intent::NoOp => "no_op",
            Intent::SkipAndGoBack => "skip_and_go_back",
            Intent::HaltNoItems => "halt_no_items",
            Intent::ScrollForMore => "scroll_for_more",
            Intent::OpenItem { .. } => "open_item",
            Intent::ActivateThenGoBack { .. } => "activate_then_go_back",
            Intent::SkipThenGoBack => "skip_then_go_back",
        }
    }
}
