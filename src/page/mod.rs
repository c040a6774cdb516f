//! Page collaborator interface.
//!
//! Everything that touches the live page sits behind [`PageDriver`]: reading
//! the location, enumerating items, reading control labels, and the three
//! side effects (click, back, scroll). The walker itself never queries the
//! DOM; it works with the opaque [`ItemHandle`] and [`ControlHandle`] values
//! a driver hands out.
//!
//! - [`classifier`] - location to [`PageClassification`]
//! - [`matcher`] - which control label counts as the action control
//! - `chrome` - a driver over the DevTools protocol (feature `chrome`)

pub mod classifier;
pub mod matcher;

#[cfg(feature = "chrome")]
pub mod chrome;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use crate::engine::PageClassification;
pub use classifier::PageClassifier;
pub use matcher::ControlMatcher;

/// One selectable item on the list page.
///
/// `position` is the item's index in document order at the time it was listed;
/// drivers resolve it back to a live element when acting on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHandle {
    pub position: usize,
    #[serde(default)]
    pub label: Option<String>,
}

impl ItemHandle {
    #[must_use]
    pub fn new(position: usize) -> Self {
        Self {
            position,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for logs; empty when the item has none.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// The action control found on a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlHandle {
    /// Index among the page's candidate controls, in document order.
    pub position: usize,
    /// The control's visible label as read from the page.
    pub label: String,
}

/// Capabilities the host page provides.
///
/// Implementations must be cheap to call once per tick. None of the methods
/// wait for navigation to finish; the next tick observes whatever page results.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Current navigable location (URL).
    async fn current_location(&self) -> Result<String>;

    /// Selectable items on the current page, in document order. May be empty.
    async fn list_items(&self) -> Result<Vec<ItemHandle>>;

    /// Visible labels of candidate controls, in document order.
    async fn control_labels(&self) -> Result<Vec<String>>;

    /// Bring the item into view and click it.
    async fn click_item(&self, item: &ItemHandle) -> Result<()>;

    /// Click an action control.
    async fn click_control(&self, control: &ControlHandle) -> Result<()>;

    /// Go back one entry in history.
    async fn navigate_back(&self) -> Result<()>;

    /// Scroll down by `fraction` of the viewport height.
    async fn scroll_down(&self, fraction: f64) -> Result<()>;
}

/// Locate the action control on the current page, if any.
pub async fn find_action_control<D>(
    driver: &D,
    matcher: &ControlMatcher,
) -> Result<Option<ControlHandle>>
where
    D: PageDriver + ?Sized,
{
    let labels = driver.control_labels().await?;
    Ok(matcher.find(&labels))
}
