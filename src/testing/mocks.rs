//! Mock implementation of the page collaborator.
//!
//! [`MockPage`] is a scripted page: a current location, a history stack, a
//! list of items, per-location control labels, and where clicking each item
//! leads. It records every side effect so tests can assert on the exact
//! sequence of clicks, back-navigations and scrolls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{Result, WalkError};
use crate::page::{ControlHandle, ItemHandle, PageDriver};

/// A side effect performed against a [`MockPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    ClickItem(usize),
    ClickControl(String),
    Back,
    Scroll(f64),
}

#[derive(Debug, Default)]
struct PageState {
    location: String,
    history: Vec<String>,
    items: Vec<ItemHandle>,
    controls: HashMap<String, Vec<String>>,
    item_targets: HashMap<usize, String>,
    more_on_scroll: Vec<String>,
    failures: VecDeque<String>,
    actions: Vec<PageAction>,
}

impl PageState {
    fn take_failure(&mut self, operation: &str) -> Result<()> {
        match self.failures.pop_front() {
            Some(message) => Err(WalkError::page(operation, message)),
            None => Ok(()),
        }
    }

    fn navigate(&mut self, location: String) {
        let previous = std::mem::replace(&mut self.location, location);
        self.history.push(previous);
    }
}

/// Scripted page double.
///
/// # Example
///
/// ```rust,ignore
/// let page = MockPage::new("https://bank.test/offer-hub")
///     .with_items(["Coffee", "Groceries"])
///     .with_item_target(0, "https://bank.test/offer/coffee")
///     .with_controls_at("https://bank.test/offer/coffee", ["Add to card"]);
/// ```
#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<PageState>,
}

impl MockPage {
    /// Create a page showing `location` with no items.
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            state: Mutex::new(PageState {
                location: location.to_string(),
                ..PageState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the list items by label; positions follow the given order.
    #[must_use]
    pub fn with_items<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state();
            state.items = labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| ItemHandle::new(i).with_label(label))
                .collect();
        }
        self
    }

    /// Control labels shown while at the current location.
    #[must_use]
    pub fn with_control_labels<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let location = self.location();
        self.with_controls_at(&location, labels)
    }

    /// Control labels shown while at `location`.
    #[must_use]
    pub fn with_controls_at<I, S>(self, location: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state();
            state.controls.insert(
                location.to_string(),
                labels.into_iter().map(Into::into).collect(),
            );
        }
        self
    }

    /// Clicking the item at `position` navigates to `location`.
    #[must_use]
    pub fn with_item_target(self, position: usize, location: &str) -> Self {
        self.state()
            .item_targets
            .insert(position, location.to_string());
        self
    }

    /// Items appended (by label) the next time the page is scrolled.
    #[must_use]
    pub fn with_more_on_scroll<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().more_on_scroll = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Make the next side effect fail with `message`. Calls queue up, one
    /// failure per side effect.
    pub fn fail_next(&self, message: &str) {
        self.state().failures.push_back(message.to_string());
    }

    /// Jump to `location` as if the host page redirected there.
    pub fn redirect(&self, location: &str) {
        self.state().navigate(location.to_string());
    }

    /// Remove all items, as if the list had not loaded yet.
    pub fn clear_items(&self) {
        self.state().items.clear();
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.state().location.clone()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.state().items.len()
    }

    /// Side effects performed so far, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<PageAction> {
        self.state().actions.clone()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn current_location(&self) -> Result<String> {
        Ok(self.location())
    }

    async fn list_items(&self) -> Result<Vec<ItemHandle>> {
        Ok(self.state().items.clone())
    }

    async fn control_labels(&self) -> Result<Vec<String>> {
        let state = self.state();
        Ok(state
            .controls
            .get(&state.location)
            .cloned()
            .unwrap_or_default())
    }

    async fn click_item(&self, item: &ItemHandle) -> Result<()> {
        let mut state = self.state();
        state.take_failure("click_item")?;
        if item.position >= state.items.len() {
            return Err(WalkError::stale(format!("item {}", item.position)));
        }
        state.actions.push(PageAction::ClickItem(item.position));
        if let Some(target) = state.item_targets.get(&item.position).cloned() {
            state.navigate(target);
        }
        Ok(())
    }

    async fn click_control(&self, control: &ControlHandle) -> Result<()> {
        let mut state = self.state();
        state.take_failure("click_control")?;
        state.actions.push(PageAction::ClickControl(control.label.clone()));
        Ok(())
    }

    async fn navigate_back(&self) -> Result<()> {
        let mut state = self.state();
        state.take_failure("navigate_back")?;
        state.actions.push(PageAction::Back);
        if let Some(previous) = state.history.pop() {
            state.location = previous;
        }
        Ok(())
    }

    async fn scroll_down(&self, fraction: f64) -> Result<()> {
        let mut state = self.state();
        state.take_failure("scroll_down")?;
        state.actions.push(PageAction::Scroll(fraction));
        let more = std::mem::take(&mut state.more_on_scroll);
        let start = state.items.len();
        state.items.extend(
            more.into_iter()
                .enumerate()
                .map(|(i, label)| ItemHandle::new(start + i).with_label(label)),
        );
        Ok(())
    }
}
