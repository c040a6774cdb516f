//! Testing infrastructure for tilewalk.
//!
//! Test doubles for the page collaborator, so the walker can be exercised
//! end to end without a browser. Pair [`MockPage`] with
//! [`ProgressStore::in_memory`](crate::store::ProgressStore::in_memory).
//!
//! # Example
//!
//! ```rust,ignore
//! use tilewalk::testing::MockPage;
//!
//! let page = MockPage::new("https://bank.test/offer-hub")
//!     .with_items(["Coffee", "Fuel"])
//!     .with_item_target(0, "https://bank.test/offer/coffee");
//! ```

pub mod mocks;

pub use mocks::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ControlHandle, ItemHandle, PageDriver};

    const HUB: &str = "https://bank.test/offer-hub";

    #[tokio::test]
    async fn test_mock_page_defaults() {
        let page = MockPage::new(HUB);
        assert_eq!(page.current_location().await.unwrap(), HUB);
        assert!(page.list_items().await.unwrap().is_empty());
        assert!(page.control_labels().await.unwrap().is_empty());
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_click_item_follows_target_and_back_returns() {
        let page = MockPage::new(HUB)
            .with_items(["a", "b"])
            .with_item_target(1, "https://bank.test/offer/b");

        let items = page.list_items().await.unwrap();
        assert_eq!(items[1].display_label(), "b");

        page.click_item(&items[1]).await.unwrap();
        assert_eq!(page.location(), "https://bank.test/offer/b");

        page.navigate_back().await.unwrap();
        assert_eq!(page.location(), HUB);
        assert_eq!(
            page.actions(),
            vec![PageAction::ClickItem(1), PageAction::Back]
        );
    }

    #[tokio::test]
    async fn test_click_item_without_target_stays() {
        let page = MockPage::new(HUB).with_items(["a"]);
        page.click_item(&ItemHandle::new(0)).await.unwrap();
        assert_eq!(page.location(), HUB);
    }

    #[tokio::test]
    async fn test_stale_item_errors() {
        let page = MockPage::new(HUB).with_items(["a"]);
        let err = page.click_item(&ItemHandle::new(3)).await.unwrap_err();
        assert!(err.is_transient());
        assert!(page.actions().is_empty());
    }

    #[tokio::test]
    async fn test_controls_are_per_location() {
        let page = MockPage::new(HUB)
            .with_items(["a"])
            .with_item_target(0, "https://bank.test/offer/a")
            .with_controls_at("https://bank.test/offer/a", ["Enroll"]);

        assert!(page.control_labels().await.unwrap().is_empty());
        page.click_item(&ItemHandle::new(0)).await.unwrap();
        assert_eq!(page.control_labels().await.unwrap(), vec!["Enroll"]);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let page = MockPage::new(HUB);
        page.fail_next("detached");
        let control = ControlHandle {
            position: 0,
            label: "Add".to_string(),
        };
        assert!(page.click_control(&control).await.is_err());
        assert!(page.click_control(&control).await.is_ok());
    }

    #[tokio::test]
    async fn test_scroll_appends_more_items_once() {
        let page = MockPage::new(HUB)
            .with_items(["a"])
            .with_more_on_scroll(["b", "c"]);

        page.scroll_down(0.9).await.unwrap();
        let items = page.list_items().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], ItemHandle::new(2).with_label("c"));

        page.scroll_down(0.9).await.unwrap();
        assert_eq!(page.item_count(), 3);
        assert_eq!(
            page.actions(),
            vec![PageAction::Scroll(0.9), PageAction::Scroll(0.9)]
        );
    }

    #[tokio::test]
    async fn test_redirect_and_back() {
        let page = MockPage::new(HUB);
        page.redirect("https://bank.test/bookmarks");
        page.navigate_back().await.unwrap();
        assert_eq!(page.location(), HUB);
        // Back with empty history stays put.
        page.navigate_back().await.unwrap();
        assert_eq!(page.location(), HUB);
    }
}
