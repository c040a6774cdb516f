//! The tick engine.
//!
//! [`decide`] is a pure function of what the page shows right now and the
//! stored [`ProgressRecord`]. It returns exactly one [`Intent`] and the record
//! to persist before that intent is carried out. Nothing else is remembered
//! between ticks, so a reload or a slow navigation only means the next tick
//! sees a different page.
//!
//! Priority, first match wins:
//!
//! ```text
//! not running                  -> NoOp                 record unchanged
//! detour page                  -> SkipAndGoBack        index + 1
//! list page, no items          -> HaltNoItems          running = false
//! list page, index >= len      -> ScrollForMore        record unchanged
//! list page                    -> OpenItem(items[i])   record unchanged
//! detail page, control found   -> ActivateThenGoBack   index + 1
//! detail page, no control      -> SkipThenGoBack       index + 1
//! ```

pub mod intent;

use crate::page::{ControlHandle, ItemHandle};
use crate::record::ProgressRecord;

pub use intent::{Intent, PageClassification};

/// Outcome of one call to [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub intent: Intent,
    /// Record to persist before the intent is executed.
    pub record: ProgressRecord,
}

impl Decision {
    fn new(intent: Intent, record: ProgressRecord) -> Self {
        Self { intent, record }
    }
}

/// Choose the next action.
///
/// `items` is only consulted on the list page and `control` only on a detail
/// page; callers may pass empty values for the other regimes.
#[must_use]
pub fn decide(
    classification: PageClassification,
    items: &[ItemHandle],
    control: Option<&ControlHandle>,
    record: &ProgressRecord,
) -> Decision {
    let record = *record;

    if !record.running {
        return Decision::new(Intent::NoOp, record);
    }

    match classification {
        PageClassification::Detour => Decision::new(Intent::SkipAndGoBack, record.advanced()),
        PageClassification::List => {
            if items.is_empty() {
                return Decision::new(Intent::HaltNoItems, record.halted());
            }
            match items.get(record.index) {
                Some(item) => Decision::new(
                    Intent::OpenItem {
                        item: item.clone(),
                        total: items.len(),
                    },
                    record,
                ),
                None => Decision::new(Intent::ScrollForMore, record),
            }
        }
        PageClassification::Detail => match control {
            Some(control) => Decision::new(
                Intent::ActivateThenGoBack {
                    control: control.clone(),
                },
                record.advanced(),
            ),
            None => Decision::new(Intent::SkipThenGoBack, record.advanced()),
        },
    }
}
