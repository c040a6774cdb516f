//! The walker: one object that owns the store, the page driver and the
//! schedule, and exposes the control operations.
//!
//! A tick runs in four steps:
//!
//! 1. Load the record; if absent or not running, stop here.
//! 2. Observe the page: classify the location, then list items (list page)
//!    or look for the action control (detail page).
//! 3. [`decide`](crate::engine::decide), re-read the record, and persist the
//!    new one. If the record changed while the page was being read (a stop,
//!    reset or restart from another process), the tick is dropped.
//! 4. Carry out the intent against the page.
//!
//! Persisting before step 4 means a navigation triggered by the intent can
//! lose at most that one action, never the cursor. Records that neither
//! change nor precede a navigation are not rewritten.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::WalkConfig;
use crate::control::{ControlOutcome, Controls, Status};
use crate::engine::{self, Decision, Intent, PageClassification};
use crate::error::Result;
use crate::page::{self, ControlHandle, ControlMatcher, ItemHandle, PageClassifier, PageDriver};
use crate::record::ProgressRecord;
use crate::scheduler::{Scheduler, SchedulerHandle, Tick};
use crate::store::ProgressStore;

/// What the page showed on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub location: String,
    pub classification: PageClassification,
    pub items: Vec<ItemHandle>,
    pub control: Option<ControlHandle>,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// No record, or not running. The page was not looked at.
    Idle,
    /// The engine ran and its intent was carried out.
    Acted {
        classification: PageClassification,
        intent: Intent,
        record: ProgressRecord,
    },
}

/// Delays and amounts used when carrying out intents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub activate_settle: Duration,
    pub detour_settle: Duration,
    pub scroll_fraction: f64,
}

impl Pacing {
    /// No settle delays; for tests and simulations.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            activate_settle: Duration::ZERO,
            detour_settle: Duration::ZERO,
            scroll_fraction: 0.9,
        }
    }
}

impl From<&WalkConfig> for Pacing {
    fn from(config: &WalkConfig) -> Self {
        Self {
            activate_settle: config.schedule.activate_settle(),
            detour_settle: config.schedule.detour_settle(),
            scroll_fraction: config.page.scroll_fraction,
        }
    }
}

/// The item walker.
pub struct Automaton<D> {
    driver: Arc<D>,
    controls: Controls,
    matcher: ControlMatcher,
    scheduler: Scheduler,
    pacing: Pacing,
}

impl<D> std::fmt::Debug for Automaton<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("controls", &self.controls)
            .field("matcher", &self.matcher)
            .field("scheduler", &self.scheduler)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl<D: PageDriver + 'static> Automaton<D> {
    /// Build a walker from configuration. The config is validated here.
    pub fn new(driver: Arc<D>, store: ProgressStore, config: &WalkConfig) -> Result<Self> {
        config.validate()?;
        let classifier = PageClassifier::from_config(&config.page)?;
        Ok(Self {
            driver,
            controls: Controls::new(store, classifier),
            matcher: ControlMatcher::new(&config.page.action_labels),
            scheduler: Scheduler::new(config.schedule.period())?,
            pacing: Pacing::from(config),
        })
    }

    /// Override the pacing taken from configuration.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    #[must_use]
    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    // =========================================================================
    // Control surface
    // =========================================================================

    /// Start a fresh walk if the page is on the list.
    pub async fn start(&self) -> Result<ControlOutcome> {
        let location = self.driver.current_location().await?;
        self.controls.start(&location)
    }

    pub fn resume(&self) -> Result<ControlOutcome> {
        self.controls.resume()
    }

    pub fn stop(&self) -> Result<ControlOutcome> {
        self.controls.stop()
    }

    pub fn reset(&self) -> Result<ControlOutcome> {
        self.controls.reset()
    }

    pub fn status(&self) -> Result<Status> {
        self.controls.status()
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Start ticking on the configured period.
    pub fn spawn(self: &Arc<Self>) -> SchedulerHandle {
        self.scheduler.spawn(Arc::clone(self))
    }

    /// Look at the page without deciding anything.
    pub async fn observe(&self) -> Result<Observation> {
        let location = self.driver.current_location().await?;
        let classification = self.controls.classifier().classify(&location);

        let items = match classification {
            PageClassification::List => self.driver.list_items().await?,
            _ => Vec::new(),
        };
        let control = match classification {
            PageClassification::Detail => {
                page::find_action_control(self.driver.as_ref(), &self.matcher).await?
            }
            _ => None,
        };

        Ok(Observation {
            location,
            classification,
            items,
            control,
        })
    }

    /// Run one tick.
    pub async fn tick_once(&self) -> Result<TickReport> {
        let store = self.controls.store();
        let record = match store.load()? {
            Some(record) if record.running => record,
            _ => return Ok(TickReport::Idle),
        };

        let observation = self.observe().await?;
        let decision = engine::decide(
            observation.classification,
            &observation.items,
            observation.control.as_ref(),
            &record,
        );
        debug!(
            "Tick at {} ({}, {} items, control: {:?}) -> {}",
            observation.location,
            observation.classification,
            observation.items.len(),
            observation.control.as_ref().map(|c| c.label.as_str()),
            decision.intent.name()
        );

        // A stop, reset or restart may have landed while the page was read.
        let current = store.load()?;
        if current != Some(record) {
            debug!(
                "Record changed during tick ({:?}); dropping {}",
                current,
                decision.intent.name()
            );
            return Ok(TickReport::Idle);
        }

        if decision.record != record || decision.intent.may_navigate() {
            store.save(&decision.record)?;
        }
        self.execute(&decision, &record, &observation).await?;

        Ok(TickReport::Acted {
            classification: observation.classification,
            intent: decision.intent,
            record: decision.record,
        })
    }

    async fn execute(
        &self,
        decision: &Decision,
        before: &ProgressRecord,
        observation: &Observation,
    ) -> Result<()> {
        match &decision.intent {
            Intent::NoOp => Ok(()),

            Intent::SkipAndGoBack => {
                warn!(
                    "Detour route detected ({}). Skipping item {} and going back.",
                    observation.location,
                    before.display_position()
                );
                settle(self.pacing.detour_settle).await;
                self.driver.navigate_back().await
            }

            Intent::HaltNoItems => {
                warn!("No items found. Scroll so items load, then resume.");
                Ok(())
            }

            Intent::ScrollForMore => {
                debug!(
                    "All {} loaded items visited; scrolling for more",
                    observation.items.len()
                );
                self.driver.scroll_down(self.pacing.scroll_fraction).await
            }

            Intent::OpenItem { item, total } => {
                info!(
                    "Opening {}/{}: {}",
                    before.display_position(),
                    total,
                    item.display_label()
                );
                self.driver.click_item(item).await
            }

            Intent::ActivateThenGoBack { control } => {
                // The cursor has already moved past this page; leave it even
                // when the click fails so the next tick does not advance twice.
                let clicked = self.driver.click_control(control).await;
                match &clicked {
                    Ok(()) => info!("Clicked '{}'", control.label),
                    Err(e) => warn!("Clicking '{}' failed: {}", control.label, e),
                }
                settle(self.pacing.activate_settle).await;
                let back = self.driver.navigate_back().await;
                if let Err(e) = &back {
                    warn!("Going back after '{}' failed: {}", control.label, e);
                }
                clicked.and(back)
            }

            Intent::SkipThenGoBack => {
                warn!("Action control not found (maybe already added), skipping.");
                self.driver.navigate_back().await
            }
        }
    }
}

async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl<D: PageDriver + 'static> Tick for Automaton<D> {
    async fn tick(&self) -> Result<()> {
        self.tick_once().await.map(|_| ())
    }
}
