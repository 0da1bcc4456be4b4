//! Cosmetic page state: rotating headline and feature highlight, the mobile
//! nav drawer, and the informational modal. None of it touches the store.
//!
//! The page is rendered server-side without client code, so drawer and modal
//! state travel as query params (`?menu=open`, `?modal=info`) and every
//! transition is a plain link.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const HEADLINE_WORDS: &[&str] = &["Connect", "Collaborate", "Innovate"];

pub const FEATURES: &[&str] = &[
    "Connect with other engineers",
    "Get employed by top engineering firms",
    "Access professional Training Firms for Engineers",
    "Share your engineering contents, innovations, and research updates with the world",
    "Connect with top engineering firms",
    "Collaborate with other Engineering firms",
    "Be visible to the world",
    "Connect with local and international Engineering organizations",
];

/// Primary navigation. None of these exist yet; all of them open the modal.
pub const NAV_LINKS: &[&str] = &["Find Job", "Post a Job", "Companies"];

/// Cycles through `items`, advancing one step every `period` for as long as
/// it is alive. Dropping it stops the ticker.
pub struct Rotator {
    items: &'static [&'static str],
    current: watch::Receiver<usize>,
    ticker: Option<JoinHandle<()>>,
}

impl Rotator {
    /// Must be called from within a tokio runtime. With fewer than two items
    /// (or a zero period) there is nothing to rotate and no ticker is spawned.
    pub fn spawn(
        items: &'static [&'static str],
        period: Duration,
    ) -> Self {
        let (tx, current) = watch::channel(0);
        let ticker = (items.len() > 1 && !period.is_zero()).then(|| {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // the first tick completes immediately
                interval.tick().await;
                loop {
                    interval.tick().await;
                    tx.send_modify(|i| *i = (*i + 1) % items.len());
                }
            })
        });
        Self {
            items,
            current,
            ticker,
        }
    }

    pub fn index(&self) -> usize { *self.current.borrow() }

    pub fn current(&self) -> Option<&'static str> { self.items.get(self.index()).copied() }

    pub fn items(&self) -> &'static [&'static str] { self.items }
}

impl Drop for Rotator {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Mobile navigation panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavDrawer {
    pub open: bool,
}

impl NavDrawer {
    pub fn from_query(menu: Option<&str>) -> Self {
        Self {
            open: menu == Some("open"),
        }
    }

    pub fn toggle(&mut self) { self.open = !self.open; }

    pub fn close(&mut self) { self.open = false; }

    /// A click anywhere outside the open panel closes it
    pub fn click(
        &mut self,
        inside: bool,
    ) {
        if !inside {
            self.close();
        }
    }

    pub fn href(&self) -> &'static str {
        match self.open {
            true => "/?menu=open",
            false => "/",
        }
    }

    /// Where the hamburger button points
    pub fn toggle_href(&self) -> &'static str {
        let mut next = *self;
        next.toggle();
        next.href()
    }

    /// Where the backdrop behind the open panel points
    pub fn outside_click_href(&self) -> &'static str {
        let mut next = *self;
        next.click(false);
        next.href()
    }
}

/// The "launching soon" dialog that stands in for every nav destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InfoModal {
    pub open: bool,
}

impl InfoModal {
    pub fn from_query(modal: Option<&str>) -> Self {
        Self {
            open: modal == Some("info"),
        }
    }

    /// Nav links open the modal instead of navigating
    pub fn follow_nav_link(&mut self) { self.open = true; }

    pub fn close(&mut self) { self.open = false; }

    pub fn nav_link_href() -> &'static str {
        let mut modal = Self::default();
        modal.follow_nav_link();
        modal.href()
    }

    pub fn close_href() -> &'static str {
        let mut modal = Self { open: true };
        modal.close();
        modal.href()
    }

    fn href(&self) -> &'static str {
        match self.open {
            true => "/?modal=info",
            false => "/",
        }
    }
}
