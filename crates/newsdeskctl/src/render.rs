//! Rendering capability and the in-memory page model
//!
//! The poller never touches a screen directly. It writes to named display
//! targets through `Renderer`; a target that was never registered turns the
//! write into a no-op.

use newsdesk_common::DisplayTargets;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Visual emphasis for a cell or badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Plain,
    Primary,
    Secondary,
    Success,
    Info,
    Warning,
    Danger,
    Dark,
}

/// Tri-state status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    /// Not checked yet, or a check is in progress
    Unknown,
    Online,
    Offline,
}

impl IndicatorState {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => IndicatorState::Online,
            Some(false) => IndicatorState::Offline,
            None => IndicatorState::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorState::Unknown => "Checking...",
            IndicatorState::Online => "Online",
            IndicatorState::Offline => "Offline",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            IndicatorState::Unknown => Tone::Warning,
            IndicatorState::Online => Tone::Success,
            IndicatorState::Offline => Tone::Danger,
        }
    }
}

/// One cell of a rendered row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    /// Full text shown on hover when `text` is abbreviated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    pub tone: Tone,
    pub badge: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hover: None,
            tone: Tone::Plain,
            badge: false,
        }
    }

    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            hover: None,
            tone,
            badge: true,
        }
    }

    pub fn with_hover(mut self, hover: impl Into<String>) -> Self {
        self.hover = Some(hover.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// One rendered row of a list or table container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}

/// Host-provided display capability
///
/// Every method returns whether the target exists. A missing target is not
/// an error.
pub trait Renderer: Send + Sync {
    fn set_text(&self, target: &str, value: &str) -> bool;

    /// Replace the whole content of a container
    fn set_rows(&self, container: &str, rows: Vec<Row>) -> bool;

    fn set_indicator(&self, target: &str, state: IndicatorState) -> bool;
}

/// Current content of a display target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TargetContent {
    Empty,
    Text(String),
    Indicator(IndicatorState),
    Rows(Vec<Row>),
}

/// In-memory page: a fixed registry of targets and what they show
pub struct PageModel {
    order: Vec<String>,
    contents: Mutex<HashMap<String, TargetContent>>,
    revision: AtomicU64,
}

impl PageModel {
    /// Register exactly the given targets, all empty
    pub fn new<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let order: Vec<String> = targets.into_iter().map(Into::into).collect();
        let contents = order
            .iter()
            .map(|name| (name.clone(), TargetContent::Empty))
            .collect();
        Self {
            order,
            contents: Mutex::new(contents),
            revision: AtomicU64::new(0),
        }
    }

    /// A page with every dashboard target registered
    pub fn for_targets(targets: &DisplayTargets) -> Self {
        Self::new(targets.all())
    }

    fn contents(&self) -> MutexGuard<'_, HashMap<String, TargetContent>> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, target: &str, content: TargetContent) -> bool {
        let mut contents = self.contents();
        match contents.get_mut(target) {
            Some(slot) => {
                *slot = content;
                self.revision.fetch_add(1, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.contents().contains_key(target)
    }

    pub fn content(&self, target: &str) -> Option<TargetContent> {
        self.contents().get(target).cloned()
    }

    pub fn text(&self, target: &str) -> Option<String> {
        match self.content(target)? {
            TargetContent::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn indicator(&self, target: &str) -> Option<IndicatorState> {
        match self.content(target)? {
            TargetContent::Indicator(state) => Some(state),
            _ => None,
        }
    }

    pub fn rows(&self, target: &str) -> Option<Vec<Row>> {
        match self.content(target)? {
            TargetContent::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Bumped on every successful write
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// All targets in registration order
    pub fn snapshot(&self) -> Vec<(String, TargetContent)> {
        let contents = self.contents();
        self.order
            .iter()
            .map(|name| {
                let content = contents.get(name).cloned().unwrap_or(TargetContent::Empty);
                (name.clone(), content)
            })
            .collect()
    }
}

impl Renderer for PageModel {
    fn set_text(&self, target: &str, value: &str) -> bool {
        self.write(target, TargetContent::Text(value.to_string()))
    }

    fn set_rows(&self, container: &str, rows: Vec<Row>) -> bool {
        self.write(container, TargetContent::Rows(rows))
    }

    fn set_indicator(&self, target: &str, state: IndicatorState) -> bool {
        self.write(target, TargetContent::Indicator(state))
    }
}
