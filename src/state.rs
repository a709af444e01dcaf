use std::collections::HashMap;
use tokio::task::AbortHandle;

use crate::languages::{Language, SourceLanguage};
use crate::ui::Indicator;

/// A translation request that has not settled yet.
pub struct InFlight {
    pub generation: u64,
    pub abort: AbortHandle,
}

/// Everything the widget currently shows, owned by the orchestrator.
pub struct WidgetState {
    pub input: String,
    pub output: String,
    pub source: SourceLanguage,
    pub target: Language,
    pub detected_language: Option<String>,
    pub in_flight: Option<InFlight>,
    next_generation: u64,
    /// Latest token per auto-hiding indicator.
    timers: HashMap<Indicator, u64>,
}

impl WidgetState {
    pub fn new(source: SourceLanguage, target: Language) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            source,
            target,
            detected_language: None,
            in_flight: None,
            next_generation: 0,
            timers: HashMap::new(),
        }
    }

    pub fn has_input(&self) -> bool {
        !self.input.trim().is_empty()
    }

    pub fn has_output(&self) -> bool {
        !self.output.trim().is_empty()
    }

    pub fn is_requesting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Submit is usable when there is text and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.has_input() && !self.is_requesting()
    }

    pub fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight.as_ref().map(|f| f.generation) == Some(generation)
    }

    /// Abort the in-flight request, if any. Returns whether one was aborted.
    pub fn cancel_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.abort.abort();
                true
            }
            None => false,
        }
    }

    /// Arm the auto-hide timer of `indicator`, invalidating earlier ones.
    pub fn arm_timer(&mut self, indicator: Indicator) -> u64 {
        let token = self.timers.entry(indicator).or_insert(0);
        *token += 1;
        *token
    }

    pub fn is_timer_current(&self, indicator: Indicator, token: u64) -> bool {
        self.timers.get(&indicator).copied() == Some(token)
    }
}
