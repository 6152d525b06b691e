// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Document-level click dispatch.
//!
//! All listeners hang off the document itself, so a click visits the
//! capture list and then the bubble list. `stop_propagation` skips the bubble
//! list; only `stop_immediate_propagation` skips the listeners that remain in
//! the list currently running.

use super::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
pub struct ClickEvent {
    target: NodeId,
    phase: Phase,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl ClickEvent {
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            phase: Phase::Capture,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

/// A click listener that may ask its owner to perform an action `A`.
pub trait ClickListener<A> {
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<A>;
}

impl<A, F> ClickListener<A> for F
where
    F: Fn(&Document, &mut ClickEvent) -> Option<A>,
{
    fn handle_click(&self, doc: &Document, event: &mut ClickEvent) -> Option<A> {
        self(doc, event)
    }
}

type Registered<A> = (ListenerId, Box<dyn ClickListener<A>>);

pub struct ClickPipeline<A> {
    next_id: u64,
    capture: Vec<Registered<A>>,
    bubble: Vec<Registered<A>>,
}

impl<A> Default for ClickPipeline<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ClickPipeline<A> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            capture: Vec::new(),
            bubble: Vec::new(),
        }
    }

    pub fn add(&mut self, phase: Phase, listener: Box<dyn ClickListener<A>>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        match phase {
            Phase::Capture => self.capture.push((id, listener)),
            Phase::Bubble => self.bubble.push((id, listener)),
        }
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.capture.len() + self.bubble.len();
        self.capture.retain(|(listener_id, _)| *listener_id != id);
        self.bubble.retain(|(listener_id, _)| *listener_id != id);
        before != self.capture.len() + self.bubble.len()
    }

    pub fn listener_count(&self, phase: Phase) -> usize {
        match phase {
            Phase::Capture => self.capture.len(),
            Phase::Bubble => self.bubble.len(),
        }
    }

    /// Runs a click on `target` through both phases and returns the final
    /// event state with the actions listeners requested, in order.
    pub fn dispatch(&self, doc: &Document, target: NodeId) -> (ClickEvent, Vec<A>) {
        let mut event = ClickEvent::new(target);
        let mut actions = Vec::new();

        run_phase(&self.capture, doc, &mut event, &mut actions);
        if event.propagation_stopped {
            return (event, actions);
        }

        event.phase = Phase::Bubble;
        run_phase(&self.bubble, doc, &mut event, &mut actions);
        (event, actions)
    }
}

fn run_phase<A>(
    listeners: &[Registered<A>],
    doc: &Document,
    event: &mut ClickEvent,
    actions: &mut Vec<A>,
) {
    for (_, listener) in listeners {
        if event.immediate_propagation_stopped {
            break;
        }
        if let Some(action) = listener.handle_click(doc, event) {
            actions.push(action);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    key: String,
    ctrl: bool,
    meta: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }

    /// Ctrl+S, or Cmd+S on platforms that use the meta key.
    pub fn is_save_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.key.eq_ignore_ascii_case("s")
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(counter: Rc<Cell<u32>>, label: &'static str) -> Box<dyn ClickListener<&'static str>> {
        Box::new(move |_: &Document, _: &mut ClickEvent| {
            counter.set(counter.get() + 1);
            Some(label)
        })
    }

    #[test]
    fn stop_propagation_still_runs_same_phase_listeners() {
        let doc = Document::new();
        let mut pipeline = ClickPipeline::new();
        let later = Rc::new(Cell::new(0));
        pipeline.add(
            Phase::Capture,
            Box::new(|_: &Document, event: &mut ClickEvent| {
                event.stop_propagation();
                Some("first")
            }),
        );
        pipeline.add(Phase::Capture, counting(later.clone(), "second"));
        let bubbled = Rc::new(Cell::new(0));
        pipeline.add(Phase::Bubble, counting(bubbled.clone(), "bubble"));

        let (event, actions) = pipeline.dispatch(&doc, doc.body());
        assert!(event.propagation_stopped());
        assert_eq!(actions, vec!["first", "second"]);
        assert_eq!(later.get(), 1);
        assert_eq!(bubbled.get(), 0);
    }

    #[test]
    fn stop_immediate_propagation_skips_remaining_listeners() {
        let doc = Document::new();
        let mut pipeline = ClickPipeline::new();
        let later = Rc::new(Cell::new(0));
        pipeline.add(
            Phase::Capture,
            Box::new(|_: &Document, event: &mut ClickEvent| {
                event.stop_immediate_propagation();
                Some("first")
            }),
        );
        pipeline.add(Phase::Capture, counting(later.clone(), "second"));

        let (_, actions) = pipeline.dispatch(&doc, doc.body());
        assert_eq!(actions, vec!["first"]);
        assert_eq!(later.get(), 0);
    }

    #[test]
    fn removed_listeners_no_longer_fire() {
        let doc = Document::new();
        let mut pipeline = ClickPipeline::new();
        let hits = Rc::new(Cell::new(0));
        let id = pipeline.add(Phase::Bubble, counting(hits.clone(), "x"));
        assert!(pipeline.remove(id));
        assert!(!pipeline.remove(id));
        pipeline.dispatch(&doc, doc.body());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn save_shortcut_accepts_ctrl_or_meta() {
        assert!(KeyEvent::new("s").with_ctrl().is_save_shortcut());
        assert!(KeyEvent::new("S").with_meta().is_save_shortcut());
        assert!(!KeyEvent::new("s").is_save_shortcut());
        assert!(KeyEvent::new("Escape").is_escape());
    }
}
