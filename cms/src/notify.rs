// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! User-facing affordances the editing core calls out to.

use log::{error, info};
use std::cell::{Cell, RefCell};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

pub trait Affordances {
    fn show_message(&self, severity: Severity, message: &str);

    /// Interactive yes/no confirmation.
    fn confirm(&self, message: &str) -> bool;
}

/// Reports messages through the logger and refuses confirmations, since
/// there is nobody to ask.
#[derive(Debug, Default)]
pub struct LogAffordances;

impl Affordances for LogAffordances {
    fn show_message(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => error!("[{}] {}", severity, message),
            _ => info!("[{}] {}", severity, message),
        }
    }

    fn confirm(&self, message: &str) -> bool {
        info!("Confirmation refused without an operator: {}", message);
        false
    }
}

/// Keeps every message and answers confirmations with a scripted value.
#[derive(Debug)]
pub struct RecordingAffordances {
    messages: RefCell<Vec<(Severity, String)>>,
    confirmations: RefCell<Vec<String>>,
    answer: Cell<bool>,
}

impl Default for RecordingAffordances {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RecordingAffordances {
    pub fn new(answer: bool) -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
            confirmations: RefCell::new(Vec::new()),
            answer: Cell::new(answer),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.set(answer);
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.borrow().clone()
    }

    pub fn messages_with(&self, severity: Severity) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(level, _)| *level == severity)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.borrow().clone()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
        self.confirmations.borrow_mut().clear();
    }
}

impl Affordances for RecordingAffordances {
    fn show_message(&self, severity: Severity, message: &str) {
        self.messages
            .borrow_mut()
            .push((severity, message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations.borrow_mut().push(message.to_string());
        self.answer.get()
    }
}
