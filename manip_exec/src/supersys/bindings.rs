//! Operator button bindings
//!
//! Maps button state changes onto supersystem commands and override flags. Each binding reacts to
//! one button with one of four modes:
//!
//! - `OnPress`: fire when the button is pressed
//! - `OnRelease`: fire when the button is released
//! - `WhileHeld`: fire on press, cancel on release
//! - `HoldToRun`: fire on press, cancel on release
//!
//! A hold-style operation which finishes or is replaced while its button is still down is not
//! restarted, the next press runs it again. Releasing only cancels the operation if it is still
//! the one the binding started.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::supersys::SupersysCmd;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A change in the state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub id: u8,
    pub pressed: bool,
}

/// An entry of the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Binding {
    pub button: u8,
    pub mode: BindMode,
    pub action: BoundAction,
}

/// The binding table and the state of the buttons it watches.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    table: Vec<Binding>,
    held: HashSet<u8>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum BindMode {
    OnPress,
    OnRelease,
    WhileHeld,
    HoldToRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum BoundAction {
    /// Schedule a command
    Run { cmd: SupersysCmd },

    /// Set the presence override. Hold-style bindings clear it again on release.
    PresenceOverride { active: bool },

    /// Set the manual turtle flag. Hold-style bindings clear it again on release.
    TurtleOverride { active: bool },
}

/// What the scheduler has to do in response to the buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingEvent {
    /// Schedule the command, remembering which binding it came from
    Start { binding: usize, cmd: SupersysCmd },

    /// Cancel the active operation if it came from this binding
    Cancel { binding: usize },

    SetPresenceOverride(bool),

    SetTurtleOverride(bool),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Bindings {
    pub fn new(table: Vec<Binding>) -> Self {
        Self {
            table,
            held: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn is_held(&self, button: u8) -> bool {
        self.held.contains(&button)
    }

    /// Process this cycle's button events, in order.
    pub fn process(&mut self, events: &[ButtonEvent]) -> Vec<BindingEvent> {
        let mut out = Vec::new();

        for event in events.iter() {
            // Ignore repeats of the current state
            let changed = if event.pressed {
                self.held.insert(event.id)
            } else {
                self.held.remove(&event.id)
            };
            if !changed {
                continue;
            }

            debug!(
                "Button {} {}",
                event.id,
                if event.pressed { "pressed" } else { "released" }
            );

            for (idx, binding) in self.table.iter().enumerate() {
                if binding.button != event.id {
                    continue;
                }

                match (binding.mode, event.pressed) {
                    (BindMode::OnPress, true)
                    | (BindMode::OnRelease, false)
                    | (BindMode::WhileHeld, true)
                    | (BindMode::HoldToRun, true) => out.push(binding.fire(idx, true)),
                    (BindMode::WhileHeld, false) | (BindMode::HoldToRun, false) => {
                        out.push(binding.fire(idx, false))
                    }
                    _ => (),
                }
            }
        }

        out
    }
}

impl Binding {
    /// The event for this binding, either starting (on press) or ending (on release) it.
    fn fire(&self, idx: usize, start: bool) -> BindingEvent {
        let hold = matches!(self.mode, BindMode::WhileHeld | BindMode::HoldToRun);

        match self.action {
            BoundAction::Run { cmd } => {
                if start {
                    BindingEvent::Start { binding: idx, cmd }
                } else {
                    BindingEvent::Cancel { binding: idx }
                }
            }
            BoundAction::PresenceOverride { active } => {
                BindingEvent::SetPresenceOverride(if start || !hold { active } else { !active })
            }
            BoundAction::TurtleOverride { active } => {
                BindingEvent::SetTurtleOverride(if start || !hold { active } else { !active })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn press(id: u8) -> ButtonEvent {
        ButtonEvent { id, pressed: true }
    }

    fn release(id: u8) -> ButtonEvent {
        ButtonEvent { id, pressed: false }
    }

    fn table() -> Bindings {
        Bindings::new(vec![
            Binding {
                button: 1,
                mode: BindMode::OnPress,
                action: BoundAction::Run {
                    cmd: SupersysCmd::IntakeSetup,
                },
            },
            Binding {
                button: 2,
                mode: BindMode::HoldToRun,
                action: BoundAction::Run {
                    cmd: SupersysCmd::AlgaeExtract,
                },
            },
            Binding {
                button: 3,
                mode: BindMode::OnPress,
                action: BoundAction::PresenceOverride { active: true },
            },
            Binding {
                button: 3,
                mode: BindMode::OnRelease,
                action: BoundAction::PresenceOverride { active: false },
            },
            Binding {
                button: 4,
                mode: BindMode::WhileHeld,
                action: BoundAction::Run {
                    cmd: SupersysCmd::IntakeLoad,
                },
            },
        ])
    }

    #[test]
    fn test_press_release() {
        let mut b = table();

        assert_eq!(
            b.process(&[press(1)]),
            vec![BindingEvent::Start {
                binding: 0,
                cmd: SupersysCmd::IntakeSetup
            }]
        );
        assert!(b.is_held(1));

        // Repeated press and the release do nothing
        assert!(b.process(&[press(1)]).is_empty());
        assert!(b.process(&[release(1)]).is_empty());

        assert_eq!(
            b.process(&[press(2)]),
            vec![BindingEvent::Start {
                binding: 1,
                cmd: SupersysCmd::AlgaeExtract
            }]
        );
        assert_eq!(
            b.process(&[release(2)]),
            vec![BindingEvent::Cancel { binding: 1 }]
        );
    }

    #[test]
    fn test_presence_override_binding() {
        let mut b = table();

        assert_eq!(
            b.process(&[press(3)]),
            vec![BindingEvent::SetPresenceOverride(true)]
        );
        assert_eq!(
            b.process(&[release(3)]),
            vec![BindingEvent::SetPresenceOverride(false)]
        );
    }

    #[test]
    fn test_while_held_runs_once() {
        let mut b = table();

        assert_eq!(
            b.process(&[press(4)]),
            vec![BindingEvent::Start {
                binding: 4,
                cmd: SupersysCmd::IntakeLoad,
            }]
        );

        // Held with no changes, whatever happened to the operation
        assert!(b.process(&[]).is_empty());
        assert!(b.process(&[]).is_empty());
        assert!(b.is_held(4));

        assert_eq!(
            b.process(&[release(4)]),
            vec![BindingEvent::Cancel { binding: 4 }]
        );
        assert!(b.process(&[]).is_empty());
    }
}
