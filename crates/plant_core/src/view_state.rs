//! Immutable, versioned view state for a single result view.
//!
//! All changes go through [`update`]. An event that is not allowed in the
//! current phase returns an identical state (same version), which is how a
//! second submission while a request is in flight becomes a no-op.

use std::path::PathBuf;

use crate::render::DisplayModel;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Empty,
    Selected {
        file: PathBuf,
    },
    InFlight {
        file: PathBuf,
        /// Version at which the request was submitted; settles must quote it.
        ticket: u64,
    },
    Showing {
        file: PathBuf,
        display: DisplayModel,
    },
    Failed {
        file: Option<PathBuf>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Select(PathBuf),
    Submit,
    Settle {
        ticket: u64,
        outcome: Result<DisplayModel, String>,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    version: u64,
    phase: Phase,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            version: 0,
            phase: Phase::Empty,
        }
    }
}

impl ViewState {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }

    pub fn can_submit(&self) -> bool {
        match &self.phase {
            Phase::Selected { .. } | Phase::Showing { .. } => true,
            Phase::Failed { file, .. } => file.is_some(),
            Phase::Empty | Phase::InFlight { .. } => false,
        }
    }

    /// The file the next submission would send.
    pub fn file(&self) -> Option<&PathBuf> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Selected { file }
            | Phase::InFlight { file, .. }
            | Phase::Showing { file, .. } => Some(file),
            Phase::Failed { file, .. } => file.as_ref(),
        }
    }

    /// Ticket of the request in flight, if any.
    pub fn ticket(&self) -> Option<u64> {
        match self.phase {
            Phase::InFlight { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    pub fn display(&self) -> Option<&DisplayModel> {
        match &self.phase {
            Phase::Showing { display, .. } => Some(display),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    fn advance(&self, phase: Phase) -> Self {
        Self {
            version: self.version + 1,
            phase,
        }
    }
}

/// The single transition function.
pub fn update(state: &ViewState, event: Event) -> ViewState {
    let next = match (&state.phase, event) {
        (Phase::InFlight { .. }, Event::Select(_) | Event::Submit) => None,
        (_, Event::Select(file)) => Some(Phase::Selected { file }),

        (_, Event::Submit) => match state.file() {
            Some(file) if state.can_submit() => Some(Phase::InFlight {
                file: file.clone(),
                ticket: state.version + 1,
            }),
            _ => None,
        },

        (Phase::InFlight { file, ticket }, Event::Settle { ticket: settled, outcome })
            if *ticket == settled =>
        {
            Some(match outcome {
                Ok(display) => Phase::Showing {
                    file: file.clone(),
                    display,
                },
                Err(message) => Phase::Failed {
                    file: Some(file.clone()),
                    message,
                },
            })
        }
        (_, Event::Settle { ticket, .. }) => {
            tracing::debug!("ignoring stale settle for ticket {ticket}");
            None
        }

        (Phase::Empty, Event::Reset) => None,
        (_, Event::Reset) => Some(Phase::Empty),
    };

    match next {
        Some(phase) => state.advance(phase),
        None => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ConfigurationDisplay, DisplayModel};

    fn shown() -> DisplayModel {
        DisplayModel::Configuration(ConfigurationDisplay {
            message: "ok".into(),
            plant_type: "Rosa".into(),
            classes: vec![],
        })
    }

    #[test]
    fn submit_without_selection_is_inert() {
        let s0 = ViewState::default();
        assert_eq!(update(&s0, Event::Submit), s0);
    }

    #[test]
    fn full_cycle_bumps_version_per_transition() {
        let s0 = ViewState::default();
        let s1 = update(&s0, Event::Select("leaf.jpg".into()));
        let s2 = update(&s1, Event::Submit);
        assert!(s2.is_busy());
        let ticket = s2.ticket().unwrap();
        let s3 = update(
            &s2,
            Event::Settle {
                ticket,
                outcome: Ok(shown()),
            },
        );
        assert_eq!([s1.version(), s2.version(), s3.version()], [1, 2, 3]);
        assert_eq!(s3.display(), Some(&shown()));
        assert_eq!(s3.file(), Some(&PathBuf::from("leaf.jpg")));
    }

    #[test]
    fn select_and_submit_are_inert_while_in_flight() {
        let s = update(&ViewState::default(), Event::Select("a.jpg".into()));
        let busy = update(&s, Event::Submit);
        assert_eq!(update(&busy, Event::Submit), busy);
        assert_eq!(update(&busy, Event::Select("b.jpg".into())), busy);
    }

    #[test]
    fn reset_abandons_request_and_ignores_late_settle() {
        let s = update(&ViewState::default(), Event::Select("a.jpg".into()));
        let busy = update(&s, Event::Submit);
        let ticket = busy.ticket().unwrap();
        let reset = update(&busy, Event::Reset);
        assert_eq!(reset.phase(), &Phase::Empty);

        let again = update(&update(&reset, Event::Select("b.jpg".into())), Event::Submit);
        let late = update(
            &again,
            Event::Settle {
                ticket,
                outcome: Err("old".into()),
            },
        );
        assert_eq!(late, again);
    }

    #[test]
    fn failure_keeps_file_for_retry() {
        let s = update(&ViewState::default(), Event::Select("a.jpg".into()));
        let busy = update(&s, Event::Submit);
        let failed = update(
            &busy,
            Event::Settle {
                ticket: busy.ticket().unwrap(),
                outcome: Err("Error de conexión".into()),
            },
        );
        assert_eq!(failed.error(), Some("Error de conexión"));
        assert!(failed.can_submit());
        assert!(update(&failed, Event::Submit).is_busy());
    }

    #[test]
    fn reset_when_empty_is_inert() {
        let s0 = ViewState::default();
        assert_eq!(update(&s0, Event::Reset).version(), 0);
    }
}
