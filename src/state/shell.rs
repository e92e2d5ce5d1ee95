//! Screen routing of the client. Pure state: every I/O step lives in the shell service.

use thiserror::Error;
use uuid::Uuid;

use crate::{dto::results::ParticipantResults, session::UserType};

/// Organizer screens.
#[derive(Debug, Clone, PartialEq)]
pub enum SommelierView {
    /// Organizer home.
    Menu,
    /// Event management.
    Events,
    /// Round management.
    Rounds,
    /// Answer-key entry; `None` while picking the event.
    AnswerKey {
        /// Event picked.
        event_id: Option<Uuid>,
    },
    /// Ranking and answer key of an event.
    EventResult {
        /// Event shown.
        event_id: Uuid,
    },
}

/// Participant screens.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantView {
    /// Filling in the rounds of an event.
    Evaluating {
        /// Event joined.
        event_id: Uuid,
    },
    /// Event closed: ranking, winners and access to the personal result.
    EventFinished {
        /// Event closed.
        event_id: Uuid,
        /// Every round of the event, in order.
        round_ids: Vec<Uuid>,
    },
    /// Personal scored breakdown.
    Results {
        /// Event closed.
        event_id: Uuid,
        /// Every round of the event, in order.
        round_ids: Vec<Uuid>,
        /// Breakdown and aggregate score.
        results: ParticipantResults,
    },
}

/// Screen shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Signed out.
    Login,
    /// Organizer screens.
    Sommelier(SommelierView),
    /// Participant screens.
    Participant(ParticipantView),
}

/// Requests to move between screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Login or join succeeded.
    SignedIn {
        /// Role of the new session.
        user_type: UserType,
        /// Event joined, for participants.
        event_id: Option<Uuid>,
    },
    /// Session ended.
    SignedOut,
    /// Organizer picks a screen (from the menu or inside the answer-key picker).
    Open(SommelierView),
    /// Organizer returns to the previous screen.
    Back,
    /// The evaluated event was closed.
    EventClosed {
        /// Event closed.
        event_id: Uuid,
        /// Every round of the event, in order.
        round_ids: Vec<Uuid>,
    },
    /// Personal results were fetched.
    ResultsLoaded(ParticipantResults),
}

/// Error returned when a navigation does not apply to the current view.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid navigation: {navigation:?} cannot be applied while in {from:?}")]
pub struct InvalidNavigation {
    /// View when the navigation was refused.
    pub from: View,
    /// Navigation refused.
    pub navigation: Navigation,
}

/// Current view plus the rules for leaving it.
#[derive(Debug, Clone)]
pub struct Shell {
    view: View,
}

impl Default for Shell {
    fn default() -> Self {
        Self { view: View::Login }
    }
}

impl Shell {
    /// Shell on the login screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen currently shown.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Event being evaluated by a participant, if any.
    pub fn evaluating_event(&self) -> Option<Uuid> {
        match self.view {
            View::Participant(ParticipantView::Evaluating { event_id }) => Some(event_id),
            _ => None,
        }
    }

    /// Apply `navigation`, leaving the view untouched when it does not apply.
    pub fn navigate(&mut self, navigation: Navigation) -> Result<&View, InvalidNavigation> {
        let next = self.compute_navigation(navigation)?;
        self.view = next;
        Ok(&self.view)
    }

    fn compute_navigation(&self, navigation: Navigation) -> Result<View, InvalidNavigation> {
        let next = match (self.view.clone(), navigation) {
            (_, Navigation::SignedOut) => View::Login,
            (
                View::Login,
                Navigation::SignedIn {
                    user_type: UserType::Sommelier,
                    ..
                },
            ) => View::Sommelier(SommelierView::Menu),
            (
                View::Login,
                Navigation::SignedIn {
                    user_type: UserType::Participant,
                    event_id: Some(event_id),
                },
            ) => View::Participant(ParticipantView::Evaluating { event_id }),
            (View::Sommelier(_), Navigation::Open(view)) => View::Sommelier(view),
            (View::Sommelier(SommelierView::AnswerKey { event_id: Some(_) }), Navigation::Back) => {
                View::Sommelier(SommelierView::AnswerKey { event_id: None })
            }
            (View::Sommelier(_), Navigation::Back) => View::Sommelier(SommelierView::Menu),
            (
                View::Participant(ParticipantView::Evaluating { event_id }),
                Navigation::EventClosed {
                    event_id: closed,
                    round_ids,
                },
            ) if event_id == closed => {
                View::Participant(ParticipantView::EventFinished { event_id, round_ids })
            }
            (
                View::Participant(
                    ParticipantView::EventFinished { event_id, .. }
                    | ParticipantView::Results { event_id, .. },
                ),
                Navigation::EventClosed {
                    event_id: closed, ..
                },
            ) if event_id == closed => self.view.clone(),
            (
                View::Participant(ParticipantView::EventFinished {
                    event_id,
                    round_ids,
                }),
                Navigation::ResultsLoaded(results),
            ) => View::Participant(ParticipantView::Results {
                event_id,
                round_ids,
                results,
            }),
            (
                View::Participant(ParticipantView::Results {
                    event_id,
                    round_ids,
                    ..
                }),
                Navigation::Back,
            ) => View::Participant(ParticipantView::EventFinished {
                event_id,
                round_ids,
            }),
            (from, navigation) => return Err(InvalidNavigation { from, navigation }),
        };

        Ok(next)
    }
}
