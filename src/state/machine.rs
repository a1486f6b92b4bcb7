use super::error::{StateError, StateResult};
use super::{event::StateTransition, AppEvent, AppState};

#[derive(Debug)]
pub struct StateMachine {
    state: AppState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn can_transition(&self, event: AppEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: AppEvent) -> Option<AppState> {
        use AppEvent::*;
        match (self.state, event) {
            (AppState::Created, MapReady) => Some(AppState::MapReady),
            (AppState::MapReady, PermissionGranted) => Some(AppState::Tracking),
            (AppState::MapReady, PermissionDenied) => Some(AppState::MapReady),
            (AppState::Tracking, PermissionGranted) => Some(AppState::Tracking),
            (AppState::Tracking, PermissionDenied) => Some(AppState::MapReady),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: AppEvent) -> StateResult<AppState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = StateMachine::new();
        assert!(machine.can_transition(AppEvent::MapReady));
        assert!(!machine.can_transition(AppEvent::PermissionGranted));
        assert!(!machine.can_transition(AppEvent::PermissionDenied));

        let _ = machine
            .transition(AppEvent::MapReady)
            .expect("created -> map ready should transition");

        assert!(machine.can_transition(AppEvent::PermissionGranted));
        assert!(machine.can_transition(AppEvent::PermissionDenied));
        assert!(!machine.can_transition(AppEvent::MapReady));
    }

    #[test]
    fn transition_records_history_with_ordered_entries() {
        let mut machine = StateMachine::new();
        let _ = machine
            .transition(AppEvent::MapReady)
            .expect("map ready should work");
        let _ = machine
            .transition(AppEvent::PermissionGranted)
            .expect("grant should work");
        let _ = machine
            .transition(AppEvent::PermissionDenied)
            .expect("revoke should work");

        assert_eq!(machine.state(), AppState::MapReady);
        assert_eq!(
            machine.history(),
            &[
                StateTransition::new(
                    Some(AppState::Created),
                    AppEvent::MapReady,
                    AppState::MapReady
                ),
                StateTransition::new(
                    Some(AppState::MapReady),
                    AppEvent::PermissionGranted,
                    AppState::Tracking
                ),
                StateTransition::new(
                    Some(AppState::Tracking),
                    AppEvent::PermissionDenied,
                    AppState::MapReady
                ),
            ]
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(AppEvent::PermissionGranted)
            .expect_err("created -> permission granted should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: AppState::Created,
                event: AppEvent::PermissionGranted
            }
        ));
        assert_eq!(machine.state(), AppState::Created);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn only_ready_states_accept_map_input() {
        assert!(!AppState::Created.accepts_map_input());
        assert!(AppState::MapReady.accepts_map_input());
        assert!(AppState::Tracking.accepts_map_input());
    }
}
