//! Lifecycle state machine
//!
//! One canonical enumeration of the run lifecycle plus the guards every
//! state-sensitive operation calls first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Current phase of the run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// No run exists (initial state, and the state after a clear)
    #[default]
    NotInitialized,
    /// Building the player and managers
    Initializing,
    /// Built, tick source not yet running
    Ready,
    /// Active gameplay; ticks mutate entities
    Running,
    /// Ticks are ignored until resumed
    Paused,
    /// Player defeated
    GameOver,
    /// Tearing down before exit
    ShuttingDown,
    /// Torn down
    Stopped,
    /// Initialization or gameplay failed
    Error,
}

impl GameState {
    pub const ALL: [GameState; 9] = [
        GameState::NotInitialized,
        GameState::Initializing,
        GameState::Ready,
        GameState::Running,
        GameState::Paused,
        GameState::GameOver,
        GameState::ShuttingDown,
        GameState::Stopped,
        GameState::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::NotInitialized => "NOT_INITIALIZED",
            GameState::Initializing => "INITIALIZING",
            GameState::Ready => "READY",
            GameState::Running => "RUNNING",
            GameState::Paused => "PAUSED",
            GameState::GameOver => "GAME_OVER",
            GameState::ShuttingDown => "SHUTTING_DOWN",
            GameState::Stopped => "STOPPED",
            GameState::Error => "ERROR",
        }
    }

    /// States in which a run exists and its entities may be read
    pub fn is_initialized(&self) -> bool {
        matches!(
            self,
            GameState::Ready | GameState::Running | GameState::Paused | GameState::GameOver
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the current [`GameState`] and applies only declared transitions
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: GameState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn is_initializing(&self) -> bool {
        self.current == GameState::Initializing
    }

    pub fn is_running(&self) -> bool {
        self.current == GameState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.current == GameState::Paused
    }

    /// NOT_INITIALIZED -> INITIALIZING
    pub fn start_initialization(&mut self) -> Result<(), StateError> {
        self.transition(&[GameState::NotInitialized], GameState::Initializing)
    }

    /// INITIALIZING -> READY
    pub fn mark_ready(&mut self) -> Result<(), StateError> {
        self.transition(&[GameState::Initializing], GameState::Ready)
    }

    /// INITIALIZING | READY | PAUSED -> RUNNING (no-op when already running)
    pub fn start_running(&mut self) -> Result<(), StateError> {
        if self.current == GameState::Running {
            return Ok(());
        }
        self.transition(
            &[GameState::Initializing, GameState::Ready, GameState::Paused],
            GameState::Running,
        )
    }

    /// RUNNING -> PAUSED. Returns false (and does nothing) from any other state.
    pub fn pause(&mut self) -> bool {
        if self.current != GameState::Running {
            return false;
        }
        self.current = GameState::Paused;
        log::debug!("State transitioned to {}", self.current);
        true
    }

    /// RUNNING -> GAME_OVER
    pub fn game_over(&mut self) -> Result<(), StateError> {
        self.transition(&[GameState::Running], GameState::GameOver)
    }

    /// Any live state -> ERROR
    pub fn fail(&mut self) -> Result<(), StateError> {
        self.transition(
            &[
                GameState::Initializing,
                GameState::Ready,
                GameState::Running,
                GameState::Paused,
            ],
            GameState::Error,
        )
    }

    /// RUNNING | PAUSED | GAME_OVER | ERROR -> SHUTTING_DOWN
    pub fn begin_shutdown(&mut self) -> Result<(), StateError> {
        self.transition(
            &[
                GameState::Running,
                GameState::Paused,
                GameState::GameOver,
                GameState::Error,
            ],
            GameState::ShuttingDown,
        )
    }

    /// SHUTTING_DOWN -> STOPPED
    pub fn finish_shutdown(&mut self) -> Result<(), StateError> {
        self.transition(&[GameState::ShuttingDown], GameState::Stopped)
    }

    /// Unconditionally resets to NOT_INITIALIZED
    pub fn stop_and_clear(&mut self) {
        self.current = GameState::NotInitialized;
        log::debug!("State reset to {}", self.current);
    }

    pub fn check_initialized(&self, operation: &'static str) -> Result<(), StateError> {
        if self.current.is_initialized() {
            Ok(())
        } else {
            Err(StateError::Precondition {
                operation,
                state: self.current,
                required: "an initialized state (READY, RUNNING, PAUSED or GAME_OVER)",
            })
        }
    }

    pub fn check_running(&self, operation: &'static str) -> Result<(), StateError> {
        if self.current == GameState::Running {
            Ok(())
        } else {
            Err(StateError::Precondition {
                operation,
                state: self.current,
                required: "RUNNING",
            })
        }
    }

    /// Panics unless a run has finished initializing.
    ///
    /// Misuse is a programming error, so the panic carries the operation,
    /// the current state and the caller location.
    #[track_caller]
    pub fn ensure_initialized(&self, operation: &'static str) {
        if let Err(err) = self.check_initialized(operation) {
            panic!("{}: {err}", std::panic::Location::caller());
        }
    }

    /// Panics unless the state is RUNNING.
    #[track_caller]
    pub fn ensure_running(&self, operation: &'static str) {
        if let Err(err) = self.check_running(operation) {
            panic!("{}: {err}", std::panic::Location::caller());
        }
    }

    fn transition(&mut self, from: &[GameState], to: GameState) -> Result<(), StateError> {
        if !from.contains(&self.current) {
            return Err(StateError::InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        log::debug!("State transitioned to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_lifecycle() {
        let mut sm = StateMachine::new();
        assert_eq!(sm.current(), GameState::NotInitialized);

        sm.start_initialization().unwrap();
        assert!(sm.is_initializing());
        sm.mark_ready().unwrap();
        sm.start_running().unwrap();
        assert!(sm.is_running());

        assert!(sm.pause());
        assert!(sm.is_paused());
        sm.start_running().unwrap();
        assert!(sm.is_running());

        sm.stop_and_clear();
        assert_eq!(sm.current(), GameState::NotInitialized);
    }

    #[test]
    fn test_start_initialization_names_offending_state() {
        let mut sm = StateMachine::new();
        sm.start_initialization().unwrap();
        let err = sm.start_initialization().unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidTransition {
                from: GameState::Initializing,
                to: GameState::Initializing,
            }
        );
        assert!(err.to_string().contains("INITIALIZING"));
    }

    #[test]
    fn test_start_running_is_idempotent() {
        let mut sm = StateMachine::new();
        sm.start_initialization().unwrap();
        sm.start_running().unwrap();
        sm.start_running().unwrap();
        assert!(sm.is_running());
    }

    #[test]
    fn test_start_running_rejected_before_initialization() {
        let mut sm = StateMachine::new();
        assert!(sm.start_running().is_err());
        assert_eq!(sm.current(), GameState::NotInitialized);
    }

    #[test]
    fn test_pause_only_from_running() {
        let mut sm = StateMachine::new();
        assert!(!sm.pause());
        assert_eq!(sm.current(), GameState::NotInitialized);

        sm.start_initialization().unwrap();
        assert!(!sm.pause());
        assert!(sm.is_initializing());
    }

    #[test]
    fn test_shutdown_path() {
        let mut sm = StateMachine::new();
        sm.start_initialization().unwrap();
        sm.start_running().unwrap();
        sm.game_over().unwrap();
        assert!(sm.game_over().is_err());
        sm.begin_shutdown().unwrap();
        sm.finish_shutdown().unwrap();
        assert_eq!(sm.current(), GameState::Stopped);
        assert!(sm.fail().is_err());
    }

    #[test]
    fn test_guards_reject_non_permitted_states() {
        for state in GameState::ALL {
            let sm = StateMachine { current: state };
            assert_eq!(sm.check_running("op").is_ok(), state == GameState::Running);
            assert_eq!(
                sm.check_initialized("op").is_ok(),
                matches!(
                    state,
                    GameState::Ready | GameState::Running | GameState::Paused | GameState::GameOver
                )
            );
        }
    }

    #[test]
    #[should_panic(expected = "cannot call update() while PAUSED")]
    fn test_ensure_running_panics_with_operation_name() {
        let sm = StateMachine {
            current: GameState::Paused,
        };
        sm.ensure_running("update");
    }

    #[test]
    #[should_panic(expected = "cannot call player()")]
    fn test_ensure_initialized_panics_while_initializing() {
        let sm = StateMachine {
            current: GameState::Initializing,
        };
        sm.ensure_initialized("player");
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        StartInit,
        Ready,
        Run,
        Pause,
        GameOver,
        Fail,
        BeginShutdown,
        FinishShutdown,
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::StartInit),
            Just(Op::Ready),
            Just(Op::Run),
            Just(Op::Pause),
            Just(Op::GameOver),
            Just(Op::Fail),
            Just(Op::BeginShutdown),
            Just(Op::FinishShutdown),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_failed_transitions_leave_state_untouched(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut sm = StateMachine::new();
            for op in ops {
                let before = sm.current();
                let result = match op {
                    Op::StartInit => sm.start_initialization(),
                    Op::Ready => sm.mark_ready(),
                    Op::Run => sm.start_running(),
                    Op::Pause => {
                        sm.pause();
                        Ok(())
                    }
                    Op::GameOver => sm.game_over(),
                    Op::Fail => sm.fail(),
                    Op::BeginShutdown => sm.begin_shutdown(),
                    Op::FinishShutdown => sm.finish_shutdown(),
                    Op::Clear => {
                        sm.stop_and_clear();
                        Ok(())
                    }
                };
                if result.is_err() {
                    prop_assert_eq!(sm.current(), before);
                }
                prop_assert!(GameState::ALL.contains(&sm.current()));
                prop_assert_eq!(sm.check_running("op").is_ok(), sm.current() == GameState::Running);
            }
        }
    }
}
