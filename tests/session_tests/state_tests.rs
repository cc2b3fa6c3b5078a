//! Tests for the session state machine
//!
//! These tests verify:
//! - Legal and illegal transitions
//! - Operation valid-state sets

use datachat::state::{Operation, SessionState, Transition};
use datachat::ChatError;

use SessionState::*;

// =============================================================================
// Transition Tests
// =============================================================================

#[test]
fn test_initial_state_is_disconnected() {
    assert_eq!(SessionState::default(), Disconnected);
}

#[test]
fn test_legal_transitions() {
    let cases = [
        (Disconnected, Transition::SyncAcknowledged, Connected),
        (Connected, Transition::LoginAccepted, Authorized),
        (Authorized, Transition::LoginAccepted, Authorized),
        (Connected, Transition::Closed, Disconnected),
        (Authorized, Transition::Closed, Disconnected),
    ];

    for (from, transition, to) in cases {
        assert_eq!(from.next(transition), Some(to), "{} {:?}", from, transition);
        assert_eq!(from.apply(transition).unwrap(), to);
    }
}

#[test]
fn test_illegal_transitions() {
    let cases = [
        (Disconnected, Transition::LoginAccepted),
        (Disconnected, Transition::Closed),
        (Connected, Transition::SyncAcknowledged),
        (Authorized, Transition::SyncAcknowledged),
    ];

    for (from, transition) in cases {
        assert_eq!(from.next(transition), None);
        match from.apply(transition) {
            Err(ChatError::InvalidTransition {
                from: f,
                transition: t,
            }) => {
                assert_eq!(f, from);
                assert_eq!(t, transition);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }
}

#[test]
fn test_reconnect_cycle() {
    let state = Disconnected
        .apply(Transition::SyncAcknowledged)
        .and_then(|s| s.apply(Transition::LoginAccepted))
        .and_then(|s| s.apply(Transition::Closed))
        .and_then(|s| s.apply(Transition::SyncAcknowledged))
        .unwrap();

    assert_eq!(state, Connected);
}

#[test]
fn test_state_display() {
    assert_eq!(Disconnected.to_string(), "disconnected");
    assert_eq!(Connected.to_string(), "connected");
    assert_eq!(Authorized.to_string(), "authorized");
}

// =============================================================================
// Operation Guard Tests
// =============================================================================

#[test]
fn test_connect_only_when_disconnected() {
    assert_eq!(Operation::Connect.valid_states(), &[Disconnected]);
}

#[test]
fn test_private_message_requires_authorization() {
    assert!(!Operation::SendPrivateMessage.is_permitted_in(Disconnected));
    assert!(!Operation::SendPrivateMessage.is_permitted_in(Connected));
    assert!(Operation::SendPrivateMessage.is_permitted_in(Authorized));
}

#[test]
fn test_online_operations() {
    let online = [
        Operation::Disconnect,
        Operation::Login,
        Operation::SendPublicMessage,
        Operation::ReadInbox,
        Operation::ListUsers,
        Operation::GetJoke,
        Operation::ListSupported,
    ];

    for op in online {
        assert!(!op.is_permitted_in(Disconnected), "{}", op);
        assert!(op.is_permitted_in(Connected), "{}", op);
        assert!(op.is_permitted_in(Authorized), "{}", op);
    }
}

#[test]
fn test_permitted_in_per_state() {
    let disconnected: Vec<_> = Operation::permitted_in(Disconnected).collect();
    assert_eq!(disconnected, vec![Operation::Connect]);

    let connected: Vec<_> = Operation::permitted_in(Connected).collect();
    assert_eq!(connected.len(), 7);
    assert!(!connected.contains(&Operation::Connect));
    assert!(!connected.contains(&Operation::SendPrivateMessage));

    let authorized: Vec<_> = Operation::permitted_in(Authorized).collect();
    assert_eq!(authorized.len(), 8);
    assert!(authorized.contains(&Operation::SendPrivateMessage));
}

#[test]
fn test_every_operation_has_a_valid_state() {
    for op in Operation::ALL {
        assert!(!op.valid_states().is_empty(), "{}", op);
        assert!(!op.description().is_empty());
    }
}
