//! Tests for ChatSession
//!
//! These tests verify:
//! - Connect / sync handshake and its failure modes
//! - Login transitions
//! - Guarded dispatch
//! - Messaging, queries and inbox over one connection
//! - Disconnect policies
//! - Transport failures leaving state untouched

#[path = "../common/mod.rs"]
mod common;

use std::io;

use common::{scripted_session, scripted_session_with_config, ScriptedConnector, ScriptedTransport};
use datachat::protocol::ResponseKind;
use datachat::{
    ChatError, ChatSession, Config, DisconnectPolicy, Operation, Outcome, Request, SessionState,
};

// =============================================================================
// Connect Tests
// =============================================================================

#[test]
fn test_new_session_is_disconnected() {
    let (session, probe) = scripted_session("");
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
    assert!(probe.sent().is_empty());
}

#[test]
fn test_connect_enters_sync_mode() {
    let (mut session, probe) = scripted_session("modeok\n");
    session.connect().unwrap();

    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.is_connected());
    assert_eq!(probe.sent(), "sync\n");
    assert_eq!(
        session.connection().unwrap().peer_addr(),
        "datakomm.work:1300"
    );
}

#[test]
fn test_connect_skips_banner() {
    let (mut session, _probe) = scripted_session("Welcome to the server\r\nmodeok\r\n");
    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_sync_rejected_closes_connection() {
    let (mut session, probe) = scripted_session("cmderr unknown command\n");

    match session.connect() {
        Err(ChatError::SyncRejected(line)) => assert_eq!(line, "cmderr unknown command"),
        other => panic!("Expected SyncRejected, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
    assert_eq!(probe.closes(), 1);
}

#[test]
fn test_connect_refused() {
    let mut session = ChatSession::with_connector(Config::default(), ScriptedConnector::default());

    match session.connect() {
        Err(ChatError::Connect { addr, source }) => {
            assert_eq!(addr, "datakomm.work:1300");
            assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
        }
        other => panic!("Expected Connect error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
}

#[test]
fn test_connect_peer_hangs_up_before_modeok() {
    let (mut session, _probe) = scripted_session("");
    assert!(matches!(session.connect(), Err(ChatError::ConnectionClosed)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
}

#[test]
fn test_connect_twice_rejected() {
    let (mut session, probe) = scripted_session("modeok\n");
    session.connect().unwrap();

    assert!(matches!(
        session.connect(),
        Err(ChatError::InvalidState {
            operation: Operation::Connect,
            state: SessionState::Connected,
        })
    ));
    assert_eq!(probe.sent(), "sync\n");
}

#[test]
fn test_connect_validates_config() {
    let config = Config::builder().port(0).build();
    let (mut session, _probe) = scripted_session_with_config(config, "modeok\n");

    assert!(matches!(session.connect(), Err(ChatError::Config(_))));
    assert_eq!(session.state(), SessionState::Disconnected);
}

// =============================================================================
// Login Tests
// =============================================================================

#[test]
fn test_login_accepted() {
    let (mut session, probe) = scripted_session("modeok\nloginok\n");
    session.connect().unwrap();

    let response = session.login("alice").unwrap();
    assert_eq!(response.kind(), ResponseKind::LoginOk);
    assert_eq!(session.state(), SessionState::Authorized);
    assert_eq!(probe.sent_lines(), vec!["sync", "login alice"]);
}

#[test]
fn test_login_rejected_stays_connected() {
    let (mut session, _probe) = scripted_session("modeok\nloginerr username already in use\n");
    session.connect().unwrap();

    let response = session.login("alice").unwrap();
    assert_eq!(response.kind(), ResponseKind::LoginErr);
    assert!(response.is_error());
    assert_eq!(response.body(), "username already in use");
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_login_only_loginerr_counts_as_rejection() {
    let (mut session, _probe) = scripted_session("modeok\ncmderr\n");
    session.connect().unwrap();

    let response = session.login("alice").unwrap();
    assert_eq!(response.kind(), ResponseKind::CmdErr);
    assert_eq!(session.state(), SessionState::Authorized);
}

#[test]
fn test_relogin_while_authorized() {
    let (mut session, _probe) = scripted_session("modeok\nloginok\nloginok\n");
    session.connect().unwrap();
    session.login("alice").unwrap();
    session.login("alice2").unwrap();
    assert_eq!(session.state(), SessionState::Authorized);
}

#[test]
fn test_login_without_connection() {
    let (mut session, _probe) = scripted_session("");
    assert!(matches!(session.login("alice"), Err(ChatError::NotConnected)));
}

// =============================================================================
// Dispatch Guard Tests
// =============================================================================

#[test]
fn test_dispatch_rejects_operations_while_disconnected() {
    let mut session = ChatSession::with_connector(Config::default(), ScriptedConnector::default());

    let requests = [
        Request::Login {
            username: "alice".to_string(),
        },
        Request::SendPublicMessage {
            text: "hi".to_string(),
        },
        Request::SendPrivateMessage {
            recipient: "bob".to_string(),
            text: "hi".to_string(),
        },
        Request::ReadInbox,
        Request::ListUsers,
        Request::GetJoke,
        Request::Disconnect,
    ];

    for request in requests {
        let operation = request.operation();
        match session.dispatch(request) {
            Err(ChatError::InvalidState { operation: op, state }) => {
                assert_eq!(op, operation);
                assert_eq!(state, SessionState::Disconnected);
            }
            other => panic!("Expected InvalidState for {}, got {:?}", operation, other),
        }
    }
}

#[test]
fn test_dispatch_private_message_requires_login() {
    let (mut session, probe) = scripted_session("modeok\n");
    session.dispatch(Request::Connect).unwrap();

    let err = session
        .dispatch(Request::SendPrivateMessage {
            recipient: "bob".to_string(),
            text: "hi".to_string(),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ChatError::InvalidState {
            operation: Operation::SendPrivateMessage,
            state: SessionState::Connected,
        }
    ));
    assert_eq!(probe.sent(), "sync\n");
}

#[test]
fn test_dispatch_full_flow() {
    let (mut session, probe) = scripted_session(
        "modeok\nloginok\nmsgok\nmsgok\nusers alice bob\njoke knock knock\nsupported login msg users\n",
    );

    assert_eq!(session.dispatch(Request::Connect).unwrap(), Outcome::Connected);
    session
        .dispatch(Request::Login {
            username: "alice".to_string(),
        })
        .unwrap();
    session
        .dispatch(Request::SendPublicMessage {
            text: "hello all".to_string(),
        })
        .unwrap();
    session
        .dispatch(Request::SendPrivateMessage {
            recipient: "bob".to_string(),
            text: "hi there".to_string(),
        })
        .unwrap();

    match session.dispatch(Request::ListUsers).unwrap() {
        Outcome::Reply(r) => assert_eq!(r.users(), vec!["alice", "bob"]),
        other => panic!("Expected reply, got {:?}", other),
    }
    match session.dispatch(Request::GetJoke).unwrap() {
        Outcome::Reply(r) => assert_eq!(r.body(), "knock knock"),
        other => panic!("Expected reply, got {:?}", other),
    }
    match session.dispatch(Request::ListSupported).unwrap() {
        Outcome::Reply(r) => assert_eq!(r.kind(), ResponseKind::Supported),
        other => panic!("Expected reply, got {:?}", other),
    }

    assert_eq!(session.dispatch(Request::Disconnect).unwrap(), Outcome::Disconnected);
    assert_eq!(
        probe.sent_lines(),
        vec![
            "sync",
            "login alice",
            "msg hello all",
            "msg bob hi there",
            "users",
            "joke",
            "help",
        ]
    );
}

// =============================================================================
// Messaging Tests
// =============================================================================

#[test]
fn test_end_to_end_scenario() {
    let (mut session, probe) = scripted_session("modeok\nloginok\nmsgok\n");

    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);

    session.login("alice").unwrap();
    assert_eq!(session.state(), SessionState::Authorized);

    let response = session.send_public_message("hello world").unwrap();
    assert_eq!(response.kind(), ResponseKind::MsgOk);
    assert_eq!(session.state(), SessionState::Authorized);

    assert_eq!(probe.sent(), "sync\nlogin alice\nmsg hello world\n");
}

#[test]
fn test_message_refusal_is_an_outcome() {
    let (mut session, _probe) = scripted_session("modeok\nloginok\nmsgerr incorrect recipient\n");
    session.connect().unwrap();
    session.login("alice").unwrap();

    let response = session.send_private_message("nobody", "hi").unwrap();
    assert_eq!(response.kind(), ResponseKind::MsgErr);
    assert_eq!(session.state(), SessionState::Authorized);
}

#[test]
fn test_line_breaks_in_arguments_rejected() {
    let (mut session, probe) = scripted_session("modeok\n");
    session.connect().unwrap();

    assert!(matches!(
        session.send_public_message("two\nlines"),
        Err(ChatError::InvalidArgument(_))
    ));
    assert!(matches!(
        session.login("alice\r"),
        Err(ChatError::InvalidArgument(_))
    ));
    assert_eq!(probe.sent(), "sync\n");
}

#[test]
fn test_recipient_must_be_one_word() {
    let (mut session, probe) = scripted_session("modeok\nloginok\n");
    session.connect().unwrap();
    session.login("alice").unwrap();

    for recipient in ["", "bob smith", " bob"] {
        assert!(matches!(
            session.send_private_message(recipient, "hi"),
            Err(ChatError::InvalidArgument(_))
        ));
    }
    assert_eq!(probe.sent_lines(), vec!["sync", "login alice"]);
}

#[test]
fn test_repeated_users_requests_are_identical() {
    let (mut session, _probe) = scripted_session("modeok\nusers alice bob\nusers alice bob\n");
    session.connect().unwrap();

    let first = session.list_users().unwrap();
    let second = session.list_users().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_read_inbox_keeps_stream_aligned() {
    let (mut session, probe) = scripted_session(
        "modeok\ninbox 3\nmsg hello\nprivmsg hi-bob\nmsg world\njoke last one\n",
    );
    session.connect().unwrap();

    let batch = session.read_inbox().unwrap();
    let private: Vec<_> = batch.private().map(|m| m.text.as_str()).collect();
    let public: Vec<_> = batch.public().map(|m| m.text.as_str()).collect();
    assert_eq!(private, vec!["hi-bob"]);
    assert_eq!(public, vec!["hello", "world"]);
    assert_eq!(session.state(), SessionState::Connected);

    let joke = session.get_joke().unwrap();
    assert_eq!(joke.body(), "last one");
    assert_eq!(probe.sent_lines(), vec!["sync", "inbox", "joke"]);
}

#[test]
fn test_discard_bound_surfaces_response_timeout() {
    let config = Config::builder().max_discarded_lines(1).build();
    let (mut session, _probe) =
        scripted_session_with_config(config, "modeok\nnoise\nmore noise\nmsgok\n");
    session.connect().unwrap();

    let err = session.send_public_message("hi").unwrap_err();
    assert!(matches!(err, ChatError::ResponseTimeout { discarded: 2 }));
    assert_eq!(session.state(), SessionState::Connected);
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[test]
fn test_read_timeout_keeps_state() {
    let (transport, _probe) = ScriptedTransport::new("modeok\nloginok\n");
    let transport = transport.stalls_after_script(io::ErrorKind::WouldBlock);
    let mut session = ChatSession::with_connector(Config::default(), ScriptedConnector::new([transport]));

    session.connect().unwrap();
    session.login("alice").unwrap();

    let err = session.get_joke().unwrap_err();
    assert!(matches!(err, ChatError::Timeout(_)));
    assert_eq!(session.state(), SessionState::Authorized);
    assert!(session.is_connected());
}

#[test]
fn test_peer_hangup_keeps_state() {
    let (mut session, _probe) = scripted_session("modeok\n");
    session.connect().unwrap();

    assert!(matches!(session.list_users(), Err(ChatError::ConnectionClosed)));
    assert_eq!(session.state(), SessionState::Connected);

    session.disconnect().unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);
}

// =============================================================================
// Disconnect Tests
// =============================================================================

#[test]
fn test_disconnect_releases_connection() {
    let (mut session, probe) = scripted_session("modeok\nloginok\n");
    session.connect().unwrap();
    session.login("alice").unwrap();

    session.disconnect().unwrap();
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
    assert_eq!(probe.closes(), 1);
}

#[test]
fn test_disconnect_without_connection() {
    let (mut session, _probe) = scripted_session("");
    assert!(matches!(session.disconnect(), Err(ChatError::NotConnected)));
}

#[test]
fn test_disconnect_failure_release_policy() {
    let (transport, probe) = ScriptedTransport::new("modeok\n");
    let transport = transport.failing_close(io::ErrorKind::NotConnected);
    let config = Config::builder()
        .disconnect_policy(DisconnectPolicy::ReleaseOnError)
        .build();
    let mut session = ChatSession::with_connector(config, ScriptedConnector::new([transport]));
    session.connect().unwrap();

    match session.disconnect() {
        Err(ChatError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotConnected),
        other => panic!("Expected Io error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
    assert_eq!(probe.closes(), 1);
}

#[test]
fn test_disconnect_failure_keep_policy() {
    let (transport, probe) = ScriptedTransport::new("modeok\nloginok\n");
    let transport = transport.failing_close(io::ErrorKind::NotConnected);
    let config = Config::builder()
        .disconnect_policy(DisconnectPolicy::KeepOnError)
        .build();
    let mut session = ChatSession::with_connector(config, ScriptedConnector::new([transport]));
    session.connect().unwrap();
    session.login("alice").unwrap();

    assert!(session.disconnect().is_err());
    assert_eq!(session.state(), SessionState::Authorized);
    assert!(session.is_connected());

    // Retry hits the same failure and still keeps the session
    assert!(session.disconnect().is_err());
    assert_eq!(probe.closes(), 2);
    assert_eq!(session.state(), SessionState::Authorized);
}

#[test]
fn test_reconnect_after_disconnect() {
    let (first, first_probe) = ScriptedTransport::new("modeok\nloginok\n");
    let (second, second_probe) = ScriptedTransport::new("modeok\n");
    let connector = ScriptedConnector::new([first, second]);
    let mut session = ChatSession::with_connector(Config::default(), connector);

    session.connect().unwrap();
    session.login("alice").unwrap();
    session.disconnect().unwrap();

    session.connect().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(first_probe.sent_lines(), vec!["sync", "login alice"]);
    assert_eq!(second_probe.sent_lines(), vec!["sync"]);
}
