//! Integration tests for the SMTP session against a scripted server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mailsmith_smtp::{
    AuthMechanism, AuthOutcome, Command, Credentials, Error, Extension, SmtpSession,
};
use support::mock_server::MockSmtpServer;

fn login() -> Credentials {
    Credentials::Login {
        username: "user@example.com".to_string(),
        password: "secret".to_string(),
    }
}

#[test]
fn full_exchange_is_logged_in_order() {
    let server = MockSmtpServer::builder().start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    assert_eq!(session.authenticate(&login()).unwrap(), AuthOutcome::Accepted);
    assert!(session.is_connected());
    assert!(!session.is_encrypted());

    for command in [
        Command::MailFrom {
            from: "user@example.com".to_string(),
        },
        Command::RcptTo {
            to: "friend@example.com".to_string(),
        },
        Command::Data,
    ] {
        assert!(session.send_command(&command).unwrap());
    }
    assert!(session.is_writing());

    session
        .send_command(&Command::Line("Subject: Hi\r\n\r\n.leading dot".to_string()))
        .unwrap();
    let entry = session.last_log_entry().unwrap();
    assert_eq!(entry.code, 0);
    assert_eq!(entry.message, "-");

    session.send_command(&Command::EndData).unwrap();
    assert!(!session.is_writing());
    assert_eq!(session.last_code(), 250);

    session.send_command(&Command::Quit).unwrap();
    assert!(!session.is_connected());

    let last = session.last_log_entry().unwrap();
    assert_eq!(last.command, "QUIT");
    assert_eq!(last.code, 221);
    assert_eq!(session.last_command(), "QUIT");

    let commands: Vec<_> = session
        .log()
        .iter()
        .map(|e| e.command.split_whitespace().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(commands[..3], ["CONNECT", "GREETING", "EHLO"]);
    assert!(
        session
            .log()
            .all()
            .windows(2)
            .all(|w| w[0].time <= w[1].time)
    );

    drop(session);
    let messages = server.messages();
    assert_eq!(messages, ["Subject: Hi\r\n\r\n.leading dot"]);
}

#[test]
fn ehlo_capabilities_are_recorded() {
    let server = MockSmtpServer::builder()
        .with_capabilities(&["AUTH LOGIN XOAUTH2", "SIZE 2048", "8BITMIME"])
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    assert!(session.connect().unwrap());
    assert!(session.connect().unwrap(), "second connect is a no-op");
    assert_eq!(server.connections(), 1);

    assert_eq!(
        session.capabilities(),
        ["AUTH LOGIN XOAUTH2", "SIZE 2048", "8BITMIME"]
    );
    assert!(session.extensions().contains(&Extension::Size(Some(2048))));
    assert_eq!(
        session.auth_mechanisms(),
        [AuthMechanism::Login, AuthMechanism::XOAuth2]
    );
    assert!(!session.set_timeout(10), "timeout is fixed once connected");
}

#[test]
fn refused_starttls_fails_connect() {
    let server = MockSmtpServer::builder()
        .with_capabilities(&["STARTTLS", "AUTH LOGIN"])
        .with_starttls_response(454, "4.7.0 TLS not available")
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    assert!(!session.connect().unwrap());
    assert!(!session.is_connected());
    assert!(session.capabilities().is_empty());

    let starttls = session
        .log()
        .iter()
        .find(|e| e.command == "STARTTLS")
        .unwrap();
    assert_eq!(starttls.code, 454);
    let last = session.last_log_entry().unwrap();
    assert_eq!(last.command, "CONNECT");
    assert!(last.message.starts_with("STARTTLS refused"));

    assert_eq!(session.authenticate(&login()).unwrap(), AuthOutcome::Unreachable);
    assert_eq!(server.connections(), 2);
    assert!(!server.commands().iter().any(|c| c.starts_with("AUTH")));
}

#[test]
fn failed_tls_upgrade_fails_connect() {
    let server = MockSmtpServer::builder()
        .with_capabilities(&["STARTTLS", "AUTH LOGIN"])
        .with_starttls_response(220, "2.0.0 Ready to start TLS")
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    assert!(!session.connect().unwrap());
    assert!(!session.is_connected());
    assert!(!session.is_encrypted());
    assert!(session.capabilities().is_empty(), "plain-text capabilities are dropped");

    let last = session.last_log_entry().unwrap();
    assert_eq!(last.command, "CONNECT");
    assert!(last.message.starts_with("handshake failed"));
    assert_eq!(server.commands(), ["EHLO 127.0.0.1", "STARTTLS"]);
}

#[test]
fn bad_greeting_is_a_protocol_error() {
    let server = MockSmtpServer::builder()
        .with_greeting(554, "no service")
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    let err = session.connect().unwrap_err();
    assert_eq!(err.code(), Some(554));
    let log = err.log().unwrap();
    let greeting = log.last_entry().unwrap();
    assert_eq!(greeting.command, "GREETING");
    assert_eq!(greeting.code, 554);
    assert!(!session.is_connected());
}

#[test]
fn rejected_password_reports_code_and_log() {
    let server = MockSmtpServer::builder()
        .with_auth_responses(&[
            (334, "VXNlcm5hbWU6"),
            (334, "UGFzc3dvcmQ6"),
            (535, "5.7.8 Authentication credentials invalid"),
        ])
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    let outcome = session.authenticate(&login()).unwrap();
    let AuthOutcome::Rejected { code, message } = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(code, 535);
    assert!(message.contains("credentials invalid"));

    let entries = session.log().all();
    let tail: Vec<_> = entries[entries.len() - 3..]
        .iter()
        .map(|e| e.command.clone())
        .collect();
    assert_eq!(
        tail,
        [
            "AUTH LOGIN".to_string(),
            STANDARD.encode("user@example.com"),
            STANDARD.encode("secret"),
        ]
    );
    assert_eq!(entries[entries.len() - 4].command, "EHLO 127.0.0.1");
}

#[test]
fn failed_reply_poisons_the_session() {
    let server = MockSmtpServer::builder()
        .with_rcpt_to_response(550, "5.1.1 No such user")
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());
    session.authenticate(&login()).unwrap();

    session
        .send_command(&Command::MailFrom {
            from: "user@example.com".to_string(),
        })
        .unwrap();
    session
        .send_command(&Command::RcptTo {
            to: "nobody@example.com".to_string(),
        })
        .unwrap();
    assert_eq!(session.last_code(), 550);

    let err = session.send_command(&Command::Data).unwrap_err();
    assert!(matches!(err, Error::Protocol { code: 550, .. }));
    assert!(err.is_permanent());
    let snapshot = err.log().unwrap();
    assert_eq!(snapshot.last_entry().unwrap().command, "RCPT TO:<nobody@example.com>");
    assert!(
        !session.log().iter().any(|e| e.command == "DATA"),
        "DATA must never be sent"
    );
}

#[test]
fn xoauth2_error_challenge_is_answered_with_empty_line() {
    let server = MockSmtpServer::builder()
        .with_auth_responses(&[(334, "eyJzdGF0dXMiOiI0MDEifQ=="), (535, "5.7.8 token expired")])
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    let outcome = session
        .authenticate(&Credentials::XOAuth2 {
            user: "user@example.com".to_string(),
            token: "expired".to_string(),
        })
        .unwrap();
    assert!(matches!(outcome, AuthOutcome::Rejected { code: 535, .. }));
    assert_eq!(session.last_log_entry().unwrap().command, "");

    drop(session);
    let commands = server.commands();
    assert!(commands.iter().any(|c| c.starts_with("AUTH XOAUTH2 ")));
    assert_eq!(commands.last().map(String::as_str), Some(""));
}

#[test]
fn xoauth2_accepted() {
    let server = MockSmtpServer::builder()
        .with_auth_responses(&[(235, "2.7.0 Accepted")])
        .start();
    let mut session = SmtpSession::new("127.0.0.1", server.port());

    let outcome = session
        .authenticate(&Credentials::XOAuth2 {
            user: "user@example.com".to_string(),
            token: "ya29.token".to_string(),
        })
        .unwrap();
    assert!(outcome.is_accepted());
}
