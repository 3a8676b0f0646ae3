use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use russh::server::{Auth, Config, Handler, Msg, Server, Session};
use russh::{Channel, ChannelId, CryptoVec, MethodSet, Pty, SshId};
use russh_keys::key::PublicKey;
use russh_keys::PublicKeyBase64;

use crate::ansi;
use crate::events::{Event, EventDoc, EventSink, OfferedKey, SessionMeta};
use crate::fs::Fs;
use crate::session::Registry;
use crate::shell::{commands, complete, prompt, CommandOutcome, Completion, InputEvent, LineEditor};

const SERVER_ID: &str = "SSH-2.0-OpenSSH_8.4p1 Ubuntu-6ubuntu2.1";

/// Accepts connections and hands each one a `SessionHandler` wired to the
/// shared filesystem, registry and event sink.
pub struct HoneypotServer {
    fs: Arc<Fs>,
    registry: Arc<Registry>,
    sink: Arc<EventSink>,
    hostname: String,
}

impl HoneypotServer {
    pub fn new(fs: Fs, sink: EventSink, hostname: String) -> Self {
        let fs = Arc::new(fs);
        let registry = Arc::new(Registry::new(fs.root()));
        Self {
            fs,
            registry,
            sink: Arc::new(sink),
            hostname,
        }
    }

    pub async fn run(mut self, port: u16) -> Result<()> {
        let host_key = crate::hostkey::host_keypair(&self.hostname)?;
        let config = Arc::new(Config {
            server_id: SshId::Standard(SERVER_ID.to_string()),
            methods: MethodSet::PUBLICKEY | MethodSet::PASSWORD,
            keys: vec![host_key],
            auth_rejection_time: Duration::from_secs(1),
            auth_rejection_time_initial: Some(Duration::ZERO),
            inactivity_timeout: None,
            ..Default::default()
        });

        tracing::info!(port, host = %self.hostname, "Honeypot listening");
        self.run_on_address(config, ("0.0.0.0", port)).await?;
        Ok(())
    }
}

impl Server for HoneypotServer {
    type Handler = SessionHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> SessionHandler {
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session = %session_id, peer = ?peer, "Connection opened");
        SessionHandler {
            fs: self.fs.clone(),
            registry: self.registry.clone(),
            sink: self.sink.clone(),
            hostname: self.hostname.clone(),
            session_id,
            peer,
            username: String::new(),
            editor: LineEditor::new(),
            closed: false,
        }
    }
}

/// Per-connection state: the line editor, the session's identity, and
/// handles to the shared pieces. Auth callbacks run before the shell opens,
/// so the interactive loop always sees the full credential history.
pub struct SessionHandler {
    fs: Arc<Fs>,
    registry: Arc<Registry>,
    sink: Arc<EventSink>,
    hostname: String,
    session_id: String,
    peer: Option<SocketAddr>,
    username: String,
    editor: LineEditor,
    closed: bool,
}

impl SessionHandler {
    async fn annotate(&self, event: Event) -> EventDoc {
        let (cwd, passwords, keys) = self.registry.snapshot(&self.session_id).await;
        let meta = SessionMeta {
            session_id: &self.session_id,
            username: &self.username,
            remote_addr: self.peer,
        };
        EventDoc::annotate(event, &meta, self.fs.path(cwd), passwords, keys)
    }

    /// Auth-path emission, synchronous with the callback so no attempt can
    /// be lost to a racing disconnect.
    async fn emit_now(&self, event: Event) {
        let doc = self.annotate(event).await;
        self.sink.ship(doc).await;
    }

    /// Interactive-path emission, fire-and-forget so the shell never waits
    /// on the backend.
    async fn emit_detached(&self, event: Event) {
        let doc = self.annotate(event).await;
        let sink = self.sink.clone();
        tokio::spawn(async move { sink.ship(doc).await });
    }

    async fn prompt(&self) -> String {
        let cwd = self.registry.cwd(&self.session_id).await;
        prompt::render(&self.username, &self.hostname, &self.fs.path(cwd))
    }

    async fn close_session(&mut self, channel: ChannelId, session: &mut Session) {
        self.closed = true;
        self.registry.remove(&self.session_id).await;
        tracing::info!(session = %self.session_id, user = %self.username, "Session closed");
        session.close(channel);
    }
}

#[async_trait]
impl Handler for SessionHandler {
    type Error = anyhow::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        self.username = user.to_string();
        self.registry
            .record_password(&self.session_id, password)
            .await;
        tracing::info!(session = %self.session_id, user, "Password attempt");
        self.emit_now(Event::TriedPassword {
            password: password.to_string(),
        })
        .await;
        Ok(Auth::Accept)
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        self.username = user.to_string();
        let authorized = format!("{} {}", key.name(), key.public_key_base64());
        self.registry
            .record_key(
                &self.session_id,
                OfferedKey {
                    key: authorized.clone(),
                    key_type: key.name().to_string(),
                },
            )
            .await;
        tracing::info!(session = %self.session_id, user, algo = key.name(), "Public key attempt");
        self.emit_now(Event::TriedPubkey { key: authorized }).await;

        // Reject so the client falls through to password auth and donates
        // credentials there.
        Ok(Auth::Reject {
            proceed_with_methods: Some(MethodSet::PASSWORD),
        })
    }

    async fn channel_open_session(
        &mut self,
        _channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        _term: &str,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel);
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel);
        tracing::info!(session = %self.session_id, user = %self.username, "Shell opened");
        self.emit_detached(Event::Login {
            username: self.username.clone(),
        })
        .await;
        let prompt = self.prompt().await;
        session.data(channel, CryptoVec::from(prompt.into_bytes()));
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.closed {
            return Ok(());
        }

        let mut out: Vec<u8> = Vec::new();
        let mut close = false;

        for &byte in data {
            match self.editor.feed(byte) {
                InputEvent::Pending => {}
                InputEvent::Echo(b) => out.push(b),
                InputEvent::Erase => out.extend_from_slice(b"\x08 \x08"),
                InputEvent::ClearScreen => {
                    out.extend_from_slice(ansi::CLEAR_SCREEN.as_bytes());
                    out.extend_from_slice(self.prompt().await.as_bytes());
                }
                InputEvent::Tab => {
                    let cwd = self.registry.cwd(&self.session_id).await;
                    match complete::complete(&self.fs, cwd, &self.editor.line()) {
                        Completion::None => {}
                        Completion::Append(suffix) => {
                            self.editor.append(&suffix);
                            out.extend_from_slice(suffix.as_bytes());
                        }
                        Completion::List(list) => {
                            out.push(b'\n');
                            out.extend_from_slice(list.as_bytes());
                            out.push(b'\n');
                            out.extend_from_slice(self.prompt().await.as_bytes());
                            out.extend_from_slice(self.editor.line().as_bytes());
                        }
                    }
                }
                InputEvent::Interrupt(line) => {
                    self.emit_detached(Event::CommandRun { command: line }).await;
                    out.extend_from_slice(b"^C\n");
                    out.extend_from_slice(self.prompt().await.as_bytes());
                }
                InputEvent::Submit(line) => {
                    self.emit_detached(Event::CommandRun {
                        command: line.clone(),
                    })
                    .await;
                    out.push(b'\n');

                    let fs = self.fs.clone();
                    let username = self.username.clone();
                    let outcome = self
                        .registry
                        .with_state(&self.session_id, |state| {
                            commands::run(&fs, state, &username, &line)
                        })
                        .await;

                    match outcome {
                        CommandOutcome::Exit => {
                            self.emit_detached(Event::Logout {
                                username: self.username.clone(),
                            })
                            .await;
                            close = true;
                        }
                        CommandOutcome::Output(text) => {
                            out.extend_from_slice(text.as_bytes());
                            out.extend_from_slice(self.prompt().await.as_bytes());
                        }
                    }
                }
                InputEvent::Eof => {
                    out.extend_from_slice(b"logout\n");
                    self.emit_detached(Event::Logout {
                        username: self.username.clone(),
                    })
                    .await;
                    close = true;
                }
            }

            if close {
                break;
            }
        }

        if !out.is_empty() {
            session.data(channel, CryptoVec::from(out));
        }
        if close {
            self.close_session(channel, session).await;
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        // Abrupt disconnects skip the shell's close paths; drop the state
        // here so the registry never leaks sessions.
        if !self.closed {
            self.close_session(channel, session).await;
        }
        Ok(())
    }
}
