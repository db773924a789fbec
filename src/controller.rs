// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async owner of the search session.
//!
//! The controller task processes one event at a time: user commands, debounce
//! expiry and fetch completions. Views hold a [`ControllerHandle`], send
//! commands through it and watch [`Snapshot`]s. The task exits once every
//! handle is dropped and in-flight fetches have reported back.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

use crate::client::{execute, Request, Response, SearchBackend};
use crate::debounce::Debouncer;
use crate::errors::{ClientError, ControllerError, SessionError};
use crate::filters::FacetKind;
use crate::location::{SearchParams, Tab};
use crate::session::{Completion, SearchSession, Snapshot, Ticket};

type ToggleReply = oneshot::Sender<Result<(), SessionError>>;

#[derive(Debug)]
pub enum Command {
    Load(SearchParams),
    Input(String),
    Toggle {
        kind: FacetKind,
        index: usize,
        reply: ToggleReply,
    },
    ToggleValue {
        kind: FacetKind,
        value: String,
        reply: ToggleReply,
    },
    SelectTab(Tab),
    Submit,
    OpenDocument(String),
}

#[derive(Debug)]
enum Event {
    Command(Command),
    DebounceElapsed(u64),
    Completed {
        ticket: Ticket,
        result: Result<Response, ClientError>,
    },
}

/// Cloneable front door to a running controller.
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Snapshot>,
}

impl ControllerHandle {
    pub fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.events
            .send(Event::Command(command))
            .map_err(|_| ControllerError::Closed)
    }

    pub fn load(&self, params: SearchParams) -> Result<(), ControllerError> {
        self.send(Command::Load(params))
    }

    /// Query text changed; the search goes out after the debounce period.
    pub fn input(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Command::Input(text.into()))
    }

    pub fn submit(&self) -> Result<(), ControllerError> {
        self.send(Command::Submit)
    }

    pub fn select_tab(&self, tab: Tab) -> Result<(), ControllerError> {
        self.send(Command::SelectTab(tab))
    }

    pub fn open_document(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Command::OpenDocument(id.into()))
    }

    /// Toggle the `index`-th (0-based) bucket of `kind`.
    pub async fn toggle(&self, kind: FacetKind, index: usize) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Toggle { kind, index, reply })?;
        rx.await.map_err(|_| ControllerError::Closed)??;
        Ok(())
    }

    pub async fn toggle_value(
        &self,
        kind: FacetKind,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ToggleValue {
            kind,
            value: value.into(),
            reply,
        })?;
        rx.await.map_err(|_| ControllerError::Closed)??;
        Ok(())
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

pub struct Controller<B: ?Sized> {
    backend: Arc<B>,
    session: SearchSession,
    debouncer: Debouncer,
    generation: u64,
    events: mpsc::WeakUnboundedSender<Event>,
    snapshots: watch::Sender<Snapshot>,
}

impl<B> Controller<B>
where
    B: SearchBackend + ?Sized + 'static,
{
    /// Start the controller task on the current tokio runtime.
    pub fn spawn(backend: Arc<B>, debounce: Duration) -> ControllerHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(Snapshot::default());
        let controller = Controller {
            backend,
            session: SearchSession::new(),
            debouncer: Debouncer::new(debounce),
            generation: 0,
            events: events_tx.downgrade(),
            snapshots: snapshots_tx,
        };
        tokio::spawn(controller.run(events_rx));
        ControllerHandle {
            events: events_tx,
            snapshots: snapshots_rx,
        }
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
            self.publish();
        }
        self.debouncer.cancel();
        tracing::debug!("search controller stopped");
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Command(command) => self.handle_command(command),
            Event::DebounceElapsed(generation) => {
                // A timer that fired just before being replaced is outdated.
                if generation != self.generation {
                    return;
                }
                let request = self.session.debounced_request();
                self.dispatch(request);
            }
            Event::Completed { ticket, result } => {
                if self.session.complete(ticket, result) == Completion::Stale {
                    tracing::trace!(seq = ticket.seq, "stale completion ignored");
                }
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Load(params) => {
                let request = self.session.load(params);
                self.dispatch(request);
            }
            Command::Input(text) => {
                self.session.set_query(text);
                self.schedule_debounce();
            }
            Command::Toggle { kind, index, reply } => {
                let outcome = self.session.toggle_bucket(kind, index);
                self.reply_toggle(outcome, reply);
            }
            Command::ToggleValue { kind, value, reply } => {
                let outcome = self.session.toggle_value(kind, &value);
                self.reply_toggle(outcome, reply);
            }
            Command::SelectTab(tab) => {
                let request = self.session.select_tab(tab);
                self.dispatch(request);
            }
            Command::Submit => {
                self.cancel_debounce();
                let request = self.session.submit();
                self.dispatch(request);
            }
            Command::OpenDocument(id) => {
                let request = self.session.open_document(id);
                self.dispatch(Some(request));
            }
        }
    }

    fn reply_toggle(
        &mut self,
        outcome: Result<Option<Request>, SessionError>,
        reply: ToggleReply,
    ) {
        let outcome = outcome.map(|request| self.dispatch(request));
        let _ = reply.send(outcome);
    }

    fn schedule_debounce(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        self.debouncer.schedule(async move {
            if let Some(events) = events.upgrade() {
                let _ = events.send(Event::DebounceElapsed(generation));
            }
        });
    }

    fn cancel_debounce(&mut self) {
        self.generation += 1;
        self.debouncer.cancel();
    }

    fn dispatch(&mut self, request: Option<Request>) {
        let Some(request) = request else {
            return;
        };
        let Some(events) = self.events.upgrade() else {
            return;
        };
        let ticket = self.session.begin(&request);
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let result = execute(backend.as_ref(), &request).await;
            let _ = events.send(Event::Completed { ticket, result });
        });
    }

    fn publish(&self) {
        let next = self.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
