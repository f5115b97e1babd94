#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-writer game session shared by every dungeon crawler adapter.
//!
//! The session owns the [`World`] and is the only code that mutates it.
//! Producers push [`Input`] values through a bounded queue; after each
//! processed command the session broadcasts an immutable [`Snapshot`] to
//! every registered viewer.

mod turn;

use std::sync::{
    mpsc::{self, Receiver, Sender, SyncSender},
    Arc,
};

use anyhow::Result as AnyResult;
use crawl_core::{Command, Event};
use crawl_world::{
    query::{self, Snapshot},
    World,
};
use tracing::{debug, info, warn};

pub use crate::turn::TurnDriver;

/// Queue depth used when nothing else is configured.
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 64;

/// Identifier handed out when a viewer registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(u32);

impl ViewerId {
    /// Creates a viewer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Messages accepted by the inbound queue.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    /// World command followed by one monster round.
    Command(Command),
    /// Unregisters a viewer; closing the last one ends the session.
    CloseViewer(ViewerId),
    /// Ends the session immediately.
    Quit,
}

/// Reason [`Session::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionExit {
    /// A producer sent [`Input::Quit`].
    Quit,
    /// No viewer is left to receive snapshots.
    ViewersClosed,
    /// Every producer hung up.
    InputClosed,
}

/// Frontend that consumes snapshots until the stream ends.
pub trait Viewer {
    /// Runs the viewer until the session stops broadcasting or the viewer
    /// decides to exit.
    fn run(self, snapshots: Receiver<Arc<Snapshot>>) -> AnyResult<()>;
}

/// Owner of the world and the queues around it.
#[derive(Debug)]
pub struct Session {
    world: World,
    driver: TurnDriver,
    inbound: Receiver<Input>,
    viewers: Vec<(ViewerId, Sender<Arc<Snapshot>>)>,
    next_viewer: u32,
    events: Vec<Event>,
}

impl Session {
    /// Wraps `world` and returns the producer side of a queue holding at
    /// most `capacity` pending inputs.
    #[must_use]
    pub fn new(world: World, capacity: usize) -> (Self, SyncSender<Input>) {
        let (sender, inbound) = mpsc::sync_channel(capacity.max(1));
        let session = Self {
            world,
            driver: TurnDriver::new(),
            inbound,
            viewers: Vec::new(),
            next_viewer: 0,
            events: Vec::new(),
        };
        (session, sender)
    }

    /// Registers a viewer and sends it the current state right away.
    pub fn register_viewer(&mut self) -> (ViewerId, Receiver<Arc<Snapshot>>) {
        let id = ViewerId::new(self.next_viewer);
        self.next_viewer = self.next_viewer.wrapping_add(1);

        let (sender, receiver) = mpsc::channel();
        if let Some(snapshot) = query::snapshot(&self.world) {
            let _ = sender.send(Arc::new(snapshot));
        }
        self.viewers.push((id, sender));
        debug!(viewer = id.get(), "viewer registered");
        (id, receiver)
    }

    /// Read access for adapters that inspect the state between inputs.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events produced by the most recent command.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Number of viewers still receiving snapshots.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Processes inputs until one of the [`SessionExit`] conditions occurs.
    pub fn run(mut self) -> SessionExit {
        info!(
            level = query::level_name(&self.world),
            viewers = self.viewers.len(),
            "session started"
        );
        loop {
            let Ok(input) = self.inbound.recv() else {
                info!("input queue closed");
                return SessionExit::InputClosed;
            };
            if let Some(exit) = self.handle(input) {
                info!(?exit, turn = query::turn(&self.world), "session finished");
                return exit;
            }
        }
    }

    /// Processes one input and reports whether the session should end.
    pub fn handle(&mut self, input: Input) -> Option<SessionExit> {
        match input {
            Input::Command(command) => {
                self.events.clear();
                self.driver.process(&mut self.world, command, &mut self.events);
                for event in &self.events {
                    debug!(?event, "world event");
                }
                self.broadcast()
            }
            Input::CloseViewer(id) => {
                let before = self.viewers.len();
                self.viewers.retain(|(viewer, _)| *viewer != id);
                if self.viewers.len() == before {
                    warn!(viewer = id.get(), "close requested for an unknown viewer");
                }
                self.viewers.is_empty().then_some(SessionExit::ViewersClosed)
            }
            Input::Quit => Some(SessionExit::Quit),
        }
    }

    fn broadcast(&mut self) -> Option<SessionExit> {
        let snapshot = Arc::new(query::snapshot(&self.world)?);
        self.viewers.retain(|(id, sender)| {
            let delivered = sender.send(Arc::clone(&snapshot)).is_ok();
            if !delivered {
                warn!(viewer = id.get(), "viewer hung up");
            }
            delivered
        });
        self.viewers.is_empty().then_some(SessionExit::ViewersClosed)
    }
}
