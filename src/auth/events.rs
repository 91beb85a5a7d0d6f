//! Notifications for changes to a user's authentication state.
//!
//! Handlers publish a [SessionEvent] whenever a session starts, is refreshed
//! or ends. The server registers a single listener at start-up and shuts it
//! down before exiting.

use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        oneshot,
    },
    task::JoinHandle,
};

/// How many events can be buffered before slow listeners start missing events.
const EVENT_BUFFER_SIZE: usize = 64;

/// A change in authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user with this email logged in.
    SignedIn(String),
    /// A new account was created for this email.
    SignedUp(String),
    /// The access token for this email was refreshed.
    Refreshed(String),
    /// The user with this email logged out.
    SignedOut(String),
    /// A session could not be refreshed and was discarded.
    Expired,
}

/// Broadcasts [SessionEvent]s to any number of listeners.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    /// Create a channel with no listeners.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        Self { sender }
    }

    /// Send `event` to every listener. Events published while nobody is
    /// listening are dropped.
    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!("session event: {event:?}");

        if self.sender.send(event).is_err() {
            tracing::debug!("no listeners for session event");
        }
    }

    /// Receive events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Call `on_event` for every event published from now on, on a background
    /// task, until the returned listener is shut down or dropped.
    pub fn listen<F>(&self, mut on_event: F) -> SessionListener
    where
        F: FnMut(SessionEvent) + Send + 'static,
    {
        let mut receiver = self.subscribe();
        let (stop_sender, mut stop_receiver) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = &mut stop_receiver => break,
                    event = receiver.recv() => match event {
                        Ok(event) => on_event(event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("session listener missed {skipped} events");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });

        SessionListener {
            stop_sender: Some(stop_sender),
            task: Some(task),
        }
    }
}

/// A running listener created by [SessionEvents::listen].
///
/// Dropping the listener aborts its task. Call [SessionListener::shutdown]
/// to stop it and wait for the task to finish.
#[derive(Debug)]
pub struct SessionListener {
    stop_sender: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionListener {
    /// Stop listening and wait for the background task to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop_sender) = self.stop_sender.take() {
            // The task may have already exited if the channel closed.
            let _ = stop_sender.send(());
        }

        if let Some(task) = self.task.take()
            && let Err(error) = task.await
        {
            tracing::error!("session listener task failed: {error}");
        }
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
