//! Authentication state management for Home Helper
//!
//! [`AuthController`] is a handle to a background task that owns the current
//! [`AuthState`]. Events are queued and handled strictly one at a time; every
//! state a handler emits is stored and delivered to each subscriber in order.

mod bloc;
mod subscribers;
mod types;

use std::sync::Arc;

use home_helper_auth::AuthRepository;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::debug;

use crate::config::ControllerOptions;
use crate::error::Error;

use bloc::AuthBloc;
use subscribers::Subscribers;

pub use types::*;

struct Command {
    event: AuthEvent,
    done: Option<oneshot::Sender<AuthState>>,
}

/// Cloneable handle to the auth controller task.
///
/// The task stops once every handle has been dropped.
#[derive(Clone)]
pub struct AuthController {
    events: mpsc::Sender<Command>,
    state: Arc<RwLock<AuthState>>,
    subscribers: Subscribers,
}

impl AuthController {
    /// Start a controller with default options.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(repository: R) -> Self
    where
        R: AuthRepository + 'static,
    {
        Self::start(repository, ControllerOptions::default())
    }

    /// Start a controller with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use home_helper::{auth::AuthController, config::ControllerOptions};
    /// use home_helper_auth::MockAuthRepository;
    ///
    /// # tokio_test::block_on(async {
    /// let options = ControllerOptions::default()
    ///     .with_repository_timeout(Some(Duration::from_secs(10)));
    /// let _controller = AuthController::spawn_with_options(MockAuthRepository::new(), options)?;
    /// # Ok::<(), home_helper::error::Error>(())
    /// # }).unwrap();
    /// ```
    pub fn spawn_with_options<R>(repository: R, options: ControllerOptions) -> Result<Self, Error>
    where
        R: AuthRepository + 'static,
    {
        options.validate()?;
        Ok(Self::start(repository, options))
    }

    fn start<R>(repository: R, options: ControllerOptions) -> Self
    where
        R: AuthRepository + 'static,
    {
        let (events_tx, mut events_rx) = mpsc::channel::<Command>(options.event_buffer);
        let subscribers = Subscribers::default();
        let state = Arc::new(RwLock::new(AuthState::initial()));

        let bloc = AuthBloc::new(
            repository,
            state.clone(),
            subscribers.clone(),
            options.repository_timeout,
        );

        tokio::spawn(async move {
            debug!("auth controller task started");
            while let Some(command) = events_rx.recv().await {
                bloc.handle(command.event).await;
                if let Some(done) = command.done {
                    // The caller may have stopped waiting
                    let _ = done.send(bloc.current().await);
                }
            }
            debug!("auth controller task finished");
        });

        Self {
            events: events_tx,
            state,
            subscribers,
        }
    }

    /// Queue an event without waiting for it to be handled
    pub async fn add(&self, event: AuthEvent) -> Result<(), Error> {
        self.events.send(Command { event, done: None }).await?;
        Ok(())
    }

    /// Queue an event and wait until it has been handled.
    ///
    /// Returns the state as it stood right after this event, which is the
    /// unchanged current state when the event was ignored.
    pub async fn process(&self, event: AuthEvent) -> Result<AuthState, Error> {
        let (done_tx, done_rx) = oneshot::channel();
        self.events
            .send(Command {
                event,
                done: Some(done_tx),
            })
            .await?;
        Ok(done_rx.await?)
    }

    /// Current state snapshot
    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Receive every state published from now on, in order.
    ///
    /// Delivery is unbounded: a reader that falls behind still gets every
    /// state. The stream ends once the controller task has stopped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthState> {
        self.subscribers.subscribe()
    }

    /// Whether the controller task is still accepting events
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
