//! Application-facing consumer handle.

use std::sync::Arc;
use std::time::Duration;

use tether_membership::{Delivery, Diagnostic, FatalError, MembershipStateMachine, RebalanceEvent};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::time::Instant;
use tracing::info;

use crate::config::ClientConfig;
use crate::driver::{Command, Driver, MembershipSnapshot};
use crate::error::{ClientError, ClientResult};
use crate::listener::RebalanceListener;
use crate::transport::HeartbeatTransport;

const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Handle to a consumer group membership.
///
/// Owns the rebalance listener. Heartbeats run on a background task spawned
/// by `new`; dropping the handle stops that task.
pub struct GroupConsumer<L> {
    commands: mpsc::Sender<Command>,
    ready: Arc<Notify>,
    diagnostics: mpsc::Receiver<Diagnostic>,
    listener: L,
    /// The listener returned for an event the driver has not been told about.
    unacknowledged: bool,
    close_started: bool,
    close_outcome: Option<Result<(), FatalError>>,
}

impl<L: RebalanceListener> GroupConsumer<L> {
    /// Creates the membership and spawns its driver.
    ///
    /// Must be called from within a tokio runtime. Nothing is sent until
    /// `subscribe`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new<T: HeartbeatTransport>(
        config: ClientConfig,
        transport: T,
        listener: L,
    ) -> ClientResult<Self> {
        config.validate().map_err(ClientError::Config)?;
        let machine =
            MembershipStateMachine::new(config.membership.clone()).map_err(ClientError::Config)?;

        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        // At most one heartbeat is outstanding.
        let (completions_tx, completions_rx) = mpsc::channel(1);
        let (diagnostics_tx, diagnostics_rx) = mpsc::channel(config.diagnostics_capacity);
        let ready = Arc::new(Notify::new());

        let driver = Driver::new(
            machine,
            transport,
            config.request_timeout(),
            completions_tx,
            diagnostics_tx,
            Arc::clone(&ready),
        );
        tokio::spawn(driver.run(commands_rx, completions_rx));

        info!(
            group_id = %config.membership.group_id,
            client_id = %config.client_id,
            "consumer created"
        );

        Ok(Self {
            commands: commands_tx,
            ready,
            diagnostics: diagnostics_rx,
            listener,
            unacknowledged: false,
            close_started: false,
            close_outcome: None,
        })
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> ClientResult<R> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| ClientError::DriverGone)?;
        rx.await.map_err(|_| ClientError::DriverGone)
    }

    /// Tells the driver the listener is done with the last event.
    ///
    /// The flag is cleared only once the command is queued, so a cancelled
    /// call is retried by the next `poll` or `close`.
    async fn acknowledge(&mut self) -> ClientResult<()> {
        if self.unacknowledged {
            self.commands
                .send(Command::Acknowledge)
                .await
                .map_err(|_| ClientError::DriverGone)?;
            self.unacknowledged = false;
        }
        Ok(())
    }

    /// Subscribes to `topics`, joining the group if needed.
    ///
    /// # Errors
    /// Returns an error if the consumer is closed or failed, or the topic
    /// list is rejected.
    pub async fn subscribe<I, S>(&mut self, topics: I) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.close_started {
            return Err(ClientError::Closed);
        }
        let topics = topics.into_iter().map(Into::into).collect();
        self.request(|response| Command::Subscribe { topics, response })
            .await?
            .map_err(ClientError::rejected)
    }

    /// Waits up to `timeout` for the next rebalance event.
    ///
    /// At most one event is returned per call, after the listener has seen
    /// it. The owned set changes, and the coordinator hears about it, only
    /// once the listener has returned. If the call is cancelled before the
    /// event reaches the listener, the next call receives it again. A fatal
    /// membership error is returned once; later calls return `Ok(None)`.
    ///
    /// # Errors
    /// Returns `ClientError::Fatal` once after a fatal error and
    /// `ClientError::Closed` after `close`.
    pub async fn poll(&mut self, timeout: Duration) -> ClientResult<Option<RebalanceEvent>> {
        if self.close_started {
            return Err(ClientError::Closed);
        }
        self.acknowledge().await?;
        let deadline = Instant::now() + timeout;
        loop {
            match self.request(|response| Command::Poll { response }).await? {
                Some(Delivery::Event(event)) => {
                    self.listener.on_rebalance(&event);
                    self.unacknowledged = true;
                    self.acknowledge().await?;
                    return Ok(Some(event));
                }
                Some(Delivery::Fatal(err)) => return Err(ClientError::Fatal(err)),
                None => {}
            }
            if tokio::time::timeout_at(deadline, self.ready.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    /// Leaves the group.
    ///
    /// Held partitions are revoked through the listener (or reported lost if
    /// the membership was fenced or failed), then the leave heartbeat is sent
    /// and awaited up to the configured close timeout. Calling `close` again
    /// returns the first outcome.
    ///
    /// # Errors
    /// Returns the fatal error if the membership failed.
    pub async fn close(&mut self) -> ClientResult<()> {
        if let Some(outcome) = &self.close_outcome {
            return outcome.clone().map_err(ClientError::Fatal);
        }
        self.acknowledge().await?;
        self.close_started = true;

        if let Some(event) = self
            .request(|response| Command::BeginClose { response })
            .await?
        {
            self.listener.on_rebalance(&event);
        }

        let outcome = self.request(|response| Command::Leave { response }).await?;
        self.close_outcome = Some(outcome.clone());
        outcome.map_err(ClientError::Fatal)
    }

    /// Returns a view of the membership.
    ///
    /// # Errors
    /// Returns an error if the driver stopped.
    pub async fn snapshot(&self) -> ClientResult<MembershipSnapshot> {
        self.request(|response| Command::Snapshot { response })
            .await
    }

    /// Drains the diagnostics reported since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        while let Ok(diagnostic) = self.diagnostics.try_recv() {
            out.push(diagnostic);
        }
        out
    }

    /// Returns the listener.
    pub const fn listener(&self) -> &L {
        &self.listener
    }
}
