use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use alloy::primitives::Address;
use log::{debug, info, warn};
use parking_lot::RwLock;
use tokio::{
    sync::{Mutex, broadcast::error::RecvError},
    task::JoinHandle,
};

use crate::{
    connector::{ConnectorEvent, WalletConnector},
    error::{ConnectError, ConnectorError},
    model::{Amount, SessionSnapshot, SessionState},
};

/// Connection state of the user's wallet.
///
/// The snapshot is only ever locked for short synchronous updates.
/// Connect and disconnect additionally serialize on `transition`, so at
/// most one of them is talking to the connector at a time.
///
/// `loss_epoch` is bumped, under the snapshot write lock, whenever the
/// wallet is reported lost or missing. A connect only commits if no loss
/// was reported while it was waiting on the connector.
pub struct WalletSession {
    connector: Arc<dyn WalletConnector>,
    snapshot: RwLock<SessionSnapshot>,
    transition: Mutex<()>,
    loss_epoch: AtomicU64,
}

impl WalletSession {
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        let snapshot = SessionSnapshot::initial(connector.kind());
        Self {
            connector,
            snapshot: RwLock::new(snapshot),
            transition: Mutex::new(()),
            loss_epoch: AtomicU64::new(0),
        }
    }

    pub(crate) fn connector(&self) -> &Arc<dyn WalletConnector> {
        &self.connector
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.read().state
    }

    pub fn is_connected(&self) -> bool {
        self.snapshot.read().is_connected()
    }

    pub fn active_account(&self) -> Option<Address> {
        self.snapshot.read().active_account
    }

    /// Last known balance; zero while disconnected or before the first fetch.
    pub fn current_balance(&self) -> Amount {
        let snapshot = self.snapshot.read();
        match snapshot.state {
            SessionState::Connected => snapshot.balance.unwrap_or(Amount::ZERO),
            _ => Amount::ZERO,
        }
    }

    /// Asks the connector whether the wallet is installed and ready.
    pub async fn refresh_readiness(&self) -> SessionState {
        let present = self.connector.is_extension_present();
        let ready = present && self.connector.is_ready().await;

        let mut snapshot = self.snapshot.write();
        let next = match (snapshot.state, present, ready) {
            (_, false, _) => SessionState::ExtensionMissing,
            (SessionState::Connected, true, _) => SessionState::Connected,
            (_, true, true) => SessionState::Disconnected,
            (state, true, false) => state,
        };
        snapshot.is_extension_present = present;
        snapshot.is_ready = ready;
        snapshot.state = next;
        if next == SessionState::ExtensionMissing {
            self.record_loss();
            snapshot.active_account = None;
            snapshot.balance = None;
        }
        debug!("Wallet readiness: present={present} ready={ready} -> {next:?}");
        next
    }

    /// Connects through the connector.
    ///
    /// The snapshot is only written when the connect succeeds; every failure
    /// leaves it exactly as it was.
    pub async fn connect(&self) -> Result<Address, ConnectError> {
        let _guard = self.transition.lock().await;

        let current = self.snapshot();
        if let (SessionState::Connected, Some(account)) = (current.state, current.active_account) {
            return Ok(account);
        }

        let epoch = self.loss_epoch.load(Ordering::Acquire);
        let present = self.connector.is_extension_present();
        if !present || !self.connector.is_ready().await {
            warn!("Connect requested while wallet is unavailable (present={present})");
            return Err(ConnectError::ExtensionUnavailable);
        }

        let account = self.connector.connect().await.map_err(|e| match e {
            ConnectorError::UserRejected => ConnectError::UserRejected,
            ConnectorError::Unavailable => ConnectError::ExtensionUnavailable,
            other => ConnectError::Connector(other),
        })?;

        let balance = match self.connector.get_balance(account).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Failed to fetch balance for {account}: {e}");
                None
            }
        };

        let mut snapshot = self.snapshot.write();
        if self.loss_epoch.load(Ordering::Acquire) != epoch {
            warn!("Wallet was lost while connecting as {account}");
            return Err(ConnectError::Connector(ConnectorError::SessionLost));
        }
        snapshot.state = SessionState::Connected;
        snapshot.is_extension_present = true;
        snapshot.is_ready = true;
        snapshot.active_account = Some(account);
        snapshot.balance = balance;
        info!("Wallet connected as {account}");
        Ok(account)
    }

    /// Idempotent: disconnecting an already disconnected session does nothing.
    pub async fn disconnect(&self) {
        let _guard = self.transition.lock().await;

        if !self.is_connected() {
            debug!("Disconnect requested while not connected");
            return;
        }
        if let Err(e) = self.connector.disconnect().await {
            warn!("Connector failed to disconnect cleanly: {e}");
        }

        clear_connection(&mut self.snapshot.write());
        info!("Wallet disconnected");
    }

    pub async fn refresh_balance(&self) -> Result<Amount, ConnectorError> {
        let Some(account) = self.active_account() else {
            return Ok(Amount::ZERO);
        };

        match self.connector.get_balance(account).await {
            Ok(balance) => {
                let mut snapshot = self.snapshot.write();
                if snapshot.active_account == Some(account) {
                    snapshot.balance = Some(balance);
                }
                Ok(balance)
            }
            Err(ConnectorError::SessionLost) => {
                self.mark_session_lost();
                Err(ConnectorError::SessionLost)
            }
            Err(e) => Err(e),
        }
    }

    pub fn apply_event(&self, event: ConnectorEvent) {
        debug!("Connector event: {event:?}");
        match event {
            ConnectorEvent::Ready => {
                let mut snapshot = self.snapshot.write();
                snapshot.is_extension_present = true;
                snapshot.is_ready = true;
                if matches!(
                    snapshot.state,
                    SessionState::Unknown | SessionState::ExtensionMissing
                ) {
                    snapshot.state = SessionState::Disconnected;
                }
            }
            ConnectorEvent::ExtensionMissing => {
                let mut snapshot = self.snapshot.write();
                self.record_loss();
                snapshot.is_extension_present = false;
                snapshot.is_ready = false;
                snapshot.state = SessionState::ExtensionMissing;
                snapshot.active_account = None;
                snapshot.balance = None;
            }
            ConnectorEvent::SessionLost => self.mark_session_lost(),
            ConnectorEvent::AccountChanged(account) => {
                let mut snapshot = self.snapshot.write();
                if snapshot.is_connected() && snapshot.active_account != Some(account) {
                    snapshot.active_account = Some(account);
                    snapshot.balance = None;
                    info!("Active account changed to {account}");
                }
            }
        }
    }

    /// Moves a connected session to disconnected without asking the connector.
    ///
    /// Also fails any connect that is still in flight.
    pub(crate) fn mark_session_lost(&self) {
        let mut snapshot = self.snapshot.write();
        self.record_loss();
        if snapshot.is_connected() {
            warn!("Wallet session lost");
            clear_connection(&mut snapshot);
        }
    }

    /// Callers hold the snapshot write lock.
    fn record_loss(&self) {
        self.loss_epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Pumps connector events into the session until the connector or the session goes away.
    pub fn spawn_event_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.connector.subscribe_events();
        let session: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(session) = session.upgrade() else {
                            break;
                        };
                        session.apply_event(event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {skipped} connector event(s)");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Connector event listener stopped");
        })
    }
}

fn clear_connection(snapshot: &mut SessionSnapshot) {
    if snapshot.state == SessionState::Connected {
        snapshot.state = SessionState::Disconnected;
    }
    snapshot.active_account = None;
    snapshot.balance = None;
}
