use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::host::{HostChannel, HostRequest};

/// Reachability of the extension host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// The messaging channel failed. Terminal for the session until an
    /// explicit re-probe (e.g. the tab becoming visible) succeeds.
    Unreachable,
}

/// Tracks whether the host messaging channel is still reachable.
///
/// Entering `Unreachable` is paired with stopping the fetch scheduler
/// by the owning worker; retained transcript state is kept so a
/// successful re-probe resumes without losing displayed segments.
pub struct LivenessSupervisor {
    channel: Arc<dyn HostChannel>,
    state: Mutex<Liveness>,
}

impl LivenessSupervisor {
    pub fn new(channel: Arc<dyn HostChannel>) -> Self {
        Self {
            channel,
            state: Mutex::new(Liveness::Alive),
        }
    }

    pub async fn liveness(&self) -> Liveness {
        *self.state.lock().await
    }

    pub async fn is_alive(&self) -> bool {
        self.liveness().await == Liveness::Alive
    }

    /// Records a channel failure observed elsewhere (failed fetch).
    pub async fn mark_unreachable(&self) {
        let mut state = self.state.lock().await;
        if *state == Liveness::Alive {
            warn!("Host channel unreachable, transcript sync paused");
        }
        *state = Liveness::Unreachable;
    }

    /// Probes the channel with a ping and updates the state from the
    /// outcome. A response with `success: false` counts as unreachable:
    /// the host answered but can't serve us.
    pub async fn probe(&self) -> Liveness {
        let outcome = match self.channel.request(HostRequest::Ping).await {
            Ok(response) if response.success => Liveness::Alive,
            Ok(_) | Err(_) => Liveness::Unreachable,
        };

        let mut state = self.state.lock().await;
        match (*state, outcome) {
            (Liveness::Unreachable, Liveness::Alive) => {
                info!("Host channel reachable again, transcript sync may resume");
            }
            (Liveness::Alive, Liveness::Unreachable) => {
                warn!("Host channel probe failed, transcript sync paused");
            }
            _ => {}
        }
        *state = outcome;
        outcome
    }
}
