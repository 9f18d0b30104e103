//! Wiring between the transport and the core: a single task drains
//! gateway events and feeds them to the core one at a time.

use std::sync::Arc;

use orchestrator_core::ports::{MenuExtractorPort, MenuStore, OutboundPort, PageFetchPort, RestaurantSearchPort};
use orchestrator_core::OrchestratorCore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::discord::GatewayEvent;

pub const EVENT_QUEUE_DEPTH: usize = 100;

pub struct CoreHandles {
    pub events_tx: mpsc::Sender<GatewayEvent>,
    pub task: JoinHandle<()>,
}

/// Spawns the dispatch task for `core` and returns the sender the
/// transport should push events into.
pub fn start_core<S, F, X, M, O>(core: Arc<OrchestratorCore<S, F, X, M, O>>) -> CoreHandles
where
    S: RestaurantSearchPort + 'static,
    F: PageFetchPort + 'static,
    X: MenuExtractorPort + 'static,
    M: MenuStore + 'static,
    O: OutboundPort + 'static,
{
    let (events_tx, events_rx) = mpsc::channel::<GatewayEvent>(EVENT_QUEUE_DEPTH);
    let task = tokio::spawn(dispatch(core, events_rx));
    CoreHandles { events_tx, task }
}

/// Processes events in arrival order until every sender is dropped. A
/// failing message is logged and the loop moves on.
pub async fn dispatch<S, F, X, M, O>(
    core: Arc<OrchestratorCore<S, F, X, M, O>>,
    mut events: mpsc::Receiver<GatewayEvent>,
) where
    S: RestaurantSearchPort,
    F: PageFetchPort,
    X: MenuExtractorPort,
    M: MenuStore,
    O: OutboundPort,
{
    while let Some(event) = events.recv().await {
        match event {
            GatewayEvent::Ready { self_id } => {
                info!(self_id = %self_id, "bot identity known");
                core.set_self_id(self_id);
            }
            GatewayEvent::Chat(msg) => {
                debug!(channel = %msg.channel_id, "processing message");
                if let Err(e) = core.handle(protocol::Message::ChatMessage(msg)).await {
                    error!(error = %format!("{:#}", e), "error handling message");
                }
            }
        }
    }
    info!("dispatch loop finished");
}
