use std::sync::Arc;

use orchestrator_adapters::{start_core, GatewayEvent};
use orchestrator_core::mocks::*;
use orchestrator_core::OrchestratorCore;
use protocol::{ChatMessage, Message};
use router::{IntentRouter, MenuItem, RouterConfig, Vocabulary};
use tokio::sync::mpsc;

fn core(tx: mpsc::Sender<Message>) -> OrchestratorCore<MockSearch, MockFetcher, MockExtractor, MemoryMenuStore, ChannelOutbound> {
    let router = IntentRouter::new(Vocabulary::default(), RouterConfig::default()).unwrap();
    OrchestratorCore::new(
        router,
        MockSearch::with(Vec::new()),
        MockFetcher(None),
        MockExtractor("[]".to_string()),
        MemoryMenuStore::with(vec![MenuItem::new("Pork Roll", "", 4.5)]),
        ChannelOutbound(tx),
    )
}

fn reply_text(msg: Message) -> String {
    match msg {
        Message::Reply(r) => r.text,
        other => panic!("Expected Reply, got {:?}", other),
    }
}

#[tokio::test]
async fn test_events_processed_in_order() {
    let (tx, mut rx) = mpsc::channel(16);
    let core = Arc::new(core(tx));
    core.load_menu().await.unwrap();
    let handles = start_core(core.clone());

    handles.events_tx.send(GatewayEvent::Ready { self_id: "bot".to_string() }).await.unwrap();
    for text in ["2 pork rolls", "cancel 1 pork roll", "!summary"] {
        let msg = ChatMessage::new("u1", "alice", "lunch", text);
        handles.events_tx.send(GatewayEvent::Chat(msg)).await.unwrap();
    }
    // the bot's own message is dropped
    let own = ChatMessage::new("bot", "LunchBot", "lunch", "1 pork roll");
    handles.events_tx.send(GatewayEvent::Chat(own)).await.unwrap();

    drop(handles.events_tx);
    handles.task.await.unwrap();

    assert_eq!(reply_text(rx.recv().await.unwrap()), "✅ Got it, alice! Added Pork Roll x2 to your order.");
    assert_eq!(reply_text(rx.recv().await.unwrap()), "🗑️ Okay, alice. I've removed Pork Roll from your order.");
    assert_eq!(reply_text(rx.recv().await.unwrap()), "**alice**: Pork Roll");
    assert!(rx.try_recv().is_err());
}
