use orchestrator_core::mocks::{ChannelOutbound, MemoryMenuStore, MockExtractor, MockFetcher, MockSearch};
use orchestrator_core::OrchestratorCore;
use router::{IntentRouter, MenuItem, RouterConfig, Vocabulary};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let router = IntentRouter::new(Vocabulary::default(), RouterConfig::default())?;
    let store = MemoryMenuStore::with(vec![
        MenuItem::new("Pork Roll", "Taylor ham on a roll", 4.5),
        MenuItem::new("Breakfast Sandwich", "Egg and cheese", 5.25),
    ]);
    let (tx, mut rx) = mpsc::channel(64);
    let core = OrchestratorCore::new(
        router,
        MockSearch::with(Vec::new()),
        MockFetcher(None),
        MockExtractor(String::from("[]")),
        store,
        ChannelOutbound(tx),
    );
    core.load_menu().await?;

    // Each argument is one chat line from a demo user
    let mut lines = std::env::args().skip(1).collect::<Vec<_>>();
    if lines.is_empty() {
        lines = vec!["2 pork rolls".into(), "cancel 1 pork roll".into(), "!summary".into()];
    }

    for line in lines {
        let msg = protocol::Message::chat("demo-user", "Demo", "demo", line.as_str());
        if let Err(e) = core.handle(msg).await {
            eprintln!("error: {}", e);
        }
        while let Ok(msg) = rx.try_recv() {
            println!("{}", serde_json::to_string_pretty(&msg).unwrap_or_default());
        }
    }
    Ok(())
}
