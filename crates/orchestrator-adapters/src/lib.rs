pub mod bridge;
pub mod discord;
pub mod extractor;
pub mod fetch;
pub mod search;
pub mod store;

pub use bridge::{dispatch, start_core, CoreHandles};
pub use discord::{DiscordGateway, DiscordOutbound, GatewayEvent};
pub use extractor::LlmMenuExtractor;
pub use fetch::HttpPageFetcher;
pub use search::SerpApiSearch;
pub use store::JsonFileMenuStore;
