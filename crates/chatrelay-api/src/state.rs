//! Application state wiring all services together.
//!
//! The chat service is generic over repository/provider traits; AppState
//! pins the generics to the concrete infra implementations.

use std::sync::Arc;

use secrecy::SecretString;

use chatrelay_core::chat::ChatService;
use chatrelay_core::session::SessionStore;
use chatrelay_infra::openrouter::OpenRouterClient;
use chatrelay_infra::sqlite::{DatabasePool, SqliteConversationRepository};
use chatrelay_types::config::RelayConfig;

/// Chat service pinned to the SQLite repository and the OpenRouter client.
pub type ConcreteChatService = ChatService<SqliteConversationRepository, OpenRouterClient>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub provider: Arc<OpenRouterClient>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Initialize the application state: connect to the database, run
    /// migrations, wire services.
    pub async fn init(config: RelayConfig) -> anyhow::Result<Self> {
        if config.openrouter.api_key.is_empty() {
            tracing::warn!("OPENROUTER_API_KEY not set; upstream calls will be rejected");
        }

        let pool = DatabasePool::new(&config.database_url).await?;
        let repo = Arc::new(SqliteConversationRepository::new(pool));

        let provider = Arc::new(OpenRouterClient::new(
            SecretString::from(config.openrouter.api_key.clone()),
            config.openrouter.base_url.clone(),
        )?);

        let chat_service = Arc::new(ChatService::new(
            repo,
            Arc::new(SessionStore::new()),
            Arc::clone(&provider),
        ));

        Ok(Self {
            chat_service,
            provider,
            config: Arc::new(config),
        })
    }
}
