use crate::errors::ActionError;
use crate::managers::revoke::RevokeSessionsAction;
use crate::managers::statement::StatementExecutor;
use crate::services::auth::AuthResolver;
use crate::services::logger::Logger;
use crate::services::validation::Validation;
use reqwest::Client;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub action: Arc<RevokeSessionsAction>,
}

impl App {
    pub fn initialize() -> Result<Self, ActionError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ActionError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self::with_client(Logger::new("revoke-sessions"), client))
    }

    /// Wires the action around an existing client and logger.
    pub fn with_client(logger: Logger, client: Client) -> Self {
        let validation = Validation::new();
        let auth = Arc::new(AuthResolver::new(client.clone(), logger.clone()));
        let executor = StatementExecutor::new(client, logger.clone());
        let action = Arc::new(RevokeSessionsAction::new(
            logger.clone(),
            validation,
            auth,
            executor,
        ));
        Self { logger, action }
    }
}
