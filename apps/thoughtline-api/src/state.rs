use std::sync::Arc;

use thoughtline_service::JournalService;
use thoughtline_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<JournalService>,
}
impl AppState {
	pub async fn new(config: thoughtline_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let service = JournalService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
