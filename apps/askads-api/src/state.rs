use std::sync::Arc;

use askads_service::AskAdsService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AskAdsService>,
}
impl AppState {
	pub async fn new(config: askads_config::Config) -> color_eyre::Result<Self> {
		let service = AskAdsService::open(config).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: AskAdsService) -> Self {
		Self { service: Arc::new(service) }
	}
}
