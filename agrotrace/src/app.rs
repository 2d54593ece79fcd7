//! Application root: builds adapters from configuration and hands the view
//! layer one shared [`AuthContext`] plus the domain services.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use reqwest::Client;
use thiserror::Error;
use tracing::info;
use traceability::{DEFAULT_QR_SIZE, QrImageService};
use url::Url;

use crate::config::{ClientConfig, ClientSettings, ConfigError, IdentityBackend};
use crate::domain::ports::{FixtureIdentityProvider, IdentityProvider, KeyValueStorage};
use crate::domain::{
    AuthContext, FederatedIdentityProvider, LotsService, OffersService, ReportsService,
    SessionStore,
};
use crate::outbound::backend::{BackendClient, HttpIdentityProvider, HttpLotsGateway};
use crate::outbound::firebase::{
    FirestoreProfileDirectory, IDENTITY_TOOLKIT_URL, IdentityToolkitAuthority,
};
use crate::outbound::offers::InMemoryOffersGateway;
use crate::outbound::storage::{DirectoryStorage, MemoryStorage};

/// Failures while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open session storage: {0}")]
    Storage(#[from] io::Error),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Everything the view layer needs, wired once per process.
pub struct AgroTrace {
    auth: Arc<AuthContext>,
    sessions: SessionStore,
    lots: LotsService<HttpLotsGateway>,
    offers: OffersService<InMemoryOffersGateway>,
    reports: ReportsService<HttpLotsGateway, InMemoryOffersGateway>,
}

impl AgroTrace {
    /// Validate `settings` and build the application.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the settings are invalid or an adapter
    /// cannot be constructed.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, AppError> {
        Self::build(&settings.validate()?, Arc::new(DefaultClock))
    }

    /// Build from validated configuration with an injected clock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when an adapter cannot be constructed.
    pub fn build(
        config: &ClientConfig,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, AppError> {
        let storage: Arc<dyn KeyValueStorage> = match &config.storage_dir {
            Some(dir) => Arc::new(DirectoryStorage::open(dir.clone())?),
            None => Arc::new(MemoryStorage::new()),
        };
        let sessions = SessionStore::new(storage);

        let backend = BackendClient::new(config.api_base_url.clone(), config.request_timeout)?;
        let provider = identity_provider(config, &backend, Arc::clone(&clock))?;
        let auth = Arc::new(AuthContext::new(provider, sessions.clone(), config.locale));

        let qr = QrImageService::new(config.qr_service_url.clone(), DEFAULT_QR_SIZE);
        let lots_gateway = Arc::new(HttpLotsGateway::new(backend, qr, Arc::clone(&clock)));
        let offers_gateway = Arc::new(InMemoryOffersGateway::new(clock));

        info!(
            api = %config.api_base_url,
            locale = %config.locale,
            persistent = config.storage_dir.is_some(),
            "agrotrace client assembled"
        );
        Ok(Self {
            auth,
            lots: LotsService::new(Arc::clone(&lots_gateway), sessions.clone()),
            offers: OffersService::new(Arc::clone(&offers_gateway), sessions.clone()),
            reports: ReportsService::new(lots_gateway, offers_gateway, sessions.clone()),
            sessions,
        })
    }

    /// Shared auth context; clone the `Arc` into each view.
    pub fn auth(&self) -> Arc<AuthContext> {
        Arc::clone(&self.auth)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn lots(&self) -> &LotsService<HttpLotsGateway> {
        &self.lots
    }

    pub fn offers(&self) -> &OffersService<InMemoryOffersGateway> {
        &self.offers
    }

    pub fn reports(&self) -> &ReportsService<HttpLotsGateway, InMemoryOffersGateway> {
        &self.reports
    }
}

fn identity_provider(
    config: &ClientConfig,
    backend: &BackendClient,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<Arc<dyn IdentityProvider>, AppError> {
    match &config.identity {
        IdentityBackend::Backend => Ok(Arc::new(HttpIdentityProvider::new(backend.clone()))),
        IdentityBackend::Fixture => Ok(Arc::new(FixtureIdentityProvider)),
        IdentityBackend::Firebase {
            api_key,
            project_id,
        } => {
            let client = Client::builder().timeout(config.request_timeout).build()?;
            let authority = IdentityToolkitAuthority::new(
                client.clone(),
                Url::parse(IDENTITY_TOOLKIT_URL)?,
                api_key.clone(),
            );
            let directory = FirestoreProfileDirectory::new(
                client,
                FirestoreProfileDirectory::documents_url(project_id)?,
                clock,
            );
            Ok(Arc::new(FederatedIdentityProvider::new(
                Arc::new(authority),
                Arc::new(directory),
            )))
        }
    }
}
