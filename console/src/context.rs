//! Wiring shared by every command: credential store, session, client, guard

use crate::config::ClientConfig;
use crate::output::print_notice;
use anyhow::Context;
use jifeng_core::SessionScope;
use jifeng_engine::{Route, SessionGuard};
use jifeng_networking::{PointsClient, Session};
use jifeng_persistence::{
    derive_machine_key, CredentialEncryptor, CredentialStore, Database, SqliteCredentialStore,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DB_FILE: &str = "jifeng.db";

/// Open the encrypted credential store in the configured data directory
pub async fn open_store(config: &ClientConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let path = config.data_dir().join(DB_FILE);
    let db = Database::connect(&path)
        .await
        .with_context(|| format!("failed to open credential database '{}'", path.display()))?;

    let key = derive_machine_key().context("failed to derive machine encryption key")?;
    let encryptor = CredentialEncryptor::new(&key)?;
    debug!("Credential store ready at {}", path.display());

    Ok(Arc::new(SqliteCredentialStore::new(db, encryptor)))
}

/// One authenticated app (member or admin) for the duration of a command
pub struct Console {
    pub client: Arc<PointsClient>,
    guard: Arc<SessionGuard>,
    initial_route: Route,
    notices: mpsc::UnboundedReceiver<jifeng_engine::Notice>,
    cancel: CancellationToken,
    guard_task: JoinHandle<()>,
}

impl Console {
    pub async fn connect(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        scope: SessionScope,
        route: Route,
    ) -> anyhow::Result<Self> {
        let session = Arc::new(Session::restore(scope, store).await?);
        let client = Arc::new(PointsClient::new(&config.client_options(), session.clone())?);

        let (guard, notices) = SessionGuard::new(session, route);
        let guard = Arc::new(guard);
        let cancel = CancellationToken::new();
        let guard_task = guard.clone().spawn(cancel.clone());

        Ok(Self {
            client,
            guard,
            initial_route: route,
            notices,
            cancel,
            guard_task,
        })
    }

    /// Fail early when no credential is stored for this app
    pub async fn require_login(&self) -> anyhow::Result<()> {
        if self.client.session().is_authenticated().await {
            return Ok(());
        }
        anyhow::bail!(
            "Not logged in. Run `{}` first.",
            login_hint(self.client.session().scope())
        )
    }

    /// Stop the guard and print whatever it reported
    pub async fn finish(mut self) {
        self.cancel.cancel();
        if let Err(e) = self.guard_task.await {
            debug!("Session guard task ended abnormally: {}", e);
        }
        while let Ok(notice) = self.notices.try_recv() {
            print_notice(&notice);
        }
        if self.initial_route != Route::Login && self.guard.route() == Route::Login {
            eprintln!(
                "Run `{}` to sign in again.",
                login_hint(self.client.session().scope())
            );
        }
    }
}

fn login_hint(scope: SessionScope) -> &'static str {
    match scope {
        SessionScope::Member => "jifeng login <username>",
        SessionScope::Admin => "jifeng admin login <username>",
    }
}
