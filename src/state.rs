use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, PoisonError},
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::TransactionManager,
    r2d2::{ConnectionManager, Pool, PooledConnection},
};
use tokio::sync::broadcast::Sender;

use crate::{config::AppConfig, msg::Msg, util_resp::FailureResponse};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

type SqliteTxManager = <PooledConn as diesel::Connection>::TransactionManager;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
    pub config: Arc<AppConfig>,
    pub tx: Sender<Msg>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Sender<Msg> {
    fn from_ref(state: &AppState) -> Self {
        state.tx.clone()
    }
}

/// Connections which opened a transaction while handling the current
/// request. Inserted by [`commit_transactions`], filled by [`ThreadSafeConn`].
#[derive(Clone, Default)]
struct OpenTransactions(
    Arc<std::sync::Mutex<Vec<Arc<tokio::sync::Mutex<PooledConn>>>>>,
);

impl OpenTransactions {
    fn push(&self, conn: Arc<tokio::sync::Mutex<PooledConn>>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(conn);
    }

    fn take(&self) -> Vec<Arc<tokio::sync::Mutex<PooledConn>>> {
        std::mem::take(
            &mut *self.0.lock().unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// This middleware commits opened transactions after each request has been
/// handled. Anything other than a success or a redirect rolls back.
pub async fn commit_transactions(mut request: Request, next: Next) -> Response {
    let open = OpenTransactions::default();
    request.extensions_mut().insert(open.clone());

    let response = next.run(request).await;

    let commit = response.status().is_success()
        || response.status().is_redirection()
        || response.status().is_informational();

    let mut failed = false;
    for conn in open.take() {
        let mut conn = conn.lock().await;
        let result = if commit {
            SqliteTxManager::commit_transaction(&mut *conn)
        } else {
            SqliteTxManager::rollback_transaction(&mut *conn)
        };
        if let Err(e) = result {
            tracing::error!(commit, "failed to finish transaction: {e}");
            failed = true;
        }
    }

    if failed && commit {
        return FailureResponse::ServerError(()).into_response();
    }

    response
}

#[derive(Clone)]
pub struct ThreadSafeConn {
    pub inner: Arc<tokio::sync::Mutex<PooledConn>>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ThreadSafeConn
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(conn) = parts.extensions.get::<ThreadSafeConn>() {
            return Ok(conn.clone());
        }

        let open = parts
            .extensions
            .get::<OpenTransactions>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!(
                    "database connection requested outside of the transaction middleware"
                );
                FailureResponse::ServerError(())
            })?;

        let pool = DbPool::from_ref(state);
        let mut conn = tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(|_| FailureResponse::ServerError(()))?
            .map_err(|e| {
                tracing::error!("could not check out a connection: {e}");
                FailureResponse::ServerError(())
            })?;

        SqliteTxManager::begin_transaction(&mut conn)?;

        let conn = ThreadSafeConn {
            inner: Arc::new(tokio::sync::Mutex::new(conn)),
        };
        open.push(conn.inner.clone());
        parts.extensions.insert(conn.clone());

        Ok(conn)
    }
}

/// A pooled connection with an open transaction, locked for the duration of
/// the handler.
pub struct Conn {
    inner: tokio::sync::OwnedMutexGuard<PooledConn>,
}

impl Deref for Conn {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl DerefMut for Conn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Conn
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::from_request_parts(parts, state).await?;
        let inner = conn.inner.try_lock_owned().map_err(|_| {
            tracing::error!("connection is already locked by another extractor");
            FailureResponse::ServerError(())
        })?;
        Ok(Conn { inner })
    }
}
