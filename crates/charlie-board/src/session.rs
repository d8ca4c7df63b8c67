//! Session lifecycle: restore, login, logout.
//!
//! The manager is the only writer of the identity key. There is no backend:
//! any non-blank username/password pair that clears the form checks is
//! accepted after a simulated round trip.

use charlie_common::{CharlieError, LoginRequest, Result, Session};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::busy::BusyFlag;
use crate::storage::LocalStorage;

/// Session manager
pub struct SessionManager {
    storage: Arc<dyn LocalStorage>,
    /// Storage key holding the username
    identity_key: String,
    /// Simulated auth round trip
    login_delay: Duration,
    session: watch::Sender<Session>,
    /// True until `restore()` has run
    loading: AtomicBool,
    submitting: BusyFlag,
}

impl SessionManager {
    pub fn new(
        storage: Arc<dyn LocalStorage>,
        identity_key: impl Into<String>,
        login_delay: Duration,
    ) -> Self {
        Self {
            storage,
            identity_key: identity_key.into(),
            login_delay,
            session: watch::Sender::new(Session::anonymous()),
            loading: AtomicBool::new(true),
            submitting: BusyFlag::default(),
        }
    }

    /// Read the persisted identity, if any
    pub fn restore(&self) -> Session {
        let session = match self.storage.get_item(&self.identity_key) {
            Ok(Some(username)) => Session::authenticated(username).unwrap_or_else(|| {
                tracing::warn!(key = %self.identity_key, "Persisted identity is blank, ignoring");
                Session::anonymous()
            }),
            Ok(None) => Session::anonymous(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted identity");
                Session::anonymous()
            }
        };

        match session.username() {
            Some(username) => tracing::info!(username = %username, "Session restored"),
            None => tracing::debug!("No persisted session"),
        }

        self.session.send_replace(session.clone());
        self.loading.store(false, Ordering::Release);
        session
    }

    /// Sign in (or sign up) after the bot check.
    ///
    /// Form checks run first and fail fast; the simulated round trip only
    /// starts once they pass.
    pub async fn login(&self, request: &LoginRequest, captcha_passed: bool) -> Result<Session> {
        if self.is_loading() {
            return Err(CharlieError::NotReady(
                "session has not been restored yet".to_string(),
            ));
        }

        request.validate(captcha_passed)?;

        let _busy = self
            .submitting
            .try_acquire()
            .ok_or_else(|| CharlieError::Busy("a sign-in is already in progress".to_string()))?;

        tokio::time::sleep(self.login_delay).await;

        let session = Session::authenticated(request.username.clone())
            .ok_or_else(|| CharlieError::validation("Username and password are required"))?;

        self.storage.set_item(&self.identity_key, &request.username)?;
        self.session.send_replace(session.clone());

        tracing::info!(
            username = %request.username,
            sign_up = request.is_sign_up,
            "User signed in"
        );

        Ok(session)
    }

    /// Sign out. Always succeeds.
    pub fn logout(&self) {
        if let Err(e) = self.storage.remove_item(&self.identity_key) {
            tracing::warn!(error = %e, "Failed to remove persisted identity");
        }

        let previous = self.session.send_replace(Session::anonymous());
        if let Some(username) = previous.username() {
            tracing::info!(username = %username, "User signed out");
        }
    }

    pub fn current(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// True while a login is waiting on its round trip
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }
}
