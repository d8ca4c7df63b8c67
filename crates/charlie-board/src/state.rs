//! Application state and shared resources.

use charlie_common::{LoginRequest, Post, PostSubmission, Result, Session};
use std::sync::Arc;

use crate::captcha::CaptchaGate;
use crate::config::AppConfig;
use crate::feed::FeedStore;
use crate::session::SessionManager;
use crate::storage::{FileStorage, LocalStorage};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Local storage backend
    pub storage: Arc<dyn LocalStorage>,

    /// Bot check for the sign-in form
    pub captcha: Arc<CaptchaGate>,

    /// Current identity
    pub session: Arc<SessionManager>,

    /// Post feed
    pub feed: Arc<FeedStore>,
}

impl AppState {
    /// Open the configured storage file and restore state from it
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(&config.storage_path)?);
        Ok(Self::with_storage(config, storage))
    }

    /// Build the stores on top of `storage`.
    ///
    /// The session is restored before the feed is loaded, and both happen
    /// before this returns.
    pub fn with_storage(config: AppConfig, storage: Arc<dyn LocalStorage>) -> Self {
        let captcha = Arc::new(CaptchaGate::new());
        let session = Arc::new(SessionManager::new(
            storage.clone(),
            config.storage.identity_key.clone(),
            config.login_delay(),
        ));
        let feed = Arc::new(FeedStore::new(
            storage.clone(),
            config.storage.feed_key.clone(),
            config.feed.posting_policy,
            config.post_delay(),
        ));

        session.restore();
        let posts = feed.load();
        tracing::debug!(posts, policy = ?feed.policy(), "Board state ready");

        Self {
            config,
            storage,
            captcha,
            session,
            feed,
        }
    }

    /// Submit the sign-in form with the gate's current pass signal
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        self.session.login(request, self.captcha.passed()).await
    }

    /// Post as the current session
    pub async fn post(&self, submission: PostSubmission) -> Result<Post> {
        let author = self.session.current();
        self.feed.append(&author, submission).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use charlie_common::{CaptchaChallenge, CaptchaOperator, CharlieError};

    fn quick_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.session.login_delay_ms = 0;
        config.feed.post_delay_ms = 0;
        config
    }

    fn submission(title: &str) -> PostSubmission {
        PostSubmission {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_flow_survives_restart() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let state = AppState::with_storage(quick_config(), storage.clone());
        assert!(!state.session.is_loading());
        assert!(state.feed.is_loaded());

        let request = LoginRequest::sign_in("carol", "pw");
        let err = state.login(&request).await.unwrap_err();
        assert_eq!(
            err,
            CharlieError::validation("Please complete the CAPTCHA verification")
        );

        let challenge = state.captcha.install(CaptchaChallenge::new(5, 2, CaptchaOperator::Subtract));
        assert!(state.captcha.submit_answer(challenge.expected_answer()));
        state.login(&request).await.unwrap();

        state.post(submission("first")).await.unwrap();
        state.post(submission("second")).await.unwrap();

        let restarted = AppState::with_storage(quick_config(), storage);
        assert_eq!(restarted.session.current().username(), Some("carol"));
        let titles: Vec<_> = restarted.feed.list().iter().map(|p| p.title.clone()).collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[tokio::test]
    async fn test_post_after_logout_is_rejected() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        storage.set_item("charlie_user", "dave").unwrap();

        let state = AppState::with_storage(quick_config(), storage);
        state.post(submission("hi")).await.unwrap();

        state.logout();
        let err = state.post(submission("again")).await.unwrap_err();
        assert_eq!(err, CharlieError::Unauthenticated);
        assert_eq!(state.feed.list().len(), 1);
    }
}
