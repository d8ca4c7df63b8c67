//! Post feed and its persistence.
//!
//! The store owns the newest-first list of posts and is the only writer of
//! the feed key. Every successful append rewrites the whole feed.

mod ids;
mod media;

pub use ids::IdSource;
pub use media::encode_image;

use charlie_common::{CharlieError, Post, PostSubmission, PostingPolicy, Result, Session};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::busy::BusyFlag;
use crate::storage::LocalStorage;

/// Read-only view of the feed, newest first
pub type FeedSnapshot = Arc<Vec<Post>>;

/// Feed store
pub struct FeedStore {
    storage: Arc<dyn LocalStorage>,
    /// Storage key holding the JSON feed
    feed_key: String,
    policy: PostingPolicy,
    /// Simulated upload round trip
    post_delay: Duration,
    feed: watch::Sender<FeedSnapshot>,
    ids: IdSource,
    /// Set once `load()` has run
    loaded: AtomicBool,
    submitting: BusyFlag,
}

impl FeedStore {
    pub fn new(
        storage: Arc<dyn LocalStorage>,
        feed_key: impl Into<String>,
        policy: PostingPolicy,
        post_delay: Duration,
    ) -> Self {
        Self {
            storage,
            feed_key: feed_key.into(),
            policy,
            post_delay,
            feed: watch::Sender::new(Arc::new(Vec::new())),
            ids: IdSource::new(),
            loaded: AtomicBool::new(false),
            submitting: BusyFlag::default(),
        }
    }

    /// Load the persisted feed.
    ///
    /// Never fails: a missing, unreadable, or malformed feed becomes an empty
    /// one. Returns the number of posts loaded.
    pub fn load(&self) -> usize {
        let posts = match self.storage.get_item(&self.feed_key) {
            Ok(Some(raw)) => match decode_feed(&raw) {
                Ok(posts) => posts,
                Err(e) => {
                    tracing::warn!(key = %self.feed_key, error = %e, "Discarding stored feed");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.feed_key, error = %e, "Failed to read stored feed");
                Vec::new()
            }
        };

        if let Some(max_id) = posts.iter().map(|p| p.id).max() {
            self.ids.observe(max_id);
        }

        let count = posts.len();
        self.feed.send_replace(Arc::new(posts));
        self.loaded.store(true, Ordering::Release);

        tracing::debug!(posts = count, "Feed loaded");
        count
    }

    /// Add a post to the top of the feed.
    ///
    /// The author must be signed in and the submission must satisfy the
    /// posting policy. The post is only published once it has been persisted.
    pub async fn append(&self, author: &Session, submission: PostSubmission) -> Result<Post> {
        if !self.is_loaded() {
            return Err(CharlieError::NotReady("feed has not been loaded yet".to_string()));
        }

        let username = author.username().ok_or(CharlieError::Unauthenticated)?;
        self.policy.check(&submission)?;

        let _busy = self
            .submitting
            .try_acquire()
            .ok_or_else(|| CharlieError::Busy("a post is already being submitted".to_string()))?;

        tokio::time::sleep(self.post_delay).await;

        let now = chrono::Local::now();
        let post = Post {
            id: self.ids.next(now.timestamp_millis().max(0) as u64),
            title: submission.title.unwrap_or_default(),
            description: submission.description.unwrap_or_default(),
            image: submission.image_data.filter(|data| !data.is_empty()),
            uploaded_by: username.to_string(),
            uploaded_at: Post::format_timestamp(&now),
        };

        let current = self.list();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(post.clone());
        next.extend(current.iter().cloned());

        self.write(&next)?;
        self.feed.send_replace(Arc::new(next));

        tracing::info!(
            post_id = post.id,
            uploaded_by = %post.uploaded_by,
            has_image = post.image.is_some(),
            "Post added to feed"
        );

        Ok(post)
    }

    /// Write the current feed to storage
    pub fn persist(&self) -> Result<()> {
        let snapshot = self.list();
        self.write(&snapshot)
    }

    /// Drop every post, in memory and on disk
    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(&self.feed_key)?;
        let previous = self.feed.send_replace(Arc::new(Vec::new()));
        tracing::info!(removed = previous.len(), "Feed cleared");
        Ok(())
    }

    /// Current feed, newest first
    pub fn list(&self) -> FeedSnapshot {
        self.feed.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// True while a post is waiting on its round trip
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    pub fn policy(&self) -> PostingPolicy {
        self.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.feed.subscribe()
    }

    fn write(&self, posts: &[Post]) -> Result<()> {
        let data = serde_json::to_string(posts).map_err(|e| CharlieError::Storage(e.to_string()))?;
        self.storage.set_item(&self.feed_key, &data)
    }
}

/// Parse the stored JSON array
fn decode_feed(raw: &str) -> Result<Vec<Post>> {
    serde_json::from_str(raw).map_err(|e| CharlieError::PersistenceParse(e.to_string()))
}
