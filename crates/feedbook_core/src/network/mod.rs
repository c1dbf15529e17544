//! Best-effort article fetching.
//!
//! # Responsibility
//! - Define the fetch contract consumed by archive/unarchive/refresh/add.
//! - Own the process-wide offline flag.
//! - Turn fetched pages and feeds into entry field candidates.
//!
//! # Invariants
//! - Fetch failure is represented as `None`, never as an error.
//! - While offline, the underlying fetcher is never called.
//! - Logs carry outcome metadata only, never article bytes.

pub mod feed;
pub mod http;
pub mod page;

use crate::model::entry::Link;
use log::{debug, info};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub use feed::{google_news_link, parse_feed, FeedError, FeedItem};
pub use http::HttpArticleFetcher;
pub use page::{extract_page_metadata, PageMetadata};

/// Retrieves raw article bytes for a URL.
///
/// Implementations must swallow ordinary network failures and return `None`.
pub trait ArticleFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

impl<F> ArticleFetcher for F
where
    F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self(url)
    }
}

/// Fetcher plus offline switch shared by every command.
pub struct Network {
    fetcher: Box<dyn ArticleFetcher>,
    offline: AtomicBool,
}

impl Network {
    pub fn new(fetcher: impl ArticleFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            offline: AtomicBool::new(false),
        }
    }

    /// Same as [`Network::new`] but starting in the given offline state.
    pub fn with_offline(fetcher: impl ArticleFetcher + 'static, offline: bool) -> Self {
        let network = Self::new(fetcher);
        network.set_offline(offline);
        network
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fetches content for `link`, or `None` when offline or unreachable.
    pub fn fetch_article(&self, link: &Link) -> Option<Vec<u8>> {
        if self.is_offline() {
            debug!("event=article_fetch module=network status=skipped reason=offline");
            return None;
        }

        let started_at = Instant::now();
        let content = self.fetcher.fetch(link.as_str());
        info!(
            "event=article_fetch module=network status={} bytes={} duration_ms={}",
            if content.is_some() { "ok" } else { "absent" },
            content.as_ref().map_or(0, Vec::len),
            started_at.elapsed().as_millis()
        );
        content
    }
}

impl Debug for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("offline", &self.is_offline())
            .finish_non_exhaustive()
    }
}
