/**
 * Stats Aggregator
 *
 * Computes the home-dashboard numbers for a user: category count, the
 * user's recent message activity, and how many of their threads saw a
 * message inside the activity window.
 *
 * The three sections are fetched concurrently and fail independently: a
 * failed section logs, keeps its defaults, and reports `loaded = false`
 * without blocking the others.
 */

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::categories::CategoryService;
use crate::error::ApiError;
use crate::messages::MessageService;
use crate::models::{Message, Thread};
use crate::threads::ThreadService;

/// A thread counts as active when its last message is at most this old.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub loaded: bool,
}

impl Default for CategoryStats {
    fn default() -> Self {
        Self {
            count: 0,
            loaded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageStats {
    /// Messages in the user's most recent page
    pub count: usize,
    /// The user's newest message
    pub last_message: Option<Message>,
    /// Thread the newest message belongs to
    pub last_message_thread: Option<Thread>,
    pub loaded: bool,
}

impl Default for MessageStats {
    fn default() -> Self {
        Self {
            count: 0,
            last_message: None,
            last_message_thread: None,
            loaded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadStats {
    /// Author's threads with a message inside the activity window
    pub active_count: usize,
    pub loaded: bool,
}

impl Default for ThreadStats {
    fn default() -> Self {
        Self {
            active_count: 0,
            loaded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub categories: CategoryStats,
    pub messages: MessageStats,
    pub threads: ThreadStats,
}

#[derive(Clone)]
pub struct StatsService {
    categories: CategoryService,
    threads: ThreadService,
    messages: MessageService,
}

impl StatsService {
    pub fn new(
        categories: CategoryService,
        threads: ThreadService,
        messages: MessageService,
    ) -> Self {
        Self {
            categories,
            threads,
            messages,
        }
    }

    /// Gather all three sections for a user.
    pub async fn for_user(&self, user_id: &str) -> UserStats {
        let (categories, messages, threads) = tokio::join!(
            self.category_stats(),
            self.message_stats(user_id),
            self.thread_stats(user_id),
        );

        UserStats {
            categories: categories.unwrap_or_else(|e| {
                tracing::warn!("category stats failed: {}", e);
                CategoryStats::default()
            }),
            messages: messages.unwrap_or_else(|e| {
                tracing::warn!("message stats failed: {}", e);
                MessageStats::default()
            }),
            threads: threads.unwrap_or_else(|e| {
                tracing::warn!("thread stats failed: {}", e);
                ThreadStats::default()
            }),
        }
    }

    async fn category_stats(&self) -> Result<CategoryStats, ApiError> {
        let all = self.categories.get_all().await?;
        Ok(CategoryStats {
            count: all.len(),
            loaded: true,
        })
    }

    async fn message_stats(&self, user_id: &str) -> Result<MessageStats, ApiError> {
        // Newest first, service default page.
        let messages = self.messages.get_by_author(user_id, None).await?;

        let last_message = messages.first().cloned();
        let last_message_thread = match &last_message {
            Some(message) => self.threads.get(&message.thread_id).await?,
            None => None,
        };

        Ok(MessageStats {
            count: messages.len(),
            last_message,
            last_message_thread,
            loaded: true,
        })
    }

    async fn thread_stats(&self, user_id: &str) -> Result<ThreadStats, ApiError> {
        let threads = self.threads.get_by_author(user_id).await?;
        let cutoff = Utc::now() - Duration::days(ACTIVE_WINDOW_DAYS);

        let active_count = threads
            .iter()
            .filter(|thread| thread.last_message_at >= cutoff)
            .count();
        Ok(ThreadStats {
            active_count,
            loaded: true,
        })
    }
}
