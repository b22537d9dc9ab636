use crate::mvi::ViewState;
use crate::news::article::Article;

/// The only field an observer may branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Empty,
    Error,
}

/// Pagination position of the most recent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub page_size: u32,
    /// Number of articles the most recent page returned.
    pub last_batch: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            last_batch: 0,
        }
    }
}

/// Snapshot handed to observers after every transition.
///
/// Fields are private: new values come only from
/// [`FetchReducer`](crate::news::FetchReducer), which keeps the
/// status/articles/error invariants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchState {
    pub(crate) status: FetchStatus,
    pub(crate) articles: Vec<Article>,
    pub(crate) error: Option<String>,
    pub(crate) cursor: PageCursor,
}

impl ViewState for FetchState {}

impl FetchState {
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// True when the last page came back full, so another page may exist.
    pub fn has_more(&self) -> bool {
        self.status == FetchStatus::Success
            && self.cursor.last_batch as u64 == u64::from(self.cursor.page_size)
    }

    /// Checks the cross-field invariants for the current status.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            FetchStatus::Idle => self.articles.is_empty() && self.error.is_none(),
            FetchStatus::Loading => self.error.is_none(),
            FetchStatus::Success => !self.articles.is_empty() && self.error.is_none(),
            FetchStatus::Empty => self.articles.is_empty() && self.error.is_none(),
            FetchStatus::Error => self.articles.is_empty() && self.error.is_some(),
        }
    }
}
