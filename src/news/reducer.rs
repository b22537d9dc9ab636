//! Transitions of the news [`FetchState`].

use std::collections::HashSet;

use crate::mvi::{Intent, Reducer};
use crate::news::article::Article;
use crate::news::state::{FetchState, FetchStatus, PageCursor};

#[derive(Debug, Clone)]
pub enum FetchIntent {
    /// A request was issued. `append` keeps the current articles visible.
    Begin { append: bool },
    /// The authoritative request delivered a page.
    Loaded {
        articles: Vec<Article>,
        cursor: PageCursor,
        append: bool,
    },
    /// The authoritative request failed.
    Failed { message: String },
    /// The request was dropped and nothing replaced it.
    Abandoned,
}

impl Intent for FetchIntent {}

pub struct FetchReducer;

impl Reducer for FetchReducer {
    type State = FetchState;
    type Intent = FetchIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FetchIntent::Begin { append } => FetchState {
                status: FetchStatus::Loading,
                articles: if append { state.articles } else { Vec::new() },
                error: None,
                cursor: state.cursor,
            },

            FetchIntent::Loaded {
                articles,
                cursor,
                append,
            } => {
                let articles = if append {
                    merge_unique(state.articles, articles)
                } else {
                    articles
                };
                let status = if articles.is_empty() {
                    FetchStatus::Empty
                } else {
                    FetchStatus::Success
                };
                FetchState {
                    status,
                    articles,
                    error: None,
                    cursor,
                }
            }

            FetchIntent::Failed { message } => FetchState {
                status: FetchStatus::Error,
                articles: Vec::new(),
                error: Some(message),
                cursor: state.cursor,
            },

            FetchIntent::Abandoned => FetchState {
                status: FetchStatus::Idle,
                articles: Vec::new(),
                error: None,
                cursor: state.cursor,
            },
        }
    }
}

/// Append `incoming` to `existing`, skipping URLs already present.
fn merge_unique(mut existing: Vec<Article>, incoming: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = existing.iter().map(|a| a.url.clone()).collect();
    existing.extend(incoming.into_iter().filter(|a| seen.insert(a.url.clone())));
    existing
}
