//! Infinite-scroll pager.
//!
//! At most one page load is in flight. Each load carries a ticket holding the
//! pager generation; `reset` and `unmount` bump the generation, so answers to
//! loads issued before them are dropped instead of being appended to a feed
//! they no longer belong to.

use tracing::debug;

use queeker_types::{ApiResponse, FeedItem, PostsQuery};

use crate::api::FeedApi;

/// A page load in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub generation: u64,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Appended(usize),
    /// Empty page; no further loads will be issued.
    Exhausted,
    /// Answer to a ticket from an earlier generation.
    Stale,
    /// Items unchanged; another load may be attempted.
    Failed(String),
    /// No load issued: one is in flight or the feed is exhausted.
    Skipped,
}

#[derive(Debug)]
pub struct FeedPager {
    query: PostsQuery,
    items: Vec<FeedItem>,
    generation: u64,
    loading: bool,
    exhausted: bool,
}

impl FeedPager {
    /// Pager for `query`; the query's own offset is ignored.
    pub fn new(query: PostsQuery) -> Self {
        Self {
            query: query.with_offset(0),
            items: Vec::new(),
            generation: 0,
            loading: false,
            exhausted: false,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Mutable view, for the composer and like toggles.
    pub fn items_mut(&mut self) -> &mut Vec<FeedItem> {
        &mut self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Start a load at the current end of the feed.
    pub fn begin_load_more(&mut self) -> Option<PageTicket> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(PageTicket {
            generation: self.generation,
            offset: self.items.len() as u32,
        })
    }

    pub fn query_for(&self, ticket: PageTicket) -> PostsQuery {
        self.query.clone().with_offset(ticket.offset)
    }

    pub fn apply(&mut self, ticket: PageTicket, response: ApiResponse<Vec<FeedItem>>) -> PageOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale page"
            );
            return PageOutcome::Stale;
        }
        self.loading = false;

        if !response.is_success() {
            return PageOutcome::Failed(response.message);
        }
        let page = response.data.unwrap_or_default();
        if page.is_empty() {
            self.exhausted = true;
            return PageOutcome::Exhausted;
        }
        let appended = page.len();
        self.items.extend(page);
        PageOutcome::Appended(appended)
    }

    /// Issue and apply one page load.
    pub async fn load_more<A: FeedApi>(&mut self, api: &A) -> PageOutcome {
        let Some(ticket) = self.begin_load_more() else {
            return PageOutcome::Skipped;
        };
        let response = api.get_posts(self.query_for(ticket)).await;
        self.apply(ticket, response)
    }

    /// Start over from the first page.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.loading = false;
        self.exhausted = false;
    }

    /// The view went away; answers still in flight are dropped.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.loading = false;
    }
}
