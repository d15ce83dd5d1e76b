//! Lazy, pull-based traversal of a paginated API endpoint.
//!
//! A [`Paginator`] requests page 1, 2, 3, ... on demand and hands out records
//! one at a time. Only the current page is held in memory. The traversal ends
//! at the first empty page and cannot be restarted.

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::client::ApiClient;
use super::error::ApiError;

/// Lazy sequence of records from one collection endpoint.
///
/// Created with [`ApiClient::paginate`].
#[derive(Debug)]
pub struct Paginator<'a> {
    client: &'a ApiClient,
    url: Url,
    filter: Vec<(String, String)>,
    next_page: u32,
    buffered: std::vec::IntoIter<Value>,
    exhausted: bool,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(client: &'a ApiClient, url: Url, filter: Vec<(String, String)>) -> Self {
        Self {
            client,
            url,
            filter,
            next_page: 1,
            buffered: Vec::new().into_iter(),
            exhausted: false,
        }
    }

    /// Returns the next record, fetching the next page when the current one is used up.
    ///
    /// Returns `Ok(None)` once a page decodes to an empty list (or has an empty
    /// body); every later call also returns `Ok(None)` without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if a page request fails. The paginator is
    /// exhausted afterwards.
    pub async fn next_record(&mut self) -> Result<Option<Value>, ApiError> {
        loop {
            if let Some(record) = self.buffered.next() {
                return Ok(Some(record));
            }
            match self.fetch_next_page().await? {
                Some(page) => self.buffered = page.into_iter(),
                None => return Ok(None),
            }
        }
    }

    /// Drains the paginator, returning the number of records seen.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError`] encountered.
    pub async fn count(mut self) -> Result<u64, ApiError> {
        let mut count = 0;
        while self.next_record().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    async fn fetch_next_page(&mut self) -> Result<Option<Vec<Value>>, ApiError> {
        if self.exhausted {
            return Ok(None);
        }
        // The previous page has been handed out in full; throttle before asking for more.
        if self.next_page > 1 {
            self.client.throttle().pause().await;
        }

        let page = self
            .client
            .fetch_page(&self.url, &self.filter, self.next_page)
            .await
            .inspect_err(|_| self.exhausted = true)?;

        if page.is_empty() {
            debug!(url = %self.url, pages = self.next_page - 1, "pagination complete");
            self.exhausted = true;
            return Ok(None);
        }
        self.next_page += 1;
        Ok(Some(page))
    }
}
