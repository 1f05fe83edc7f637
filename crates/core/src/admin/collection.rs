use uuid::Uuid;

use super::api::{ApiFailure, PostApi};
use super::filter::{self, FilterSpec};
use crate::auth::AdminToken;
use crate::post::{slugify, validate, Post, PostInput, PostPatch};

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Client-side cache of the admin post table.
///
/// Holds the last loaded posts plus the current filter and page. Mutations go
/// through the [`PostApi`] first; `items` only changes once a call succeeds,
/// so a failed call leaves the table as it was. Methods take `&mut self`,
/// which rules out two overlapping calls on the same collection.
#[derive(Debug)]
pub struct AdminCollection<A> {
    api: A,
    items: Vec<Post>,
    page: usize,
    page_size: usize,
    total_count: usize,
    filter: FilterSpec,
    last_error: Option<ApiFailure>,
}

impl<A: PostApi> AdminCollection<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: 0,
            filter: FilterSpec::default(),
            last_error: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn last_error(&self) -> Option<&ApiFailure> {
        self.last_error.as_ref()
    }

    /// Replace the cached posts with a fresh listing. On failure the
    /// previous items stay.
    pub async fn load(&mut self, token: &AdminToken) -> Result<(), ApiFailure> {
        let result = self.api.list(token).await;
        let posts = self.track(result)?;
        self.total_count = posts.len();
        self.items = posts;
        self.clamp_page();
        Ok(())
    }

    /// Filter the cached items with `spec`, leaving the stored filter alone.
    pub fn apply_filter(&self, spec: &FilterSpec) -> Vec<Post> {
        filter::apply_filter(&self.items, spec)
    }

    pub fn set_filter(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.page = 1;
    }

    pub fn filtered(&self) -> Vec<Post> {
        self.apply_filter(&self.filter)
    }

    /// The current page of the filtered posts.
    pub fn visible(&self) -> Vec<Post> {
        filter::paginate(&self.filtered(), self.page, self.page_size).to_vec()
    }

    pub fn page_count(&self) -> usize {
        filter::page_count(self.filtered().len(), self.page_size)
    }

    /// Advance a page. Returns false, changing nothing, on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page >= self.page_count() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back a page. Returns false, changing nothing, on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Distinct non-empty authors of the cached posts, sorted.
    pub fn unique_authors(&self) -> Vec<String> {
        let mut authors: Vec<String> = self
            .items
            .iter()
            .map(|p| p.author.clone())
            .filter(|a| !a.trim().is_empty())
            .collect();
        authors.sort();
        authors.dedup();
        authors
    }

    pub async fn create(
        &mut self,
        token: &AdminToken,
        input: PostInput,
    ) -> Result<Post, ApiFailure> {
        self.require_token(token, "create")?;

        let input = input.sanitized();
        let slug = input.slug.clone().unwrap_or_else(|| slugify(&input.title));
        let errors = validate(input.fields_with_slug(&slug));
        if !errors.is_empty() {
            return self.track(Err(ApiFailure::validation(&errors)));
        }

        let result = self.api.create(token, input).await;
        let post = self.track(result)?;
        self.items.push(post.clone());
        self.total_count += 1;
        Ok(post)
    }

    pub async fn update(
        &mut self,
        token: &AdminToken,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, ApiFailure> {
        self.require_token(token, "update")?;

        let result = self.api.update(token, id, patch).await;
        let post = self.track(result)?;
        match self.items.iter_mut().find(|p| p.id == post.id) {
            Some(slot) => *slot = post.clone(),
            None => {
                self.items.push(post.clone());
                self.total_count += 1;
            }
        }
        Ok(post)
    }

    pub async fn delete(&mut self, token: &AdminToken, id: Uuid) -> Result<(), ApiFailure> {
        self.require_token(token, "delete")?;

        let result = self.api.delete(token, id).await;
        self.track(result)?;
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        if self.items.len() < before {
            self.total_count = self.total_count.saturating_sub(1);
        }
        self.clamp_page();
        Ok(())
    }

    fn require_token(&mut self, token: &AdminToken, action: &str) -> Result<(), ApiFailure> {
        if token.is_blank() {
            return self.track(Err(ApiFailure::unauthorized(format!(
                "Please enter a valid admin token to {action} a post."
            ))));
        }
        Ok(())
    }

    /// Record the outcome of a call in `last_error`.
    fn track<T>(&mut self, result: Result<T, ApiFailure>) -> Result<T, ApiFailure> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(failure) => {
                tracing::warn!(
                    status = failure.status,
                    message = %failure.message,
                    "admin call failed"
                );
                self.last_error = Some(failure.clone());
            }
        }
        result
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.page_count());
    }
}
