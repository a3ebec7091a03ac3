//! Per-kind collection fetches.

use std::future::Future;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{DataService, FetchQuery};
use crate::api::{ApiClient, ApiError, Doc, Issue, ListParams, ListResponse, Package};
use crate::store::{Action, CacheEntry, CacheStore, Cursor, Cursors, LoadingKey, Page};

/// A paginated resource kind: how to fetch it and where it lives in state.
pub(crate) trait Collection {
    /// Item type.
    type Item: Clone + Send + 'static;

    /// Loading flag and request lane.
    const KEY: LoadingKey;

    /// Cache entry for the canonical first page.
    fn cache_entry(cache: &CacheStore) -> &CacheEntry<ListResponse<Self::Item>>;

    /// Pagination cursor.
    fn cursor(cursors: &Cursors) -> Cursor;

    /// Requests one page.
    fn request(
        client: &ApiClient,
        params: ListParams,
    ) -> impl Future<Output = Result<ListResponse<Self::Item>, ApiError>> + Send;

    /// Replace action.
    fn set(page: Page<Self::Item>) -> Action;

    /// Append action.
    fn append(page: Page<Self::Item>) -> Action;
}

pub(crate) struct Docs;
pub(crate) struct Packages;
pub(crate) struct Issues;

impl Collection for Docs {
    type Item = Doc;
    const KEY: LoadingKey = LoadingKey::Docs;

    fn cache_entry(cache: &CacheStore) -> &CacheEntry<ListResponse<Doc>> {
        &cache.docs
    }

    fn cursor(cursors: &Cursors) -> Cursor {
        cursors.docs
    }

    async fn request(client: &ApiClient, params: ListParams) -> Result<ListResponse<Doc>, ApiError> {
        client.docs(&params).await
    }

    fn set(page: Page<Doc>) -> Action {
        Action::SetDocs(page)
    }

    fn append(page: Page<Doc>) -> Action {
        Action::AppendDocs(page)
    }
}

impl Collection for Packages {
    type Item = Package;
    const KEY: LoadingKey = LoadingKey::Packages;

    fn cache_entry(cache: &CacheStore) -> &CacheEntry<ListResponse<Package>> {
        &cache.packages
    }

    fn cursor(cursors: &Cursors) -> Cursor {
        cursors.packages
    }

    async fn request(
        client: &ApiClient,
        params: ListParams,
    ) -> Result<ListResponse<Package>, ApiError> {
        client.packages(&params).await
    }

    fn set(page: Page<Package>) -> Action {
        Action::SetPackages(page)
    }

    fn append(page: Page<Package>) -> Action {
        Action::AppendPackages(page)
    }
}

impl Collection for Issues {
    type Item = Issue;
    const KEY: LoadingKey = LoadingKey::Issues;

    fn cache_entry(cache: &CacheStore) -> &CacheEntry<ListResponse<Issue>> {
        &cache.issues
    }

    fn cursor(cursors: &Cursors) -> Cursor {
        cursors.issues
    }

    async fn request(client: &ApiClient, params: ListParams) -> Result<ListResponse<Issue>, ApiError> {
        client.issues(&params).await
    }

    fn set(page: Page<Issue>) -> Action {
        Action::SetIssues(page)
    }

    fn append(page: Page<Issue>) -> Action {
        Action::AppendIssues(page)
    }
}

impl DataService {
    /// Fetches one page of collection `C`.
    ///
    /// An unfiltered first page is served from a valid cache entry without
    /// touching the network. Everything else goes to the API; offset zero
    /// replaces the collection and later offsets append. Either way, any
    /// older request of the same kind is superseded.
    ///
    /// A network fetch clears the error slot when it starts. Failures are
    /// stored there and leave the collection as is.
    pub(crate) async fn fetch_collection<C: Collection>(&self, query: FetchQuery) {
        let kind = C::KEY.as_str();
        let canonical = query.is_canonical();

        if query.use_cache && canonical {
            let now = Utc::now();
            let hit = self.store.read(|s| C::cache_entry(&s.cache).get(now).cloned());
            if let Some(response) = hit {
                debug!("[FETCH] {} served from cache ({} items)", kind, response.data.len());
                // Supersede any older request so its late reply is dropped.
                self.gate.start(C::KEY);
                self.store.dispatch(C::set(Page::uncached(response)));
                self.store.dispatch(Action::SetLoading(C::KEY, false));
                return;
            }
        }

        let id = self.gate.start(C::KEY);
        self.store.dispatch(Action::ClearError);
        self.store.dispatch(Action::SetLoading(C::KEY, true));
        info!(
            "[FETCH] {} limit={} offset={} filter={:?}",
            kind, query.limit, query.offset, query.filter
        );

        let params = ListParams {
            limit: query.limit,
            filter: query.filter.trim().to_string(),
            offset: query.offset,
        };
        let Some(result) = self
            .gate
            .run(C::KEY, id, C::request(&self.client, params))
            .await
        else {
            // The newer request owns the loading flag now.
            debug!("[FETCH] {} request {} superseded", kind, id);
            return;
        };

        match result {
            Ok(response) => {
                info!("[FETCH] {} received {} items", kind, response.data.len());
                let action = if query.offset == 0 {
                    let page = if canonical {
                        Page::cached(response, Utc::now())
                    } else {
                        Page::uncached(response)
                    };
                    C::set(page)
                } else {
                    C::append(Page::at_offset(response, query.offset))
                };
                self.store.dispatch(action);
            }
            Err(e) => {
                warn!("[FETCH] {} failed: {}", kind, e);
                self.store.dispatch(Action::SetError(e.to_string()));
            }
        }

        self.store.dispatch(Action::SetLoading(C::KEY, false));
    }

    /// Fetches the next page of `C` after its current cursor.
    ///
    /// Does nothing when the cursor says there is no more data.
    pub(crate) async fn fetch_next<C: Collection>(&self, limit: u32, filter: &str) {
        let cursor = self.store.read(|s| C::cursor(&s.cursors));
        if !cursor.has_more {
            debug!("[FETCH] {} has no more pages", C::KEY.as_str());
            return;
        }

        let query = FetchQuery::new()
            .limit(limit)
            .filter(filter)
            .offset(cursor.offset);
        self.fetch_collection::<C>(query).await;
    }
}
