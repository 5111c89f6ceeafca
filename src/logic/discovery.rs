use crate::model::{Activity, ChangeRecord, OrderedCollection, OrderedCollectionPage};
use crate::store::traits::ChangeStore;
use crate::urls::{ApiUrls, ACTIVITIES, ACTIVITIES_PAGE};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("page {page} is out of range, the collection has {pages} pages")]
    PageOutOfBounds { page: i64, pages: u64 },
    #[error(transparent)]
    Index(#[from] anyhow::Error),
}

/// Shapes the record change history into an Activity Streams paged
/// collection. Built per request from the index, the URL configuration and
/// the configured page size; holds no state of its own.
pub struct ActivityCollectionBuilder<'a, S: ChangeStore> {
    index: &'a S,
    urls: &'a ApiUrls,
    activities_per_page: u64,
}

impl<'a, S: ChangeStore> ActivityCollectionBuilder<'a, S> {
    /// `activities_per_page` must be at least 1; configuration loading
    /// enforces that.
    pub fn new(index: &'a S, urls: &'a ApiUrls, activities_per_page: u64) -> Self {
        Self {
            index,
            urls,
            activities_per_page,
        }
    }

    /// Collection-level document: the total count plus links to the first and
    /// last page. Index errors surface unchanged, they are not retried here.
    pub async fn build_collection(&self) -> Result<OrderedCollection, DiscoveryError> {
        let total = self.index.count_changes().await?;
        let pages = self.page_count(total);

        Ok(OrderedCollection::new(
            self.collection_url(),
            total,
            self.page_url(0),
            self.page_url(pages - 1),
        ))
    }

    /// One page of activities. Out-of-range page numbers (negative or past
    /// the last page) fail with `PageOutOfBounds` rather than an index error.
    pub async fn build_page(&self, page_no: i64) -> Result<OrderedCollectionPage, DiscoveryError> {
        let total = self.index.count_changes().await?;
        let pages = self.page_count(total);
        if page_no < 0 || page_no as u64 >= pages {
            return Err(DiscoveryError::PageOutOfBounds {
                page: page_no,
                pages,
            });
        }
        let page_no = page_no as u64;

        let offset = page_no * self.activities_per_page;
        let records = self.index.changes(offset, self.activities_per_page).await?;
        let items = records.iter().filter_map(map_activity).collect();

        let prev = (page_no > 0).then(|| self.page_url(page_no - 1));
        let next = (page_no + 1 < pages).then(|| self.page_url(page_no + 1));

        Ok(OrderedCollectionPage::new(
            self.page_url(page_no),
            self.collection_url(),
            prev,
            next,
            items,
        ))
    }

    /// An empty collection still has one (empty) page.
    fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.activities_per_page).max(1)
    }

    fn collection_url(&self) -> String {
        self.urls.path([ACTIVITIES]).build()
    }

    fn page_url(&self, page_no: u64) -> String {
        self.urls.path([ACTIVITIES_PAGE]).params([page_no]).build()
    }
}

fn map_activity(record: &ChangeRecord) -> Option<Activity> {
    let activity = record.to_activity();
    if activity.is_none() {
        log::warn!(
            "Change record for '{}' carries no timestamp, skipping it",
            record.pi
        );
    }
    activity
}
