//! Search index synchronization.
//!
//! Reconciles the denormalized product search record with the authoritative
//! product fields after a media job or rating change. The record is created
//! by a separate indexing path; when it does not exist yet, reconciliation is
//! skipped with a log line and the triggering operation succeeds regardless.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::SearchDocPatch;
use emporium_db::SearchIndexRepository;
use emporium_worker::SearchSync;

pub struct SearchIndexSync {
    index: Arc<dyn SearchIndexRepository>,
}

impl SearchIndexSync {
    pub fn new(index: Arc<dyn SearchIndexRepository>) -> Self {
        Self { index }
    }

    /// Overwrite only the supplied fields of the product's search record.
    pub async fn reconcile(
        &self,
        product_id: Uuid,
        patch: SearchDocPatch,
    ) -> Result<(), AppError> {
        if patch.is_empty() {
            return Ok(());
        }

        let applied = self.index.apply_patch(product_id, &patch).await?;
        if applied {
            tracing::debug!(product_id = %product_id, "Search record reconciled");
        } else {
            tracing::info!(
                product_id = %product_id,
                "No search record for product, reconciliation skipped"
            );
        }

        Ok(())
    }
}

#[async_trait]
impl SearchSync for SearchIndexSync {
    async fn reconcile(&self, product_id: Uuid, patch: SearchDocPatch) -> Result<(), AppError> {
        SearchIndexSync::reconcile(self, product_id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::models::SearchIndexRecord;
    use emporium_db::InMemorySearchIndex;

    #[tokio::test]
    async fn absent_record_is_skipped_not_failed() {
        let sync = SearchIndexSync::new(Arc::new(InMemorySearchIndex::default()));
        sync.reconcile(Uuid::new_v4(), SearchDocPatch::video(None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn present_record_gets_partial_update() {
        let index = InMemorySearchIndex::default();
        let product_id = Uuid::new_v4();
        let mut record = SearchIndexRecord::new(product_id, "desk lamp");
        record.main_image_url = Some("http://cdn/lamp.webp".to_string());
        index.insert(record).await;

        let index = Arc::new(index);
        let sync = SearchIndexSync::new(index.clone());
        sync.reconcile(
            product_id,
            SearchDocPatch::video(Some("http://cdn/lamp.mp4".to_string())),
        )
        .await
        .unwrap();

        let record = index.find_by_product(product_id).await.unwrap().unwrap();
        assert_eq!(record.video_url.as_deref(), Some("http://cdn/lamp.mp4"));
        assert_eq!(record.main_image_url.as_deref(), Some("http://cdn/lamp.webp"));
    }
}
