use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use itembox_core::file::MSG_INVALID_FILENAME;
use itembox_core::item::validate_item_id;
use itembox_core::{
    CreateItem, FileEntry, Item, ItemEvent, ItemPage, ListItems, UploadFile, UploadReceipt,
};
use itembox_db::{Database, DbError};
use itembox_notify::Notifier;
use itembox_store::{ObjectStore, StoreError};

use crate::{ItemService, ServiceError, MSG_ITEM_NOT_FOUND};

/// In-process implementation over the storage, object store, and notification clients.
pub struct LocalService {
    db: Arc<dyn Database>,
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
}

impl LocalService {
    pub fn new(
        db: Arc<dyn Database>,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            store,
            notifier,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => ServiceError::NotFound(MSG_ITEM_NOT_FOUND.into()),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidKey(_) => ServiceError::InvalidInput(MSG_INVALID_FILENAME.into()),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl ItemService for LocalService {
    async fn list_items(&self, query: &ListItems) -> Result<ItemPage, ServiceError> {
        let limit = query.effective_limit();
        Ok(self.db.scan_items(limit, query.last_key.as_ref()).await?)
    }

    async fn get_item(&self, id: &str) -> Result<Item, ServiceError> {
        let id = validate_item_id(id)?;
        Ok(self.db.get_item(id).await?)
    }

    async fn create_item(&self, input: &CreateItem) -> Result<Item, ServiceError> {
        let item = Item::new(input)?;
        self.db.put_item(&item).await?;
        tracing::debug!(item_id = %item.id, "item created");
        Ok(item)
    }

    async fn delete_item(&self, id: &str) -> Result<Item, ServiceError> {
        let id = validate_item_id(id)?;
        self.db.get_item(id).await?;
        let item = self
            .db
            .delete_item(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(MSG_ITEM_NOT_FOUND.into()))?;

        // The delete is already durable; a lost event is logged, not surfaced.
        let event = ItemEvent::deleted(item.clone());
        if let Err(e) = self.notifier.publish(&event).await {
            tracing::warn!(
                item_id = %item.id,
                topic = %self.notifier.topic(),
                error = %e,
                "failed to publish delete event"
            );
        }
        Ok(item)
    }

    async fn upload_file(&self, input: &UploadFile) -> Result<UploadReceipt, ServiceError> {
        input.validate()?;
        let receipt = self
            .store
            .upload(&input.filename, Bytes::from(input.content.clone()))
            .await?;
        tracing::debug!(key = %receipt.key, bucket = %receipt.bucket, "file uploaded");
        Ok(receipt)
    }

    async fn list_files(&self) -> Result<Vec<FileEntry>, ServiceError> {
        Ok(self.store.list().await?)
    }

    async fn health(&self) -> Result<(), ServiceError> {
        Ok(self.db.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use itembox_core::item::MAX_PAGE_LIMIT;
    use itembox_db::SqliteDatabase;
    use itembox_notify::NotifyError;
    use itembox_store::{LocalStore, StoreConfig};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ItemEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        fn topic(&self) -> &str {
            "test"
        }

        async fn publish(&self, event: &ItemEvent) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("topic unreachable".into()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Fixture {
        service: LocalService,
        notifier: Arc<Recorder>,
        db: Arc<SqliteDatabase>,
        _files: tempfile::TempDir,
    }

    fn fixture(fail_notify: bool) -> Fixture {
        let files = tempfile::tempdir().unwrap();
        let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
        let store = Arc::new(LocalStore::new(&StoreConfig {
            local_data_dir: Some(files.path().to_string_lossy().to_string()),
            ..StoreConfig::default()
        }));
        let notifier = Arc::new(Recorder {
            fail: fail_notify,
            ..Recorder::default()
        });
        let service = LocalService::new(db.clone(), store, notifier.clone());
        Fixture {
            service,
            notifier,
            db,
            _files: files,
        }
    }

    fn create(name: &str) -> CreateItem {
        CreateItem {
            name: name.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_and_list() {
        let fx = fixture(false);
        let item = fx.service.create_item(&create(" Widget ")).await.unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.description, "");

        assert_eq!(fx.service.get_item(&item.id).await.unwrap(), item);
        let page = fx.service.list_items(&ListItems::default()).await.unwrap();
        assert_eq!(page.items, vec![item]);
    }

    #[tokio::test]
    async fn create_blank_name_persists_nothing() {
        let fx = fixture(false);
        let err = fx.service.create_item(&create("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(fx.db.scan_items_sync(10, None).unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn delete_publishes_event_and_second_delete_is_not_found() {
        let fx = fixture(false);
        let item = fx.service.create_item(&create("Gone")).await.unwrap();

        let deleted = fx.service.delete_item(&item.id).await.unwrap();
        assert_eq!(deleted, item);

        let events = fx.notifier.events.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].item, item);

        let err = fx.service.delete_item(&item.id).await.unwrap_err();
        match err {
            ServiceError::NotFound(msg) => assert_eq!(msg, MSG_ITEM_NOT_FOUND),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(fx.notifier.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_succeeds_when_notification_fails() {
        let fx = fixture(true);
        let item = fx.service.create_item(&create("Quiet")).await.unwrap();
        let deleted = fx.service.delete_item(&item.id).await.unwrap();
        assert_eq!(deleted.id, item.id);
        assert!(fx.db.get_item_sync(&item.id).is_err());
    }

    #[tokio::test]
    async fn delete_blank_id_is_invalid() {
        let fx = fixture(false);
        let err = fx.service.delete_item(" ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_clamps_oversized_limit() {
        let fx = fixture(false);
        for i in 0..3 {
            fx.service
                .create_item(&create(&format!("item {i}")))
                .await
                .unwrap();
        }
        let query = ListItems {
            limit: Some(MAX_PAGE_LIMIT * 5),
            last_key: None,
        };
        let page = fx.service.list_items(&query).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.last_key.is_none());
    }

    #[tokio::test]
    async fn upload_and_list_files() {
        let fx = fixture(false);
        let receipt = fx
            .service
            .upload_file(&UploadFile {
                filename: "hello.txt".into(),
                content: "hi".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.key, "hello.txt");

        let files = fx.service.list_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 2);
    }

    #[tokio::test]
    async fn upload_escaping_filename_is_invalid() {
        let fx = fixture(false);
        let err = fx
            .service
            .upload_file(&UploadFile {
                filename: "../evil".into(),
                content: "x".into(),
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidInput(msg) => assert_eq!(msg, MSG_INVALID_FILENAME),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_pings_database() {
        let fx = fixture(false);
        fx.service.health().await.unwrap();
    }

    #[test]
    fn db_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(DbError::NotFound("item x".into())),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(DbError::Internal("disk".into())),
            ServiceError::Internal(_)
        ));
    }
}
