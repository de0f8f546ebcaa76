//! Public website content maintained from the back office: news, teachers, gallery, videos,
//! events, singleton settings and the yearly calendar.

pub mod calendar;
pub mod models;
pub mod router;
pub mod settings;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::store::{BatchOp, Collection, DocumentStore, StoreError, StoredDocument};

pub use calendar::{
    build_year_calendar, CalendarEntry, CalendarEntryKind, CalendarMonth, NationalHoliday,
    YearCalendar, NATIONAL_HOLIDAYS,
};
pub use models::{GalleryItem, NewsArticle, SchoolEvent, TeacherProfile, VideoItem};
pub use router::{content_admin_router, content_public_router, ContentState};
pub use settings::{
    HomepageContent, PpdbSchedule, ProfileContent, SchoolInfo, Setting, SettingKey,
    SettingsError, SiteSettings,
};

/// A typed record stored in one of the content collections.
pub trait ContentRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// First required field left blank, if any.
    fn missing_field(&self) -> Option<&'static str>;

    /// Listing order. Insertion order unless a type overrides it.
    fn order(_records: &mut [Self]) {}
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error("{collection} document {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => ContentError::NotFound { collection, id },
            other => ContentError::Store(other),
        }
    }
}

/// CRUD over one content collection.
#[derive(Debug)]
pub struct ContentCollection<T, S> {
    store: Arc<S>,
    _record: PhantomData<fn() -> T>,
}

impl<T, S> Clone for ContentCollection<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T, S> ContentCollection<T, S>
where
    T: ContentRecord,
    S: DocumentStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn list(&self) -> Result<Vec<T>, ContentError> {
        let mut records = self
            .store
            .list(T::COLLECTION)?
            .into_iter()
            .map(decode::<T>)
            .collect::<Result<Vec<_>, _>>()?;
        T::order(&mut records);
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<T, ContentError> {
        match self.store.get(T::COLLECTION, id)? {
            Some(document) => Ok(decode(document)?),
            None => Err(not_found::<T>(id)),
        }
    }

    pub fn create(&self, mut record: T) -> Result<T, ContentError> {
        validate(&record)?;
        let id = self.store.add(T::COLLECTION, encode(&record)?)?;
        record.set_id(id);
        info!(
            collection = T::COLLECTION.as_str(),
            id = record.id(),
            "content created"
        );
        Ok(record)
    }

    /// Replaces an existing record wholesale.
    pub fn update(&self, id: &str, mut record: T) -> Result<T, ContentError> {
        validate(&record)?;
        if self.store.get(T::COLLECTION, id)?.is_none() {
            return Err(not_found::<T>(id));
        }
        self.store.batch(vec![BatchOp::Set {
            collection: T::COLLECTION,
            id: id.to_string(),
            data: encode(&record)?,
        }])?;
        record.set_id(id.to_string());
        info!(collection = T::COLLECTION.as_str(), id, "content updated");
        Ok(record)
    }

    pub fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.store.delete(T::COLLECTION, id)?;
        info!(collection = T::COLLECTION.as_str(), id, "content deleted");
        Ok(())
    }
}

fn validate<T: ContentRecord>(record: &T) -> Result<(), ContentError> {
    match record.missing_field() {
        Some(field) => Err(ContentError::Validation { field }),
        None => Ok(()),
    }
}

fn not_found<T: ContentRecord>(id: &str) -> ContentError {
    ContentError::NotFound {
        collection: T::COLLECTION.as_str(),
        id: id.to_string(),
    }
}

fn decode<T: ContentRecord>(document: StoredDocument) -> Result<T, StoreError> {
    let mut record: T = serde_json::from_value(document.data)?;
    record.set_id(document.id);
    Ok(record)
}

fn encode<T: ContentRecord>(record: &T) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    Ok(value)
}
