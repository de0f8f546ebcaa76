use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ContentRecord;
use crate::store::Collection;

fn first_blank(fields: &[(&'static str, &str)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

/// A news post shown on the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub published_on: NaiveDate,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
}

impl ContentRecord for NewsArticle {
    const COLLECTION: Collection = Collection::News;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("title", self.title.as_str()), ("content", self.content.as_str())])
    }

    /// Newest first. Articles published on the same day keep insertion order.
    fn order(records: &mut [Self]) {
        records.sort_by(|left, right| right.published_on.cmp(&left.published_on));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub education: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ContentRecord for TeacherProfile {
    const COLLECTION: Collection = Collection::Teachers;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("name", self.name.as_str())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_on: Option<NaiveDate>,
}

impl ContentRecord for GalleryItem {
    const COLLECTION: Collection = Collection::Gallery;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("title", self.title.as_str()), ("image_url", self.image_url.as_str())])
    }
}

/// An embedded video, usually a YouTube link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl ContentRecord for VideoItem {
    const COLLECTION: Collection = Collection::Videos;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("title", self.title.as_str()), ("url", self.url.as_str())])
    }
}

/// A school agenda item shown on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolEvent {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl ContentRecord for SchoolEvent {
    const COLLECTION: Collection = Collection::Events;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("title", self.title.as_str())])
    }

    fn order(records: &mut [Self]) {
        records.sort_by(|left, right| left.date.cmp(&right.date));
    }
}
