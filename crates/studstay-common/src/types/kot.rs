use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _, ser::Error as _};
use smol_str::SmolStr;

use crate::{
    normalize::ImageNormalizer,
    types::{
        filter,
        image::{ImageRef, ImageSet, NormalizedImage},
    },
};

/// A student-housing listing, as read back from the `kots` table.
///
/// `images` is kept raw: depending on who wrote the row it is an array, a
/// JSON-encoded array string, a bare URL, or null. Use [`Kot::gallery`] or
/// [`Kot::card_image`] to get displayable URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kot {
    /// Row id; numeric ids are read as text
    #[serde(deserialize_with = "string_or_number")]
    pub id: SmolStr,
    /// Owner, absent on rows written before accounts existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<SmolStr>,
    /// Listing headline
    pub title: String,
    /// Free-form body text
    #[serde(default)]
    pub description: String,
    /// Monthly rent in euros
    pub price: f64,
    /// Address or neighbourhood
    #[serde(default)]
    pub location: String,
    /// Raw image field, in whatever shape the row holds
    #[serde(default)]
    pub images: ImageRef,
    /// Tags picked on the creation form; null reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filters: Vec<SmolStr>,
    /// Insertion time, if the row carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Kot {
    /// All images in order, for the detail view
    pub fn gallery(&self, normalizer: &ImageNormalizer) -> ImageSet {
        normalizer.normalize_collection(&self.images)
    }

    /// The one image a feed card shows
    pub fn card_image(&self, normalizer: &ImageNormalizer) -> NormalizedImage {
        normalizer.card_image(&self.images)
    }

    /// Splits tags into those from the creation form's catalogue and the rest
    pub fn known_filters(&self) -> (Vec<&str>, Vec<&str>) {
        self.filters
            .iter()
            .map(SmolStr::as_str)
            .partition(|tag| filter::is_known(tag))
    }
}

/// A listing as submitted by the creation form, after its photos have been
/// uploaded and turned into public URLs.
///
/// `images` serializes as a JSON-encoded string of the URL array, which is the
/// form the rows are stored in.
#[derive(Debug, Clone, PartialEq, Serialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct KotDraft {
    /// Signed-in user submitting the listing
    #[builder(into)]
    pub user_id: SmolStr,
    /// Listing headline
    #[builder(into)]
    pub title: String,
    /// Free-form body text
    #[builder(into)]
    pub description: String,
    /// Monthly rent in euros
    pub price: f64,
    /// Address or neighbourhood
    #[builder(into)]
    pub location: String,
    /// Public URLs of the uploaded photos, in upload order
    #[builder(default)]
    #[serde(serialize_with = "as_json_string")]
    pub images: Vec<String>,
    /// Tags picked on the creation form
    #[builder(default)]
    pub filters: Vec<SmolStr>,
    /// Submission time, defaults to now
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

impl KotDraft {
    /// The stored form of `images`
    pub fn image_field(&self) -> String {
        serde_json::Value::from(self.images.clone()).to_string()
    }

    /// The row this draft becomes once the store assigns it an id
    pub fn into_kot(self, id: impl Into<SmolStr>) -> Kot {
        let images = ImageRef::Literal(SmolStr::new(self.image_field()));
        Kot {
            id: id.into(),
            user_id: Some(self.user_id),
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            images,
            filters: self.filters,
            created_at: Some(self.created_at),
        }
    }
}

fn as_json_string<S>(images: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = serde_json::to_string(images).map_err(S::Error::custom)?;
    serializer.serialize_str(&text)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<SmolStr, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(SmolStr::new(s)),
        serde_json::Value::Number(n) => Ok(smol_str::format_smolstr!("{n}")),
        other => Err(D::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_row_with_string_images() {
        let kot: Kot = serde_json::from_value(json!({
            "id": 12,
            "title": "Sunny room near campus",
            "description": "Bright and quiet",
            "price": 450.0,
            "location": "Leuven",
            "images": "[\"/storage/v1/object/public/kot-photos/u/1-a.jpg\"]",
            "filters": ["Furnished", "Heated Pool"],
            "created_at": "2024-09-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(kot.id, "12");
        assert!(kot.user_id.is_none());

        let normalizer = ImageNormalizer::default();
        assert_eq!(
            kot.card_image(&normalizer),
            "https://uabrniklevoi3rnyqogs.supabase.co/storage/v1/object/public/kot-photos/u/1-a.jpg"
        );
        assert_eq!(kot.known_filters(), (vec!["Furnished"], vec!["Heated Pool"]));
    }

    #[test]
    fn deserialize_row_with_nulls() {
        let kot: Kot = serde_json::from_value(json!({
            "id": "a1b2",
            "title": "Studio",
            "price": 600,
            "images": null,
            "filters": null
        }))
        .unwrap();
        assert!(kot.images.is_absent());
        assert!(kot.filters.is_empty());
        assert!(kot.gallery(&ImageNormalizer::default()).is_placeholder());
    }

    #[test]
    fn rejects_object_id() {
        let result: Result<Kot, _> = serde_json::from_value(json!({
            "id": {"uuid": "x"},
            "title": "Studio",
            "price": 600
        }));
        assert!(result.is_err());
    }

    #[test]
    fn draft_stores_images_as_json_text() {
        let draft = KotDraft::new()
            .user_id("user-1")
            .title("Room")
            .description("Nice")
            .price(400.0)
            .location("Ghent")
            .images(vec![
                "https://uabrniklevoi3rnyqogs.supabase.co/storage/v1/object/public/kot-photos/user-1/1-a.jpg".to_string(),
            ])
            .filters(vec!["Balcony".into()])
            .build();

        let row = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            row["images"],
            json!("[\"https://uabrniklevoi3rnyqogs.supabase.co/storage/v1/object/public/kot-photos/user-1/1-a.jpg\"]")
        );
        assert_eq!(row["filters"], json!(["Balcony"]));
        assert!(row["created_at"].is_string());
    }
}
