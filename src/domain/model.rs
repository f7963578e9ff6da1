//! Catalog entities as the store backend sends them.
//!
//! Every field carries an explicit wire name so a local rename never changes
//! the JSON contract. Aliases cover the older payload family where the
//! backend used a different name for the same field.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Devices older than KitKat are not supported by any published build.
pub const DEFAULT_MIN_ANDROID_VERSION: u32 = 19;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct App {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "developer", alias = "developerName")]
    pub developer: String,
    #[serde(rename = "version")]
    pub version: String,
    #[serde(rename = "versionCode")]
    pub version_code: u32,
    #[serde(rename = "icon", alias = "iconUrl")]
    pub icon: String,
    #[serde(rename = "screenshots", default)]
    pub screenshots: Vec<String>,
    #[serde(rename = "description")]
    pub description: String,
    #[serde(rename = "shortDescription", default)]
    pub short_description: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(rename = "rating", deserialize_with = "de_app_rating")]
    pub rating: f32,
    #[serde(rename = "downloadCount", default)]
    pub download_count: u64,
    #[serde(rename = "price", default)]
    pub price: f64,
    #[serde(rename = "releaseDate", deserialize_with = "chrono::serde::ts_milliseconds::deserialize")]
    pub released_at: DateTime<Utc>,
    #[serde(
        rename = "updateDate",
        deserialize_with = "chrono::serde::ts_milliseconds_option::deserialize",
        default
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "permissions", default)]
    pub permissions: BTreeSet<Permission>,
    #[serde(rename = "tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "compatibleDevices", default)]
    pub compatible_devices: Vec<String>,
    #[serde(rename = "downloadUrl", default)]
    pub download_url: Option<String>,
    #[serde(rename = "isInstalled", default)]
    pub is_installed: bool,
    #[serde(rename = "isFavorite", default)]
    pub is_favorite: bool,
}

impl App {
    /// Derived from `price`; an `isFree` flag on the wire is not trusted.
    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }

    pub fn supersedes(&self, other: &App) -> bool {
        self.id == other.id && self.version_code > other.version_code
    }
}

// Written by hand so the derived `isFree` goes out with every App.
impl Serialize for App {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("App", 24)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("developer", &self.developer)?;
        state.serialize_field("version", &self.version)?;
        state.serialize_field("versionCode", &self.version_code)?;
        state.serialize_field("icon", &self.icon)?;
        state.serialize_field("screenshots", &self.screenshots)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("shortDescription", &self.short_description)?;
        state.serialize_field("size", &self.size_bytes)?;
        state.serialize_field("categoryId", &self.category_id)?;
        state.serialize_field("rating", &self.rating)?;
        state.serialize_field("downloadCount", &self.download_count)?;
        state.serialize_field("price", &self.price)?;
        state.serialize_field("isFree", &self.is_free())?;
        state.serialize_field("releaseDate", &self.released_at.timestamp_millis())?;
        match &self.updated_at {
            Some(updated_at) => state.serialize_field("updateDate", &updated_at.timestamp_millis())?,
            None => state.skip_field("updateDate")?,
        }
        state.serialize_field("permissions", &self.permissions)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("compatibleDevices", &self.compatible_devices)?;
        match &self.download_url {
            Some(url) => state.serialize_field("downloadUrl", url)?,
            None => state.skip_field("downloadUrl")?,
        }
        state.serialize_field("isInstalled", &self.is_installed)?;
        state.serialize_field("isFavorite", &self.is_favorite)?;
        state.end()
    }
}

fn de_app_rating<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = f32::deserialize(deserializer)?;
    if !(0.0..=5.0).contains(&rating) {
        return Err(serde::de::Error::custom(format!(
            "app rating {} outside 0.0..=5.0",
            rating
        )));
    }
    Ok(rating)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionGroup {
    Calendar,
    Camera,
    Contacts,
    Location,
    Microphone,
    Network,
    Phone,
    Sensors,
    Sms,
    Storage,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "group")]
    pub group: PermissionGroup,
    #[serde(rename = "description", default)]
    pub description: String,
    #[serde(rename = "isDangerous", default)]
    pub dangerous: bool,
}

/// `appCount` is denormalized on the backend and refreshed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "icon", alias = "iconUrl", default)]
    pub icon: String,
    #[serde(rename = "description", default)]
    pub description: String,
    #[serde(rename = "appCount", alias = "appsCount", default)]
    pub app_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "title")]
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "appId", default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "keyword")]
    pub keyword: String,
    #[serde(rename = "apps")]
    pub apps: super::envelope::PagedResponse<App>,
    #[serde(rename = "suggestions", default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingType {
    TopFree,
    TopPaid,
    TopGrossing,
    Trending,
    NewReleases,
}

impl RankingType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            RankingType::TopFree => "TOP_FREE",
            RankingType::TopPaid => "TOP_PAID",
            RankingType::TopGrossing => "TOP_GROSSING",
            RankingType::Trending => "TRENDING",
            RankingType::NewReleases => "NEW_RELEASES",
        }
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for RankingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "TOP_FREE" => Ok(RankingType::TopFree),
            "TOP_PAID" => Ok(RankingType::TopPaid),
            "TOP_GROSSING" => Ok(RankingType::TopGrossing),
            "TRENDING" => Ok(RankingType::Trending),
            "NEW_RELEASES" => Ok(RankingType::NewReleases),
            other => Err(format!("unknown ranking type: {}", other)),
        }
    }
}

/// Star rating given in a comment, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperResponse {
    #[serde(rename = "content")]
    pub content: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "rating")]
    pub rating: Rating,
    #[serde(rename = "content")]
    pub content: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub posted_at: DateTime<Utc>,
    #[serde(rename = "likes", default)]
    pub likes: u32,
    #[serde(rename = "dislikes", default)]
    pub dislikes: u32,
    #[serde(rename = "developerResponse", default, skip_serializing_if = "Option::is_none")]
    pub developer_response: Option<DeveloperResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "versionName")]
    pub version_name: String,
    #[serde(rename = "versionCode")]
    pub version_code: u32,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(rename = "forceUpdate", default)]
    pub force_update: bool,
    #[serde(rename = "minAndroidVersion", default = "default_min_android_version")]
    pub min_android_version: u32,
    #[serde(rename = "releaseNotes", default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
}

impl VersionInfo {
    pub fn is_newer_than(&self, installed_version_code: u32) -> bool {
        self.version_code > installed_version_code
    }
}

fn default_min_android_version() -> u32 {
    DEFAULT_MIN_ANDROID_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn app_json() -> serde_json::Value {
        json!({
            "id": "com.example.notes",
            "name": "Notes",
            "developerName": "Example Labs",
            "version": "2.1.0",
            "versionCode": 210,
            "iconUrl": "https://cdn.example.com/notes.png",
            "screenshots": ["https://cdn.example.com/s1.png", "https://cdn.example.com/s2.png"],
            "description": "Take notes",
            "size": 5242880,
            "categoryId": "productivity",
            "rating": 4.5,
            "downloadCount": 1200,
            "price": 0,
            "isFree": true,
            "releaseDate": 1700000000000i64,
            "permissions": [
                {"name": "android.permission.CAMERA", "group": "CAMERA", "isDangerous": true}
            ]
        })
    }

    #[test]
    fn test_app_decodes_legacy_aliases_and_defaults() {
        let app: App = serde_json::from_value(app_json()).unwrap();

        assert_eq!(app.developer, "Example Labs");
        assert_eq!(app.icon, "https://cdn.example.com/notes.png");
        assert_eq!(app.screenshots.len(), 2);
        assert_eq!(app.released_at, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert!(app.updated_at.is_none());
        assert!(!app.is_installed);
        assert!(!app.is_favorite);
        assert!(app.is_free());
    }

    #[test]
    fn test_is_free_follows_price_not_wire_flag() {
        let mut payload = app_json();
        payload["price"] = json!(1.99);
        payload["isFree"] = json!(true);

        let app: App = serde_json::from_value(payload).unwrap();
        assert!(!app.is_free());
    }

    #[test]
    fn test_app_rating_out_of_range_is_rejected() {
        let mut payload = app_json();
        payload["rating"] = json!(7.5);
        assert!(serde_json::from_value::<App>(payload).is_err());
    }

    #[test]
    fn test_unknown_permission_group_is_rejected() {
        let mut payload = app_json();
        payload["permissions"][0]["group"] = json!("TELEPATHY");
        assert!(serde_json::from_value::<App>(payload).is_err());
    }

    #[test]
    fn test_app_round_trip() {
        let mut app: App = serde_json::from_value(app_json()).unwrap();
        app.updated_at = Some(Utc.timestamp_millis_opt(1_710_000_000_123).unwrap());
        app.download_url = Some("https://cdn.example.com/notes.apk".to_string());
        app.is_favorite = true;

        let encoded = serde_json::to_string(&app).unwrap();
        let decoded: App = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, app);
    }

    #[test]
    fn test_encoded_app_carries_derived_is_free() {
        let mut app: App = serde_json::from_value(app_json()).unwrap();
        app.price = 0.0;
        assert_eq!(serde_json::to_value(&app).unwrap()["isFree"], json!(true));

        app.price = 2.49;
        let encoded = serde_json::to_value(&app).unwrap();
        assert_eq!(encoded["isFree"], json!(false));
        assert!(encoded.get("updateDate").is_none());

        let decoded: App = serde_json::from_value(encoded).unwrap();
        assert!(!decoded.is_free());
    }

    #[test]
    fn test_supersedes_needs_same_id_and_higher_code() {
        let installed: App = serde_json::from_value(app_json()).unwrap();

        let mut newer = installed.clone();
        newer.version_code = installed.version_code + 1;
        assert!(newer.supersedes(&installed));
        assert!(!installed.supersedes(&newer));
        assert!(!installed.supersedes(&installed.clone()));

        let mut other = newer.clone();
        other.id = "someone-else".to_string();
        assert!(!other.supersedes(&installed));
    }

    #[test]
    fn test_category_accepts_both_count_names() {
        let new: Category =
            serde_json::from_value(json!({"id": "games", "name": "Games", "appCount": 12}))
                .unwrap();
        let old: Category =
            serde_json::from_value(json!({"id": "games", "name": "Games", "appsCount": 12}))
                .unwrap();
        assert_eq!(new, old);
        assert_eq!(serde_json::to_value(&new).unwrap()["appCount"], json!(12));
    }

    #[test]
    fn test_comment_rating_bounds_on_decode() {
        let comment = json!({
            "id": "c1", "appId": "a1", "userId": "u1", "rating": 0,
            "content": "meh", "timestamp": 1700000000000i64
        });
        assert!(serde_json::from_value::<Comment>(comment).is_err());
        assert!(Rating::try_from(5).is_ok());
        assert!(Rating::try_from(6).is_err());
    }

    #[test]
    fn test_comment_round_trip_with_developer_response() {
        let comment = Comment {
            id: "c1".to_string(),
            app_id: "a1".to_string(),
            user_id: "u1".to_string(),
            user_name: Some("neo".to_string()),
            rating: Rating::try_from(4).unwrap(),
            content: "Solid app".to_string(),
            posted_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            likes: 3,
            dislikes: 1,
            developer_response: Some(DeveloperResponse {
                content: "Thanks!".to_string(),
                responded_at: Utc.timestamp_millis_opt(1_700_000_500_000).unwrap(),
            }),
        };

        let decoded: Comment =
            serde_json::from_str(&serde_json::to_string(&comment).unwrap()).unwrap();
        assert_eq!(decoded, comment);
    }

    #[test]
    fn test_version_info_defaults_min_android_version() {
        let info: VersionInfo = serde_json::from_value(json!({
            "versionName": "1.4.0",
            "versionCode": 14,
            "downloadUrl": "https://cdn.example.com/store.apk"
        }))
        .unwrap();

        assert_eq!(info.min_android_version, 19);
        assert!(!info.force_update);
        assert!(info.is_newer_than(13));
        assert!(!info.is_newer_than(14));
    }

    #[test]
    fn test_ranking_type_parsing() {
        assert_eq!("top-free".parse::<RankingType>(), Ok(RankingType::TopFree));
        assert_eq!(RankingType::NewReleases.to_string(), "NEW_RELEASES");
        assert!("hot".parse::<RankingType>().is_err());
    }
}
