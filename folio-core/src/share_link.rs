use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 400;

// Order matters, the first pattern that captures wins.
static FILE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"/file/d/([a-zA-Z0-9_-]+)",
        r"id=([a-zA-Z0-9_-]+)",
        r"/open\?id=([a-zA-Z0-9_-]+)",
    ])
});

static FOLDER_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"/folders/([a-zA-Z0-9_-]+)", r"id=([a-zA-Z0-9_-]+)"]));

static THUMBNAIL_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?&]sz=w|/d/[a-zA-Z0-9_-]+=w)\d+").unwrap());

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
}

fn first_capture<'a>(patterns: &[Regex], input: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(input)?.get(1))
        .map(|m| m.as_str())
}

/// Opaque identifier of a single file on the storage provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn from_share_link(link: &str) -> Option<Self> {
        first_capture(&FILE_PATTERNS, link).map(|id| Self(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for FileId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a folder on the storage provider. Only used to label
/// where an album comes from, folders are never enumerated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FolderId(Arc<str>);

impl FolderId {
    pub fn from_share_link(link: &str) -> Option<Self> {
        first_capture(&FOLDER_PATTERNS, link).map(|id| Self(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn extract_file_id(share_link: &str) -> Option<FileId> {
    FileId::from_share_link(share_link)
}

pub fn extract_folder_id(share_link: &str) -> Option<FolderId> {
    FolderId::from_share_link(share_link)
}

/// URL template family used to display a resolved file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageHost {
    /// `drive.google.com` view and thumbnail endpoints.
    Drive,
    /// `lh3.googleusercontent.com`, less prone to rate limiting when embedded.
    UserContent,
}

impl Default for ImageHost {
    fn default() -> Self {
        Self::Drive
    }
}

impl ImageHost {
    pub fn direct_url(self, id: &FileId) -> String {
        match self {
            Self::Drive => format!("https://drive.google.com/uc?export=view&id={id}"),
            Self::UserContent => format!("https://lh3.googleusercontent.com/d/{id}"),
        }
    }

    pub fn thumbnail_url(self, id: &FileId, size: u32) -> String {
        match self {
            Self::Drive => format!("https://drive.google.com/thumbnail?id={id}&sz=w{size}"),
            Self::UserContent => format!("https://lh3.googleusercontent.com/d/{id}=w{size}"),
        }
    }

    pub fn try_direct_url(self, share_link: &str) -> Result<String, Error> {
        let id = FileId::from_share_link(share_link)
            .ok_or_else(|| Error::UnresolvableShareLink(share_link.to_string()))?;
        Ok(self.direct_url(&id))
    }

    pub fn try_thumbnail_url(self, share_link: &str, size: u32) -> Result<String, Error> {
        let id = FileId::from_share_link(share_link)
            .ok_or_else(|| Error::UnresolvableShareLink(share_link.to_string()))?;
        Ok(self.thumbnail_url(&id, size))
    }

    /// Direct view URL for a share link. Unrecognized links are returned as
    /// they are, callers should not expect them to display.
    pub fn resolve_direct(self, share_link: &str) -> String {
        self.try_direct_url(share_link).unwrap_or_else(|err| {
            log::warn!("{}", err);
            share_link.to_string()
        })
    }

    pub fn resolve_thumbnail(self, share_link: &str, size: u32) -> String {
        self.try_thumbnail_url(share_link, size).unwrap_or_else(|err| {
            log::warn!("{}", err);
            share_link.to_string()
        })
    }
}

impl FromStr for ImageHost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" => Ok(Self::Drive),
            "user-content" => Ok(Self::UserContent),
            _ => Err(format!(
                "Invalid image host: {s}. Must be 'drive' or 'user-content'."
            )),
        }
    }
}

impl fmt::Display for ImageHost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Drive => f.write_str("drive"),
            Self::UserContent => f.write_str("user-content"),
        }
    }
}

pub fn to_direct_url(share_link: &str) -> String {
    ImageHost::Drive.resolve_direct(share_link)
}

pub fn to_thumbnail_url(share_link: &str, size: u32) -> String {
    ImageHost::Drive.resolve_thumbnail(share_link, size)
}

/// Rewrites the width of an already resolved thumbnail URL, e.g. to request
/// smaller covers for a grid. URLs without a width are returned unchanged.
pub fn resize_thumbnail(url: &str, size: u32) -> String {
    THUMBNAIL_SIZE
        .replace(url, |caps: &regex::Captures| format!("{}{}", &caps[1], size))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARE_LINK: &str = "https://drive.google.com/file/d/1ABC123xyz/view?usp=sharing";

    #[test]
    fn extracts_id_from_file_path() {
        let id = extract_file_id(SHARE_LINK).unwrap();
        assert_eq!(id.as_str(), "1ABC123xyz");
    }

    #[test]
    fn extracts_id_from_query_forms() {
        let id = extract_file_id("https://drive.google.com/uc?export=download&id=a_b-C9").unwrap();
        assert_eq!(&*id, "a_b-C9");
        let id = extract_file_id("https://drive.google.com/open?id=0B-xyz_123").unwrap();
        assert_eq!(&*id, "0B-xyz_123");
    }

    #[test]
    fn file_path_takes_precedence_over_query() {
        let id = extract_file_id("https://drive.google.com/file/d/PATH/view?id=QUERY").unwrap();
        assert_eq!(&*id, "PATH");
    }

    #[test]
    fn unrecognized_link_has_no_id() {
        assert_eq!(extract_file_id("not-a-drive-link"), None);
        assert_eq!(to_direct_url("not-a-drive-link"), "not-a-drive-link");
        assert_eq!(to_thumbnail_url("not-a-drive-link", 400), "not-a-drive-link");
    }

    #[test]
    fn strict_resolution_reports_the_link() {
        let err = ImageHost::Drive.try_direct_url("nope").unwrap_err();
        assert!(matches!(err, Error::UnresolvableShareLink(link) if link == "nope"));
    }

    #[test]
    fn drive_urls() {
        assert_eq!(
            to_direct_url(SHARE_LINK),
            "https://drive.google.com/uc?export=view&id=1ABC123xyz"
        );
        assert_eq!(
            to_thumbnail_url(SHARE_LINK, 400),
            "https://drive.google.com/thumbnail?id=1ABC123xyz&sz=w400"
        );
    }

    #[test]
    fn thumbnail_carries_exact_size() {
        for size in [1, 250, 400, 1600] {
            let url = to_thumbnail_url(SHARE_LINK, size);
            assert!(url.ends_with(&format!("sz=w{size}")), "{url}");
        }
    }

    #[test]
    fn user_content_urls() {
        let host = ImageHost::UserContent;
        assert_eq!(
            host.resolve_direct(SHARE_LINK),
            "https://lh3.googleusercontent.com/d/1ABC123xyz"
        );
        assert_eq!(
            host.resolve_thumbnail(SHARE_LINK, 800),
            "https://lh3.googleusercontent.com/d/1ABC123xyz=w800"
        );
    }

    #[test]
    fn folder_links() {
        let id =
            extract_folder_id("https://drive.google.com/drive/folders/1FoLdEr_id?usp=sharing")
                .unwrap();
        assert_eq!(id.as_str(), "1FoLdEr_id");
        let id = extract_folder_id("https://drive.google.com/open?id=1FoLdEr_id").unwrap();
        assert_eq!(id.as_str(), "1FoLdEr_id");
        assert_eq!(extract_folder_id("https://example.com/albums/weddings"), None);
    }

    #[test]
    fn resize_drive_and_user_content_thumbnails() {
        assert_eq!(
            resize_thumbnail("https://drive.google.com/thumbnail?id=w800x&sz=w800", 400),
            "https://drive.google.com/thumbnail?id=w800x&sz=w400"
        );
        assert_eq!(
            resize_thumbnail("https://lh3.googleusercontent.com/d/abc=w800", 400),
            "https://lh3.googleusercontent.com/d/abc=w400"
        );
        assert_eq!(
            resize_thumbnail("https://example.com/photo.jpg", 400),
            "https://example.com/photo.jpg"
        );
    }

    #[test]
    fn image_host_parses_config_names() {
        assert_eq!("drive".parse::<ImageHost>(), Ok(ImageHost::Drive));
        assert_eq!("user-content".parse::<ImageHost>(), Ok(ImageHost::UserContent));
        assert!("s3".parse::<ImageHost>().is_err());
    }
}
