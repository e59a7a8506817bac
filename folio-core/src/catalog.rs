use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::Error,
    share_link::{FileId, FolderId, ImageHost, DEFAULT_THUMBNAIL_SIZE},
    util::{order_prefix, slugify},
};

pub type CatalogHandle = Arc<Catalog>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Arc<str>,
    pub title: Arc<str>,
    #[serde(rename = "folderId")]
    pub folder_reference: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<Arc<str>>,
}

impl Album {
    pub fn new(id: &str, title: &str, folder_reference: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            folder_reference: folder_reference.into(),
            cover_photo: None,
        }
    }

    /// Album labelled by a folder share link. The folder ID is kept when the
    /// link can be parsed, otherwise the link itself is the reference.
    pub fn from_folder_link(id: &str, title: &str, folder_link: &str) -> Self {
        let folder_reference = match FolderId::from_share_link(folder_link) {
            Some(folder_id) => folder_id.as_str().into(),
            None => {
                log::warn!("could not extract folder ID from link: {}", folder_link);
                folder_link.into()
            }
        };
        Self {
            id: id.into(),
            title: title.into(),
            folder_reference,
            cover_photo: None,
        }
    }

    /// Album named after a storage folder, e.g. `"01-Weddings"` becomes
    /// `weddings` titled `Weddings`.
    pub fn from_folder_name(folder_name: &str, folder_reference: &str) -> Self {
        let (_, title) = order_prefix(folder_name);
        Self {
            id: slugify(folder_name).into(),
            title: title.into(),
            folder_reference: folder_reference.into(),
            cover_photo: None,
        }
    }

    pub fn with_cover(mut self, cover_photo: &str) -> Self {
        self.cover_photo = Some(cover_photo.into());
        self
    }
}

/// Orders `(folder_name, album)` pairs so numbered folders come first in
/// ascending order, followed by unnumbered ones in their original order.
pub fn sort_albums_by_prefix(albums: &mut [(String, Album)]) {
    albums.sort_by_key(|(name, _)| match order_prefix(name) {
        (Some(order), _) => (false, order),
        (None, _) => (true, 0),
    });
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Arc<str>,
    pub album_id: Arc<str>,
    #[serde(rename = "src")]
    pub direct_url: Arc<str>,
    #[serde(rename = "thumbSrc")]
    pub thumbnail_url: Arc<str>,
    #[serde(default)]
    pub is_cover: bool,
}

/// A photo as authored, before its share link is resolved.
#[derive(Clone, Debug)]
pub struct PhotoDraft {
    pub id: Arc<str>,
    pub album_id: Arc<str>,
    pub share_link: Arc<str>,
    pub is_cover: bool,
    pub order: Option<u64>,
}

impl PhotoDraft {
    pub fn new(id: &str, album_id: &str, share_link: &str) -> Self {
        Self {
            id: id.into(),
            album_id: album_id.into(),
            share_link: share_link.into(),
            is_cover: false,
            order: None,
        }
    }

    /// Photo described by its storage file name. Names containing "cover"
    /// mark the album cover and a numeric prefix sets the order used by
    /// `sort_photos`. The id is the file ID of the link, or the name itself.
    pub fn from_file_name(file_name: &str, album_id: &str, share_link: &str) -> Self {
        let id = match FileId::from_share_link(share_link) {
            Some(file_id) => file_id.as_str().into(),
            None => file_name.into(),
        };
        let (order, _) = order_prefix(file_name);
        Self {
            id,
            album_id: album_id.into(),
            share_link: share_link.into(),
            is_cover: file_name.to_lowercase().contains("cover"),
            order,
        }
    }

    pub fn cover(mut self) -> Self {
        self.is_cover = true;
        self
    }

    pub fn build(self) -> Photo {
        self.build_with(ImageHost::default(), DEFAULT_THUMBNAIL_SIZE)
    }

    pub fn build_with(self, host: ImageHost, thumbnail_size: u32) -> Photo {
        Photo {
            direct_url: host.resolve_direct(&self.share_link).into(),
            thumbnail_url: host
                .resolve_thumbnail(&self.share_link, thumbnail_size)
                .into(),
            id: self.id,
            album_id: self.album_id,
            is_cover: self.is_cover,
        }
    }
}

/// Covers first, then numbered photos in ascending order, then the rest, with
/// ties broken by id.
pub fn sort_photos(drafts: &mut [PhotoDraft]) {
    drafts.sort_by(|a, b| {
        let key = |draft: &PhotoDraft| (!draft.is_cover, draft.order.unwrap_or(u64::MAX));
        key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
    });
}

pub fn build_photo(draft: PhotoDraft) -> Photo {
    draft.build()
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    albums: Vec<Album>,
    photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_photos: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    albums: Vec<Album>,
    photos: Vec<Photo>,
    last_updated: Option<String>,
}

impl Catalog {
    pub fn new(albums: Vec<Album>, photos: Vec<Photo>) -> Result<Self, Error> {
        let mut album_ids = HashSet::new();
        for album in &albums {
            if !album_ids.insert(album.id.clone()) {
                return Err(Error::DuplicateAlbum(album.id.clone()));
            }
        }
        let mut photo_ids = HashSet::new();
        for photo in &photos {
            if !photo_ids.insert(photo.id.clone()) {
                return Err(Error::DuplicatePhoto(photo.id.clone()));
            }
            if !album_ids.contains(&photo.album_id) {
                log::warn!(
                    "photo {} references unknown album: {}",
                    photo.id,
                    photo.album_id
                );
            }
        }
        Ok(Self {
            albums,
            photos,
            last_updated: None,
        })
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        let manifest: Manifest = serde_json::from_reader(reader)?;
        if let Some(total) = manifest.total_photos {
            if total != manifest.photos.len() {
                log::warn!(
                    "manifest declares {} photos but lists {}",
                    total,
                    manifest.photos.len()
                );
            }
        }
        let mut catalog = Self::new(manifest.albums, manifest.photos)?;
        catalog.last_updated = manifest.last_updated;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        log::info!("loading catalog: {:?}", path);
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        log::debug!(
            "loaded {} albums, {} photos",
            catalog.albums.len(),
            catalog.photos.len()
        );
        Ok(catalog)
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<(), Error> {
        let manifest = Manifest {
            albums: self.albums.clone(),
            photos: self.photos.clone(),
            last_updated: self.last_updated.clone(),
            total_photos: Some(self.photos.len()),
        };
        serde_json::to_writer_pretty(writer, &manifest)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn album(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|album| &*album.id == id)
    }

    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|photo| &*photo.id == id)
    }

    pub fn album_photos<'a>(&'a self, album_id: &'a str) -> impl Iterator<Item = &'a Photo> {
        self.photos
            .iter()
            .filter(move |photo| &*photo.album_id == album_id)
    }

    /// Display title of an album. Unknown ids are shown as they are.
    pub fn album_title<'a>(&'a self, album_id: &'a str) -> &'a str {
        self.album(album_id)
            .map(|album| &*album.title)
            .unwrap_or(album_id)
    }

    /// Thumbnail to represent an album: the explicit cover, then the first
    /// photo flagged as cover, then the first photo.
    pub fn cover_photo(&self, album: &Album) -> Option<Arc<str>> {
        if let Some(cover) = &album.cover_photo {
            return Some(cover.clone());
        }
        let mut photos = self.album_photos(&album.id).peekable();
        let first = photos.peek().copied();
        photos
            .find(|photo| photo.is_cover)
            .or(first)
            .map(|photo| photo.thumbnail_url.clone())
    }

    pub fn dangling_references(&self) -> Vec<&Photo> {
        self.photos
            .iter()
            .filter(|photo| self.album(&photo.album_id).is_none())
            .collect()
    }

    /// Photos whose display URL is not an absolute web URL, usually share
    /// links that could not be resolved.
    pub fn unresolved_photos(&self) -> Vec<&Photo> {
        self.photos
            .iter()
            .filter(|photo| !is_web_url(&photo.direct_url))
            .collect()
    }
}

fn is_web_url(link: &str) -> bool {
    Url::parse(link).map_or(false, |url| matches!(url.scheme(), "http" | "https"))
}

/// Registers albums and photos one by one, resolving share links with a
/// fixed host and thumbnail size.
pub struct CatalogBuilder {
    host: ImageHost,
    thumbnail_size: u32,
    albums: Vec<Album>,
    photos: Vec<Photo>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::with_host(ImageHost::default(), DEFAULT_THUMBNAIL_SIZE)
    }

    pub fn with_host(host: ImageHost, thumbnail_size: u32) -> Self {
        Self {
            host,
            thumbnail_size,
            albums: Vec::new(),
            photos: Vec::new(),
        }
    }

    pub fn album(mut self, album: Album) -> Self {
        self.albums.push(album);
        self
    }

    pub fn photo(mut self, draft: PhotoDraft) -> Self {
        let photo = draft.build_with(self.host, self.thumbnail_size);
        self.photos.push(photo);
        self
    }

    pub fn build(self) -> Result<Catalog, Error> {
        Catalog::new(self.albums, self.photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: &str) -> String {
        format!("https://drive.google.com/file/d/{id}/view?usp=sharing")
    }

    fn catalog() -> Catalog {
        CatalogBuilder::new()
            .album(Album::new("weddings", "Weddings", "f1"))
            .album(Album::new("portraits", "Portraits", "f2"))
            .photo(PhotoDraft::new("w1", "weddings", &link("W1")))
            .photo(PhotoDraft::new("p1", "portraits", &link("P1")))
            .photo(PhotoDraft::new("w2", "weddings", &link("W2")).cover())
            .build()
            .unwrap()
    }

    #[test]
    fn build_photo_resolves_both_urls() {
        let photo = build_photo(PhotoDraft::new("1", "weddings", &link("1ABC123xyz")));
        assert_eq!(
            &*photo.direct_url,
            "https://drive.google.com/uc?export=view&id=1ABC123xyz"
        );
        assert_eq!(
            &*photo.thumbnail_url,
            "https://drive.google.com/thumbnail?id=1ABC123xyz&sz=w400"
        );
        assert!(!photo.is_cover);
    }

    #[test]
    fn build_photo_keeps_unresolvable_link() {
        let photo = build_photo(PhotoDraft::new("1", "weddings", "portfolio-1.jpg"));
        assert_eq!(&*photo.direct_url, "portfolio-1.jpg");
        assert_eq!(&*photo.thumbnail_url, "portfolio-1.jpg");
    }

    #[test]
    fn builder_uses_its_host() {
        let catalog = CatalogBuilder::with_host(ImageHost::UserContent, 800)
            .album(Album::new("a", "A", "f"))
            .photo(PhotoDraft::new("1", "a", &link("X")))
            .build()
            .unwrap();
        assert_eq!(
            &*catalog.photos()[0].thumbnail_url,
            "https://lh3.googleusercontent.com/d/X=w800"
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(
            vec![Album::new("a", "A", "f"), Album::new("a", "B", "g")],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateAlbum(id) if &*id == "a"));

        let err = CatalogBuilder::new()
            .album(Album::new("a", "A", "f"))
            .photo(PhotoDraft::new("1", "a", &link("X")))
            .photo(PhotoDraft::new("1", "a", &link("Y")))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePhoto(id) if &*id == "1"));
    }

    #[test]
    fn unresolved_photos_lack_a_web_url() {
        let photo = |id: &str, src: &str| Photo {
            id: id.into(),
            album_id: "a".into(),
            direct_url: src.into(),
            thumbnail_url: src.into(),
            is_cover: false,
        };
        let catalog = Catalog::new(
            vec![Album::new("a", "A", "f")],
            vec![
                photo("1", "https://drive.google.com/uc?export=view&id=X"),
                photo("2", "http://example.com/photo.jpg"),
                photo("3", "portfolio-3.jpg"),
                photo("4", "file:///photos/4.jpg"),
            ],
        )
        .unwrap();
        let ids: Vec<_> = catalog
            .unresolved_photos()
            .iter()
            .map(|photo| &*photo.id)
            .collect();
        assert_eq!(ids, ["3", "4"]);
    }

    #[test]
    fn unknown_album_falls_back_to_raw_id() {
        let catalog = CatalogBuilder::new()
            .album(Album::new("a", "Album A", "f"))
            .photo(PhotoDraft::new("1", "missing", &link("X")))
            .build()
            .unwrap();
        assert_eq!(catalog.album_title("a"), "Album A");
        assert_eq!(catalog.album_title("missing"), "missing");
        let dangling = catalog.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(&*dangling[0].id, "1");
    }

    #[test]
    fn album_photos_preserve_order() {
        let catalog = catalog();
        let ids: Vec<_> = catalog
            .album_photos("weddings")
            .map(|photo| &*photo.id)
            .collect();
        assert_eq!(ids, ["w1", "w2"]);
    }

    #[test]
    fn cover_photo_preference() {
        let catalog = catalog();
        let weddings = catalog.album("weddings").unwrap();
        assert_eq!(
            catalog.cover_photo(weddings).as_deref(),
            Some("https://drive.google.com/thumbnail?id=W2&sz=w400")
        );
        let portraits = catalog.album("portraits").unwrap();
        assert_eq!(
            catalog.cover_photo(portraits).as_deref(),
            Some("https://drive.google.com/thumbnail?id=P1&sz=w400")
        );
        let explicit = portraits.clone().with_cover("cover.jpg");
        assert_eq!(catalog.cover_photo(&explicit).as_deref(), Some("cover.jpg"));
        let empty = Album::new("empty", "Empty", "f");
        assert_eq!(catalog.cover_photo(&empty), None);
    }

    #[test]
    fn albums_from_folders() {
        let album = Album::from_folder_name("01-Weddings", "folder-1");
        assert_eq!(&*album.id, "weddings");
        assert_eq!(&*album.title, "Weddings");

        let album = Album::from_folder_link(
            "street",
            "Street",
            "https://drive.google.com/drive/folders/1FoLdEr?usp=sharing",
        );
        assert_eq!(&*album.folder_reference, "1FoLdEr");

        let album = Album::from_folder_link("street", "Street", "local/street");
        assert_eq!(&*album.folder_reference, "local/street");
    }

    #[test]
    fn numbered_folders_sort_first() {
        let mut albums: Vec<(String, Album)> = ["Candids", "10_Classical Dance", "02 - Portraits"]
            .iter()
            .map(|name| (name.to_string(), Album::from_folder_name(name, name)))
            .collect();
        sort_albums_by_prefix(&mut albums);
        let ids: Vec<_> = albums.iter().map(|(_, album)| &*album.id).collect();
        assert_eq!(ids, ["portraits", "classical-dance", "candids"]);
    }

    #[test]
    fn photos_from_file_names() {
        let cover = PhotoDraft::from_file_name("Cover-Bride.jpg", "weddings", &link("C0"));
        assert!(cover.is_cover);
        assert_eq!(&*cover.id, "C0");
        assert_eq!(cover.order, None);

        let numbered = PhotoDraft::from_file_name("03 - ring.jpg", "weddings", "local/ring.jpg");
        assert!(!numbered.is_cover);
        assert_eq!(&*numbered.id, "03 - ring.jpg");
        assert_eq!(numbered.order, Some(3));
    }

    #[test]
    fn cover_photos_sort_first() {
        let mut drafts: Vec<PhotoDraft> = [
            ("candid.jpg", "Z"),
            ("02-dance.jpg", "B"),
            ("10-vows.jpg", "A"),
            ("couple.jpg", "Y"),
            ("05_COVER.jpg", "X"),
        ]
        .iter()
        .map(|(name, id)| PhotoDraft::from_file_name(name, "weddings", &link(id)))
        .collect();
        sort_photos(&mut drafts);
        let ids: Vec<_> = drafts.iter().map(|draft| &*draft.id).collect();
        assert_eq!(ids, ["X", "B", "A", "Y", "Z"]);
    }

    #[test]
    fn manifest_ignores_unknown_keys() {
        let json = r#"{
            "albums": [
                { "id": "weddings", "title": "Weddings", "folderId": "f1", "coverPhoto": null, "photoCount": 1 }
            ],
            "photos": [
                { "id": "p1", "albumId": "weddings", "src": "s", "thumbSrc": "t" }
            ],
            "lastUpdated": "2024-05-01T10:00:00",
            "totalPhotos": 1
        }"#;
        let catalog = Catalog::from_reader(json.as_bytes()).unwrap();
        assert_eq!(catalog.albums().len(), 1);
        assert_eq!(catalog.albums()[0].cover_photo, None);
        assert!(!catalog.photos()[0].is_cover);
        assert_eq!(catalog.last_updated(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn manifest_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos.json");
        let catalog = catalog();
        catalog.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"totalPhotos\": 3"));
        assert!(contents.contains("\"thumbSrc\""));

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.albums(), catalog.albums());
        assert_eq!(loaded.photos(), catalog.photos());
    }

    #[test]
    fn malformed_manifest_is_a_json_error() {
        let err = Catalog::from_reader("{ \"albums\": 1 }".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
