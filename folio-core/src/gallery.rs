use std::{fmt, sync::Arc};

use url::Url;

use crate::{
    catalog::{Album, Catalog, CatalogHandle, Photo},
    error::Error,
    viewer::{self, Action, Direction, Input, Viewer},
};

const ALBUM_QUERY_KEY: &str = "album";

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Filter {
    #[default]
    All,
    Album(Arc<str>),
}

impl Filter {
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => Self::All,
            album_id => Self::Album(album_id.into()),
        }
    }

    /// Like `parse`, but rejects album ids the catalog doesn't know.
    pub fn parse_in(value: &str, catalog: &Catalog) -> Result<Self, Error> {
        match Self::parse(value) {
            Self::Album(id) if catalog.album(&id).is_none() => Err(Error::UnknownAlbum(id)),
            filter => Ok(filter),
        }
    }

    /// Reads the `album` query parameter of a portfolio link such as
    /// `/portfolio?album=weddings`. Relative links are accepted.
    pub fn from_url(link: &str) -> Self {
        let parsed = Url::parse("https://localhost/").and_then(|base| base.join(link));
        match parsed {
            Ok(url) => url
                .query_pairs()
                .find(|(key, _)| key == ALBUM_QUERY_KEY)
                .map(|(_, value)| Self::parse(&value))
                .unwrap_or_default(),
            Err(err) => {
                log::debug!("ignoring unparsable link {:?}: {}", link, err);
                Self::All
            }
        }
    }

    pub fn matches(&self, photo: &Photo) -> bool {
        match self {
            Self::All => true,
            Self::Album(album_id) => photo.album_id == *album_id,
        }
    }

    pub fn label<'a>(&'a self, catalog: &'a Catalog) -> &'a str {
        match self {
            Self::All => "All",
            Self::Album(album_id) => catalog.album_title(album_id),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Album(album_id) => f.write_str(album_id),
        }
    }
}

/// Every filter the catalog offers, `All` first, then one per album.
pub fn filters(catalog: &Catalog) -> Vec<Filter> {
    std::iter::once(Filter::All)
        .chain(
            catalog
                .albums()
                .iter()
                .map(|album| Filter::Album(album.id.clone())),
        )
        .collect()
}

/// Photos passing `filter` in catalog order, at most `limit` of them.
pub fn visible_subset<'a>(
    catalog: &'a Catalog,
    filter: &Filter,
    limit: Option<usize>,
) -> Vec<&'a Photo> {
    catalog
        .photos()
        .iter()
        .filter(|photo| filter.matches(photo))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// First `limit` albums for the album grid. A limit of zero shows them all.
pub fn visible_albums(catalog: &Catalog, limit: Option<usize>) -> &[Album] {
    let albums = catalog.albums();
    match limit {
        Some(limit) if limit > 0 => &albums[..limit.min(albums.len())],
        _ => albums,
    }
}

#[derive(Clone, Debug)]
pub enum GalleryCommand {
    SetFilter(Filter),
    Open { position: usize },
    OpenPhoto(Arc<str>),
    Close,
    Navigate(Direction),
    Input(Input),
    Reset,
}

/// Selection state of one rendered gallery: the active filter and the photo
/// open in the viewer, if any.
pub struct Gallery {
    catalog: CatalogHandle,
    filter: Filter,
    limit: Option<usize>,
    viewer: Viewer,
}

impl Gallery {
    pub fn new(catalog: CatalogHandle, limit: Option<usize>) -> Self {
        Self {
            catalog,
            filter: Filter::All,
            limit,
            viewer: Viewer::Closed,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn visible(&self) -> Vec<&Photo> {
        visible_subset(&self.catalog, &self.filter, self.limit)
    }

    pub fn has_next(&self) -> bool {
        viewer::has_next(&self.visible())
    }

    pub fn has_prev(&self) -> bool {
        viewer::has_prev(&self.visible())
    }

    /// Switching to a different filter closes the viewer, since its position
    /// refers to the previous subset.
    pub fn set_filter(&mut self, filter: Filter) {
        if filter == self.filter {
            return;
        }
        if self.viewer.is_open() {
            log::debug!("filter changed to {}, closing viewer", filter);
            self.viewer.close();
        }
        self.filter = filter;
    }

    pub fn open(&mut self, photo: &Photo, position: usize) -> Result<(), Error> {
        let visible = visible_subset(&self.catalog, &self.filter, self.limit);
        match visible.get(position) {
            Some(candidate) if candidate.id == photo.id => {
                self.viewer.open(candidate.id.clone(), position);
                Ok(())
            }
            _ => Err(Error::InvalidSelection { position }),
        }
    }

    pub fn open_at(&mut self, position: usize) -> Result<&Photo, Error> {
        let visible = visible_subset(&self.catalog, &self.filter, self.limit);
        let photo = visible
            .get(position)
            .copied()
            .ok_or(Error::InvalidSelection { position })?;
        self.viewer.open(photo.id.clone(), position);
        Ok(photo)
    }

    pub fn open_photo(&mut self, photo_id: &str) -> Result<&Photo, Error> {
        let visible = visible_subset(&self.catalog, &self.filter, self.limit);
        let (position, photo) = visible
            .iter()
            .copied()
            .enumerate()
            .find(|(_, photo)| &*photo.id == photo_id)
            .ok_or_else(|| Error::NotVisible(photo_id.into()))?;
        self.viewer.open(photo.id.clone(), position);
        Ok(photo)
    }

    pub fn close(&mut self) {
        self.viewer.close();
    }

    /// Back to the initial state, as when the gallery is left.
    pub fn reset(&mut self) {
        self.filter = Filter::All;
        self.viewer.close();
    }

    /// Photo currently shown by the viewer.
    pub fn current(&self) -> Option<&Photo> {
        let position = self.viewer.position()?;
        let photo = self.visible().get(position).copied()?;
        if Some(&photo.id) == self.viewer.photo_id() {
            Some(photo)
        } else {
            None
        }
    }

    pub fn navigate(&mut self, direction: Direction) -> Option<&Photo> {
        let visible = visible_subset(&self.catalog, &self.filter, self.limit);
        self.viewer.navigate(direction, &visible)
    }

    pub fn handle_input(&mut self, input: Input) -> Option<Action> {
        let action = input.action(self.viewer.is_open(), self.has_prev(), self.has_next())?;
        match action {
            Action::Close => self.close(),
            Action::Navigate(direction) => {
                self.navigate(direction);
            }
        }
        Some(action)
    }

    pub fn handle(&mut self, command: GalleryCommand) -> Result<(), Error> {
        match command {
            GalleryCommand::SetFilter(filter) => self.set_filter(filter),
            GalleryCommand::Open { position } => {
                self.open_at(position)?;
            }
            GalleryCommand::OpenPhoto(photo_id) => {
                self.open_photo(&photo_id)?;
            }
            GalleryCommand::Close => self.close(),
            GalleryCommand::Navigate(direction) => {
                self.navigate(direction);
            }
            GalleryCommand::Input(input) => {
                self.handle_input(input);
            }
            GalleryCommand::Reset => self.reset(),
        }
        Ok(())
    }
}
