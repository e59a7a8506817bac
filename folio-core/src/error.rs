use std::{error, fmt, io, sync::Arc};

#[derive(Debug)]
pub enum Error {
    UnresolvableShareLink(String),
    UnknownAlbum(Arc<str>),
    DuplicateAlbum(Arc<str>),
    DuplicatePhoto(Arc<str>),
    InvalidSelection { position: usize },
    NotVisible(Arc<str>),
    JsonError(Box<dyn error::Error + Send + Sync>),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvableShareLink(link) => {
                write!(f, "Could not extract file ID from share link: {link}")
            }
            Self::UnknownAlbum(id) => write!(f, "Unknown album: {id}"),
            Self::DuplicateAlbum(id) => write!(f, "Duplicate album id: {id}"),
            Self::DuplicatePhoto(id) => write!(f, "Duplicate photo id: {id}"),
            Self::InvalidSelection { position } => {
                write!(f, "No matching photo at position {position}")
            }
            Self::NotVisible(id) => write!(f, "Photo is not in the current selection: {id}"),
            Self::JsonError(err) => err.fmt(f),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(Box::new(err))
    }
}
