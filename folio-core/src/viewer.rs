use std::sync::Arc;

use crate::catalog::Photo;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

/// Position adjacent to `position` in a list of `len` items, wrapping around
/// both ends. `None` for an empty list.
pub fn navigate_len(direction: Direction, len: usize, position: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let position = position % len;
    let new_position = match direction {
        Direction::Prev => (position + len - 1) % len,
        Direction::Next => (position + 1) % len,
    };
    Some(new_position)
}

pub fn navigate<T>(direction: Direction, subset: &[T], position: usize) -> Option<usize> {
    navigate_len(direction, subset.len(), position)
}

// Navigation always wraps, so both flags only depend on having somewhere else
// to go.
pub fn has_next<T>(subset: &[T]) -> bool {
    subset.len() > 1
}

pub fn has_prev<T>(subset: &[T]) -> bool {
    subset.len() > 1
}

/// Overlay showing one photo of the visible subset at a time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Viewer {
    #[default]
    Closed,
    Open {
        photo_id: Arc<str>,
        position: usize,
    },
}

impl Viewer {
    pub fn open(&mut self, photo_id: Arc<str>, position: usize) {
        *self = Self::Open { photo_id, position };
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Open { position, .. } => Some(*position),
            Self::Closed => None,
        }
    }

    pub fn photo_id(&self) -> Option<&Arc<str>> {
        match self {
            Self::Open { photo_id, .. } => Some(photo_id),
            Self::Closed => None,
        }
    }

    /// Moves to the adjacent photo of `subset`. Does nothing while closed.
    pub fn navigate<'a>(
        &mut self,
        direction: Direction,
        subset: &[&'a Photo],
    ) -> Option<&'a Photo> {
        let Self::Open { position, .. } = self else {
            return None;
        };
        let new_position = navigate(direction, subset, *position)?;
        let photo = subset[new_position];
        self.open(photo.id.clone(), new_position);
        Some(photo)
    }
}

/// Raw user input delivered to an open viewer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Input {
    Escape,
    BackdropClick,
    CloseButton,
    ArrowLeft,
    ArrowRight,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Close,
    Navigate(Direction),
}

impl Input {
    pub fn action(self, is_open: bool, has_prev: bool, has_next: bool) -> Option<Action> {
        if !is_open {
            return None;
        }
        match self {
            Self::Escape | Self::BackdropClick | Self::CloseButton => Some(Action::Close),
            Self::ArrowLeft if has_prev => Some(Action::Navigate(Direction::Prev)),
            Self::ArrowRight if has_next => Some(Action::Navigate(Direction::Next)),
            Self::ArrowLeft | Self::ArrowRight => None,
        }
    }
}
