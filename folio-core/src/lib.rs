#![allow(clippy::new_without_default)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod gallery;
pub mod share_link;
pub mod slideshow;
pub mod util;
pub mod viewer;
