use std::time::Duration;

use crate::viewer::{navigate, Direction};

pub const DEFAULT_SLIDE_INTERVAL: Duration = Duration::from_secs(6);

/// Auto-advancing carousel over a fixed list of slides. The caller owns the
/// timer and calls `advance` once per `interval`.
pub struct Slideshow<T> {
    slides: Vec<T>,
    current: usize,
    interval: Duration,
}

impl<T> Slideshow<T> {
    pub fn new(slides: Vec<T>) -> Self {
        Self::with_interval(slides, DEFAULT_SLIDE_INTERVAL)
    }

    pub fn with_interval(slides: Vec<T>, interval: Duration) -> Self {
        Self {
            slides,
            current: 0,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&T> {
        self.slides.get(self.current)
    }

    pub fn advance(&mut self) -> Option<&T> {
        self.current = navigate(Direction::Next, &self.slides, self.current)?;
        self.current()
    }

    pub fn go_to(&mut self, position: usize) -> Option<&T> {
        if position < self.slides.len() {
            self.current = position;
        }
        self.current()
    }
}
