//! The single active image and its undo history.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::warn;

use crate::codec::ImageInfo;
use crate::params::ParameterSet;
use crate::raster::Raster;

/// A structural state that `undo` can return to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub base: Raster,
    pub grayscale: bool,
}

/// Bounded linear history; the oldest snapshot is evicted on overflow.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.entries.len() == self.limit {
            self.entries.pop_front();
            warn!("undo history full ({} entries), dropping oldest", self.limit);
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    /// Most recent snapshot, left in place.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Original, base and composite buffers for one loaded image.
///
/// `current` always equals the base with the active parameters replayed on
/// top of it. Only the pipeline mutates the buffers, so the fields are
/// private and exposed read-only.
#[derive(Debug, Clone)]
pub struct ImageState {
    original: Raster,
    pub(crate) base: Raster,
    pub(crate) current: Raster,
    pub(crate) params: ParameterSet,
    pub(crate) grayscale: bool,
    pub(crate) modified: bool,
    pub(crate) history: History,
    source: Option<PathBuf>,
    info: Option<ImageInfo>,
}

impl ImageState {
    /// Fresh state: all three buffers equal `original`, identity parameters.
    pub fn new(original: Raster, history_limit: usize) -> Self {
        Self {
            base: original.clone(),
            current: original.clone(),
            original,
            params: ParameterSet::identity(),
            grayscale: false,
            modified: false,
            history: History::new(history_limit),
            source: None,
            info: None,
        }
    }

    /// Record where the image came from.
    pub fn with_source(mut self, path: impl AsRef<Path>, info: ImageInfo) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self.info = Some(info);
        self
    }

    pub fn original(&self) -> &Raster {
        &self.original
    }

    pub fn base(&self) -> &Raster {
        &self.base
    }

    pub fn current(&self) -> &Raster {
        &self.current
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// True once the image was explicitly converted to grayscale.
    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    /// True when `current` differs from what was loaded or last saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn info(&self) -> Option<&ImageInfo> {
        self.info.as_ref()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            base: self.base.clone(),
            grayscale: self.grayscale,
        }
    }
}
