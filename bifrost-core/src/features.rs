//! Protocol feature flags, as advertised in a `FEATURES` response.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{BifrostError, Result};
use crate::message::{Message, Response};

// ── Feature ──────────────────────────────────────────────────────

/// A standard feature a server may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    FileLoad,
    PlayStop,
    Seek,
    End,
    TimeReport,
    Playlist,
    PlaylistAutoAdvance,
    PlaylistTextItems,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::FileLoad,
        Feature::PlayStop,
        Feature::Seek,
        Feature::End,
        Feature::TimeReport,
        Feature::Playlist,
        Feature::PlaylistAutoAdvance,
        Feature::PlaylistTextItems,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::FileLoad => "FileLoad",
            Feature::PlayStop => "PlayStop",
            Feature::Seek => "Seek",
            Feature::End => "End",
            Feature::TimeReport => "TimeReport",
            Feature::Playlist => "Playlist",
            Feature::PlaylistAutoAdvance => "Playlist.AutoAdvance",
            Feature::PlaylistTextItems => "Playlist.TextItems",
        }
    }

    fn flag(self) -> FeatureFlags {
        match self {
            Feature::FileLoad => FeatureFlags::FILE_LOAD,
            Feature::PlayStop => FeatureFlags::PLAY_STOP,
            Feature::Seek => FeatureFlags::SEEK,
            Feature::End => FeatureFlags::END,
            Feature::TimeReport => FeatureFlags::TIME_REPORT,
            Feature::Playlist => FeatureFlags::PLAYLIST,
            Feature::PlaylistAutoAdvance => FeatureFlags::PLAYLIST_AUTO_ADVANCE,
            Feature::PlaylistTextItems => FeatureFlags::PLAYLIST_TEXT_ITEMS,
        }
    }
}

impl FromStr for Feature {
    type Err = BifrostError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| BifrostError::UnknownFeature(s.to_string()))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FeatureSet ───────────────────────────────────────────────────

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct FeatureFlags: u16 {
        const FILE_LOAD             = 1 << 0;
        const PLAY_STOP             = 1 << 1;
        const SEEK                  = 1 << 2;
        const END                   = 1 << 3;
        const TIME_REPORT           = 1 << 4;
        const PLAYLIST              = 1 << 5;
        const PLAYLIST_AUTO_ADVANCE = 1 << 6;
        const PLAYLIST_TEXT_ITEMS   = 1 << 7;
    }
}

/// A set of [`Feature`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSet(FeatureFlags);

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSet {
    pub fn new() -> Self {
        Self(FeatureFlags::empty())
    }

    /// Every known feature.
    pub fn all() -> Self {
        Self(FeatureFlags::all())
    }

    /// Add a feature, builder style.
    pub fn with(mut self, feature: Feature) -> Self {
        self.insert(feature);
        self
    }

    /// Remove a feature, builder style.
    pub fn without(mut self, feature: Feature) -> Self {
        self.remove(feature);
        self
    }

    pub fn insert(&mut self, feature: Feature) {
        self.0.insert(feature.flag());
    }

    pub fn remove(&mut self, feature: Feature) {
        self.0.remove(feature.flag());
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(feature.flag())
    }

    pub fn len(&self) -> usize {
        self.0.bits().count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in alphabetical order of their wire names.
    pub fn iter(&self) -> std::vec::IntoIter<Feature> {
        let mut members: Vec<Feature> = Feature::ALL
            .into_iter()
            .filter(|f| self.contains(*f))
            .collect();
        members.sort_by_key(|f| f.as_str());
        members.into_iter()
    }

    /// Parse the arguments of a `FEATURES` response.
    pub fn from_message(msg: &Message) -> Result<Self> {
        if !msg.is_response(Response::Features) {
            return Err(BifrostError::NotFeatures(msg.to_string()));
        }
        msg.args().iter().map(|arg| arg.parse::<Feature>()).collect()
    }

    /// `tag FEATURES <names>`, names sorted so output is deterministic.
    pub fn to_message(&self, tag: impl Into<String>) -> Message {
        Message::response(tag, Response::Features, self.iter().map(|f| f.as_str()))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Feature> for FeatureSet {
    fn extend<I: IntoIterator<Item = Feature>>(&mut self, iter: I) {
        for feature in iter {
            self.insert(feature);
        }
    }
}
