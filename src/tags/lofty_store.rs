//! Tag store backed by lofty
//!
//! Maps a fixed set of common key names onto lofty's format-independent
//! `ItemKey`s, so ID3v2 frames and Vorbis comments surface under the same
//! names.

use super::{TagMap, TagStore, TagValue};
use crate::error::{Error, Result};
use lofty::config::WriteOptions;
use lofty::error::{ErrorKind, LoftyError};
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag, TagItem};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

/// Key names understood by [`LoftyTagStore`]
pub const COMMON_KEYS: &[&str] = &[
    "album",
    "albumartist",
    "artist",
    "bpm",
    "comment",
    "composer",
    "conductor",
    "copyright",
    "date",
    "discnumber",
    "disctotal",
    "encodedby",
    "genre",
    "isrc",
    "lyricist",
    "lyrics",
    "organization",
    "title",
    "tracknumber",
    "tracktotal",
];

/// lofty item key for a common key name
pub fn item_key(name: &str) -> Option<ItemKey> {
    let key = match name {
        "album" => ItemKey::AlbumTitle,
        "albumartist" => ItemKey::AlbumArtist,
        "artist" => ItemKey::TrackArtist,
        "bpm" => ItemKey::Bpm,
        "comment" => ItemKey::Comment,
        "composer" => ItemKey::Composer,
        "conductor" => ItemKey::Conductor,
        "copyright" => ItemKey::CopyrightMessage,
        "date" => ItemKey::RecordingDate,
        "discnumber" => ItemKey::DiscNumber,
        "disctotal" => ItemKey::DiscTotal,
        "encodedby" => ItemKey::EncodedBy,
        "genre" => ItemKey::Genre,
        "isrc" => ItemKey::Isrc,
        "lyricist" => ItemKey::Lyricist,
        "lyrics" => ItemKey::Lyrics,
        "organization" => ItemKey::Label,
        "title" => ItemKey::TrackTitle,
        "tracknumber" => ItemKey::TrackNumber,
        "tracktotal" => ItemKey::TrackTotal,
        _ => return None,
    };
    Some(key)
}

/// Common key name for a lofty item key
pub fn common_name(key: &ItemKey) -> Option<&'static str> {
    COMMON_KEYS
        .iter()
        .copied()
        .find(|name| item_key(name).as_ref() == Some(key))
}

/// Reads and writes MP3/FLAC tags through lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagStore;

impl LoftyTagStore {
    pub fn new() -> Self {
        Self
    }
}

fn open(path: &Path) -> std::result::Result<TaggedFile, LoftyError> {
    Probe::open(path)?.read()
}

fn tag_error(path: &Path, e: LoftyError) -> Error {
    Error::Tags {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl TagStore for LoftyTagStore {
    fn read(&self, path: &Path) -> Result<Option<TagMap>> {
        let tagged_file = match open(path) {
            Ok(file) => file,
            Err(e) if matches!(e.kind(), ErrorKind::UnknownFormat) => {
                debug!(path = %path.display(), "Unsupported container");
                return Ok(None);
            }
            Err(e) => return Err(tag_error(path, e)),
        };

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(None);
        };

        let mut grouped: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for item in tag.items() {
            let Some(name) = common_name(item.key()) else {
                trace!(key = ?item.key(), "Skipping unmapped tag item");
                continue;
            };
            if let Some(text) = item.value().text() {
                grouped.entry(name).or_default().push(text.to_string());
            }
        }

        let tags: TagMap = grouped
            .into_iter()
            .filter_map(|(name, texts)| TagValue::from_texts(texts).map(|v| (name.to_string(), v)))
            .collect();

        Ok((!tags.is_empty()).then_some(tags))
    }

    fn write(&self, path: &Path, tags: &TagMap) -> Result<()> {
        let (mut tagged_file, resolved) = prepare(path, tags)?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = tagged_file.primary_tag_mut() else {
            return Err(Error::NoTagSupport {
                path: path.to_path_buf(),
            });
        };

        for (key, value) in resolved {
            tag.retain(|item| item.key() != &key);
            for text in value.texts() {
                if !tag.push(TagItem::new(key.clone(), ItemValue::Text(text))) {
                    return Err(Error::UnknownTagKey {
                        path: path.to_path_buf(),
                        key: common_name(&key).unwrap_or_default().to_string(),
                    });
                }
            }
        }

        tagged_file
            .save_to_path(path, WriteOptions::default())
            .map_err(|e| tag_error(path, e))?;
        debug!(path = %path.display(), keys = tags.len(), "Saved tags");
        Ok(())
    }

    fn check(&self, path: &Path, tags: &TagMap) -> Result<()> {
        prepare(path, tags).map(|_| ())
    }
}

/// Open `path` for tagging and resolve every key before anything is touched
fn prepare<'t>(path: &Path, tags: &'t TagMap) -> Result<(TaggedFile, Vec<(ItemKey, &'t TagValue)>)> {
    let tagged_file = match open(path) {
        Ok(file) => file,
        Err(e) if matches!(e.kind(), ErrorKind::UnknownFormat) => {
            return Err(Error::NoTagSupport {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(tag_error(path, e)),
    };

    let resolved = tags
        .iter()
        .map(|(name, value)| {
            item_key(name).map(|key| (key, value)).ok_or_else(|| Error::UnknownTagKey {
                path: path.to_path_buf(),
                key: name.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((tagged_file, resolved))
}
