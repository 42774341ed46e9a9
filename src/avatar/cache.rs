use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use url::Url;

use super::error::{AvatarError, CacheError};
use super::process::CircularImage;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
pub struct AvatarCache {
    root: PathBuf,
}

impl AvatarCache {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_for(url: &str) -> Result<CacheKey, AvatarError> {
        let invalid = || AvatarError::InvalidUrl {
            url: url.to_owned(),
        };

        let parsed = Url::parse(url).map_err(|_| invalid())?;
        let segment = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(invalid)?;

        Ok(CacheKey(segment.to_owned()))
    }

    pub fn location(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("circular_{key}.png"))
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.location(key).is_file()
    }

    pub fn get(&self, key: &CacheKey) -> Option<PathBuf> {
        let location = self.location(key);
        location.is_file().then_some(location)
    }

    /// Stages the PNG next to its final location and renames it into place,
    /// so concurrent writers of one key never expose a partial file.
    pub fn put(&self, key: &CacheKey, image: &CircularImage) -> Result<PathBuf, CacheError> {
        let location = self.location(key);
        let encoded = image.encode_png().map_err(|source| CacheError::Encode {
            path: location.clone(),
            source,
        })?;

        let io_error = |source: io::Error| CacheError::Io {
            path: location.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.root).map_err(io_error)?;
        staged.write_all(&encoded).map_err(io_error)?;
        staged
            .persist(&location)
            .map_err(|error| io_error(error.error))?;

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;
    use crate::avatar::process::make_circular;

    fn circle() -> CircularImage {
        let mut encoded = Vec::new();
        RgbaImage::from_pixel(4, 4, Rgba([5, 5, 5, 255]))
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .unwrap();
        make_circular(&encoded).unwrap()
    }

    #[test]
    fn key_is_the_last_path_segment() {
        let key = AvatarCache::key_for("https://cdn.example/avatars/42/abc123.png?size=128").unwrap();
        assert_eq!(key.as_str(), "abc123.png");
    }

    #[test]
    fn same_file_name_on_different_paths_collides() {
        let first = AvatarCache::key_for("https://a.example/x/pic.png").unwrap();
        let second = AvatarCache::key_for("https://b.example/y/pic.png").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn urls_without_a_file_name_are_rejected() {
        for url in ["https://cdn.example/", "https://cdn.example", "not a url", ""] {
            assert!(
                matches!(AvatarCache::key_for(url), Err(AvatarError::InvalidUrl { .. })),
                "{url} should not produce a key"
            );
        }
    }

    #[test]
    fn location_depends_only_on_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AvatarCache::open(dir.path().join("avatars")).unwrap();
        let key = AvatarCache::key_for("https://cdn.example/a/face.webp").unwrap();

        assert_eq!(cache.location(&key), dir.path().join("avatars").join("circular_face.webp.png"));
        assert_eq!(cache.location(&key), cache.location(&key.clone()));
    }

    #[test]
    fn keys_differing_only_in_extension_get_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AvatarCache::open(dir.path()).unwrap();
        let png = AvatarCache::key_for("https://cdn.example/u1/abc.png").unwrap();
        let gif = AvatarCache::key_for("https://cdn.example/u2/abc.gif").unwrap();
        let bare = AvatarCache::key_for("https://cdn.example/u3/abc").unwrap();

        let locations = [cache.location(&png), cache.location(&gif), cache.location(&bare)];
        assert_ne!(locations[0], locations[1]);
        assert_ne!(locations[0], locations[2]);
        assert_ne!(locations[1], locations[2]);

        cache.put(&png, &circle()).unwrap();
        assert!(cache.has(&png));
        assert!(!cache.has(&gif));
        assert_eq!(cache.get(&bare), None);
    }

    #[test]
    fn concurrent_writers_of_one_key_leave_a_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AvatarCache::open(dir.path()).unwrap();
        let key = AvatarCache::key_for("https://cdn.example/shared.png").unwrap();
        let image = circle();
        let expected = image.encode_png().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        cache.put(&key, &image).unwrap();
                    }
                });
            }
        });

        assert_eq!(fs::read(cache.location(&key)).unwrap(), expected);
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn put_then_get_round_trips_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AvatarCache::open(dir.path()).unwrap();
        let key = AvatarCache::key_for("https://cdn.example/face.png").unwrap();
        assert!(!cache.has(&key));
        assert_eq!(cache.get(&key), None);

        let first = cache.put(&key, &circle()).unwrap();
        let first_bytes = fs::read(&first).unwrap();
        let second = cache.put(&key, &circle()).unwrap();

        assert_eq!(first, second);
        assert!(cache.has(&key));
        assert_eq!(cache.get(&key), Some(first));
        assert_eq!(fs::read(&second).unwrap(), first_bytes);
    }

    #[test]
    fn put_leaves_no_staging_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AvatarCache::open(dir.path()).unwrap();
        let key = AvatarCache::key_for("https://cdn.example/face.png").unwrap();
        cache.put(&key, &circle()).unwrap();

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
