use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dataset::Person;
use crate::util::stable_hash;

use super::cache::{AvatarCache, CacheKey};
use super::error::{AvatarError, AvatarUnresolved};
use super::fetch::{ImageFetcher, ImageSource};
use super::process::make_circular;

pub const DEFAULT_FALLBACK_BASE: &str = "https://cdn.discordapp.com/embed/avatars";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackAvatars {
    base_url: String,
    count: u32,
}

impl Default for FallbackAvatars {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_BASE, 5)
    }
}

impl FallbackAvatars {
    pub fn new(base_url: impl Into<String>, count: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            count: count.max(1),
        }
    }

    /// Numeric ids use their value (floored modulo, so negatives stay in range);
    /// anything else goes through a stable hash first.
    pub fn index_for(&self, person_id: &str) -> u32 {
        let count = i128::from(self.count);
        let index = match person_id.trim().parse::<i128>() {
            Ok(value) => value.rem_euclid(count),
            Err(_) => i128::from(stable_hash(person_id)) % count,
        };
        index as u32
    }

    pub fn url_for(&self, person_id: &str) -> String {
        format!("{}/{}.png", self.base_url, self.index_for(person_id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarArtifact {
    pub key: CacheKey,
    pub path: PathBuf,
    pub source_url: String,
    pub fallback: bool,
}

pub struct AvatarResolver<S> {
    fetcher: ImageFetcher<S>,
    cache: AvatarCache,
    fallback: FallbackAvatars,
}

impl<S: ImageSource> AvatarResolver<S> {
    pub fn new(fetcher: ImageFetcher<S>, cache: AvatarCache, fallback: FallbackAvatars) -> Self {
        Self {
            fetcher,
            cache,
            fallback,
        }
    }

    pub fn cache(&self) -> &AvatarCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &ImageFetcher<S> {
        &self.fetcher
    }

    pub fn fallback(&self) -> &FallbackAvatars {
        &self.fallback
    }

    pub fn resolve(&self, person_id: &str, avatar_url: &str) -> Result<AvatarArtifact, AvatarUnresolved> {
        let primary = match self.resolve_source(avatar_url) {
            Ok(artifact) => return Ok(artifact),
            Err(error) => error,
        };

        let fallback_url = self.fallback.url_for(person_id);
        warn!(person_id, url = avatar_url, error = %primary, fallback = %fallback_url, "avatar unavailable, using default");

        match self.resolve_source(&fallback_url) {
            Ok(artifact) => Ok(AvatarArtifact {
                fallback: true,
                ..artifact
            }),
            Err(fallback) => Err(AvatarUnresolved {
                person_id: person_id.to_owned(),
                fallback_url,
                primary,
                fallback,
            }),
        }
    }

    fn resolve_source(&self, url: &str) -> Result<AvatarArtifact, AvatarError> {
        let key = AvatarCache::key_for(url)?;
        let artifact = |path| AvatarArtifact {
            key: key.clone(),
            path,
            source_url: url.to_owned(),
            fallback: false,
        };

        if let Some(path) = self.cache.get(&key) {
            debug!(url, key = %key, "avatar cache hit");
            return Ok(artifact(path));
        }

        let bytes = self.fetcher.fetch(url)?;
        let image = make_circular(&bytes).map_err(|source| AvatarError::Processing {
            url: url.to_owned(),
            source,
        })?;
        let path = self.cache.put(&key, &image)?;
        debug!(url, path = %path.display(), "avatar stored");

        Ok(artifact(path))
    }

    pub fn resolve_all(
        &self,
        people: &[Person],
    ) -> HashMap<String, Result<AvatarArtifact, AvatarUnresolved>> {
        let outcomes = people
            .par_iter()
            .map(|person| {
                let outcome = self.resolve(&person.id, &person.avatar_url);
                if let Err(error) = &outcome {
                    warn!(person_id = %person.id, %error, "avatar unresolved");
                }
                (person.id.clone(), outcome)
            })
            .collect::<HashMap<_, _>>();

        let unresolved = outcomes.values().filter(|outcome| outcome.is_err()).count();
        info!(
            people = people.len(),
            unresolved,
            "avatar resolution finished"
        );
        outcomes
    }
}
