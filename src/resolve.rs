use rspotify::model::TrackId;
use snafu::prelude::*;
use std::time::Duration;

use crate::setlist::Setlist;

// Pause between successive search calls to stay friendly with the API.
const SEARCH_PACING: Duration = Duration::from_millis(125);

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Search failed: {message}"))]
    Search { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Issues one track search and returns the API's top result, if any.
/// The orchestrator and resolver only ever talk to this seam, so tests
/// substitute a canned search handle.
#[allow(async_fn_in_trait)]
pub trait TrackSearch {
    async fn search_track(&self, query: &str) -> Result<Option<TrackId<'static>>>;
}

/// How a track id was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The search was constrained to the setlist's artist.
    ArtistAndTitle,
    /// The relaxed, title-only retry matched.
    TitleOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: TrackId<'static>,
    pub confidence: Confidence,
}

/// One setlist entry after resolution. `matched` is `None` when no
/// acceptable track was found, including when the search itself errored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub title: String,
    pub matched: Option<Match>,
}

/// Resolve one song title against the search API.
///
/// The constrained query runs first and its top result is trusted as-is.
/// On zero results the title-only retry tolerates featuring-artist and
/// transliteration mismatches. A search error degrades to unmatched so a
/// flaky song never takes the whole setlist down with it.
pub async fn resolve_track(
    search: &impl TrackSearch,
    artist: &str,
    title: &str,
) -> ResolvedTrack {
    let constrained = format!("artist:{artist} track:{title}");

    match search.search_track(&constrained).await {
        Ok(Some(id)) => {
            debug!("matched {artist} - {title}");
            return ResolvedTrack {
                title: title.to_string(),
                matched: Some(Match {
                    id,
                    confidence: Confidence::ArtistAndTitle,
                }),
            };
        }
        Ok(None) => {
            debug!("no artist-constrained match for {artist} - {title}, retrying title only");
        }
        Err(error) => {
            warn!("search error for {artist} - {title}: {error}");
            return ResolvedTrack {
                title: title.to_string(),
                matched: None,
            };
        }
    }

    let relaxed = format!("track:{title}");

    let matched = match search.search_track(&relaxed).await {
        Ok(Some(id)) => Some(Match {
            id,
            confidence: Confidence::TitleOnly,
        }),
        Ok(None) => {
            warn!("could not find song: {artist} - {title}");
            None
        }
        Err(error) => {
            warn!("search error for {title}: {error}");
            None
        }
    };

    ResolvedTrack {
        title: title.to_string(),
        matched,
    }
}

/// Resolve every song of a setlist, in performance order.
pub async fn resolve_setlist(search: &impl TrackSearch, setlist: &Setlist) -> Vec<ResolvedTrack> {
    let mut resolved = Vec::with_capacity(setlist.songs.len());

    for (index, song) in setlist.songs.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(SEARCH_PACING).await;
        }

        resolved.push(resolve_track(search, &setlist.artist, song).await);
    }

    resolved
}
