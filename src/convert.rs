use std::fmt::Display;

use crate::fetch::PageFetcher;
use crate::playlist::{self, CreatedPlaylist, PlaylistApi};
use crate::resolve::{self, TrackSearch};
use crate::setlist::Extractor;

/// Pipeline stage a conversion failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Resolving,
    Building,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Resolving => "resolving",
            Stage::Building => "building",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Created {
        playlist: CreatedPlaylist,
        matched: usize,
        unmatched: Vec<String>,
    },
    Failed {
        stage: Stage,
        reason: String,
    },
}

/// Per-URL result; immutable once recorded.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub url: String,
    pub outcome: Outcome,
}

impl ConversionResult {
    pub fn is_created(&self) -> bool {
        matches!(self.outcome, Outcome::Created { .. })
    }
}

/// Everything that happened across one batch.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<ConversionResult>,
}

impl Report {
    pub fn created_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_created()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.created_count()
    }

    pub fn matched_count(&self) -> usize {
        self.results
            .iter()
            .map(|r| match &r.outcome {
                Outcome::Created { matched, .. } => *matched,
                Outcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn unmatched_count(&self) -> usize {
        self.results
            .iter()
            .map(|r| match &r.outcome {
                Outcome::Created { unmatched, .. } => unmatched.len(),
                Outcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// True when nothing in the batch produced a playlist.
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.created_count() == 0
    }
}

/// Convert one setlist URL into a playlist.
///
/// Every failure is scoped to this URL; the caller records the outcome
/// and moves on. A setlist with zero songs still becomes a (zero-track)
/// playlist and counts as a success.
pub async fn convert_url<S>(
    fetcher: &impl PageFetcher,
    service: &S,
    extractor: &Extractor,
    url: &str,
    public: bool,
) -> Outcome
where
    S: TrackSearch + PlaylistApi,
{
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(error) => {
            return Outcome::Failed {
                stage: Stage::Fetching,
                reason: error.to_string(),
            }
        }
    };

    let setlist = match extractor.extract(&html) {
        Ok(setlist) => setlist,
        Err(error) => {
            return Outcome::Failed {
                stage: Stage::Extracting,
                reason: error.to_string(),
            }
        }
    };

    info!(
        "processing setlist for {} at {} on {}",
        setlist.artist, setlist.venue, setlist.date
    );

    // Per-song search errors are absorbed inside the resolver and show
    // up as unmatched entries, so resolving itself cannot fail the URL.
    let resolved = resolve::resolve_setlist(service, &setlist).await;

    let unmatched: Vec<String> = resolved
        .iter()
        .filter(|r| r.matched.is_none())
        .map(|r| r.title.clone())
        .collect();

    let track_ids: Vec<_> = resolved
        .iter()
        .filter_map(|r| r.matched.as_ref().map(|m| m.id.clone()))
        .collect();

    let matched = track_ids.len();

    match playlist::build_playlist(service, &setlist.title(), public, &track_ids).await {
        Ok(playlist) => Outcome::Created {
            playlist,
            matched,
            unmatched,
        },
        Err(error) => Outcome::Failed {
            stage: Stage::Building,
            reason: error.to_string(),
        },
    }
}

/// Run the whole batch, one URL start-to-finish at a time. One bad URL
/// never halts the batch. `on_result` fires after each URL so the caller
/// can tick a progress bar.
pub async fn convert_batch<S>(
    fetcher: &impl PageFetcher,
    service: &S,
    extractor: &Extractor,
    urls: &[String],
    public: bool,
    mut on_result: impl FnMut(&ConversionResult),
) -> Report
where
    S: TrackSearch + PlaylistApi,
{
    let mut report = Report::default();

    for url in urls {
        let outcome = convert_url(fetcher, service, extractor, url, public).await;

        if let Outcome::Failed { stage, reason } = &outcome {
            error!("{url} failed while {stage}: {reason}");
        }

        let result = ConversionResult {
            url: url.clone(),
            outcome,
        };
        on_result(&result);
        report.results.push(result);
    }

    report
}
