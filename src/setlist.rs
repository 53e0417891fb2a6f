use chrono::NaiveDate;
use scraper::{Html, Selector};
use snafu::prelude::*;

/// Setlist entries that are annotations rather than performed songs.
/// Compared case-insensitively against the trimmed entry text.
const DEFAULT_MARKERS: &[&str] = &["tape", "intro", "outro", "set break", "soundcheck", "unknown"];

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Page has no artist headline."))]
    MissingArtist,
    #[snafu(display("Page has no venue link."))]
    MissingVenue,
    #[snafu(display("Page has no date block."))]
    MissingDate,
    #[snafu(display("Could not parse setlist date from '{text}'."))]
    InvalidDate { text: String },
    #[snafu(display("Page has no song list."))]
    MissingSongList,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A concert setlist as scraped from one page. Song order is the
/// performance order and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setlist {
    pub artist: String,
    pub venue: String,
    pub date: NaiveDate,
    pub songs: Vec<String>,
}

impl Setlist {
    /// Playlist title in the `artist - date - venue` form.
    pub fn title(&self) -> String {
        format!(
            "{} - {} - {}",
            self.artist,
            self.date.format("%b %-d, %Y"),
            self.venue
        )
    }
}

/// Parses setlist.fm pages into [`Setlist`] values.
///
/// Selectors are compiled once up front. The non-song marker list is a
/// replaceable policy; the defaults cover the annotations setlist.fm
/// commonly mixes into song lists.
pub struct Extractor {
    markers: Vec<String>,
    artist: Selector,
    venue: Selector,
    date_block: Selector,
    month: Selector,
    day: Selector,
    year: Selector,
    songs_list: Selector,
    song_label: Selector,
    empty_setlist: Selector,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_markers(DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect())
    }

    pub fn with_markers(markers: Vec<String>) -> Self {
        Self {
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
            artist: Selector::parse(r#".setlistHeadline a[href*="/setlists/"]"#).unwrap(),
            venue: Selector::parse(r#".setlistHeadline a[href*="/venue/"]"#).unwrap(),
            date_block: Selector::parse(".dateBlockContainer .dateBlock").unwrap(),
            month: Selector::parse(".month").unwrap(),
            day: Selector::parse(".day").unwrap(),
            year: Selector::parse(".year").unwrap(),
            songs_list: Selector::parse("ol.songsList").unwrap(),
            song_label: Selector::parse("a.songLabel").unwrap(),
            empty_setlist: Selector::parse("div.emptySetlist").unwrap(),
        }
    }

    /// Parse one fetched page into a typed setlist.
    ///
    /// Fails when the artist, venue or date metadata is missing. A page
    /// with an empty-setlist marker, or whose song list filters down to
    /// nothing, yields a setlist with zero songs rather than an error.
    pub fn extract(&self, html: &str) -> Result<Setlist> {
        let document = Html::parse_document(html);

        let artist = self.text_of(&document, &self.artist).context(MissingArtistSnafu)?;
        let venue = self.text_of(&document, &self.venue).context(MissingVenueSnafu)?;
        let date = self.extract_date(&document)?;
        let songs = self.extract_songs(&document)?;

        Ok(Setlist {
            artist,
            venue,
            date,
            songs,
        })
    }

    fn text_of(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    fn extract_date(&self, document: &Html) -> Result<NaiveDate> {
        let block = document
            .select(&self.date_block)
            .next()
            .context(MissingDateSnafu)?;

        let part = |selector: &Selector| {
            block
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        };

        let text = match (part(&self.month), part(&self.day), part(&self.year)) {
            (Some(month), Some(day), Some(year)) => format!("{month} {day} {year}"),
            // Older page layouts render the date as one run of text.
            _ => block
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<&str>>()
                .join(" "),
        };

        NaiveDate::parse_from_str(&text, "%b %d %Y").map_err(|_| Error::InvalidDate { text })
    }

    fn extract_songs(&self, document: &Html) -> Result<Vec<String>> {
        let Some(list) = document.select(&self.songs_list).next() else {
            // A page may legitimately have no song list at all, but only
            // when it is flagged as an empty setlist.
            ensure!(
                document.select(&self.empty_setlist).next().is_some(),
                MissingSongListSnafu
            );
            return Ok(vec![]);
        };

        let songs = list
            .select(&self.song_label)
            .map(|label| label.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty() && !self.is_marker(title))
            .collect();

        Ok(songs)
    }

    fn is_marker(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.markers.iter().any(|marker| *marker == lowered)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
