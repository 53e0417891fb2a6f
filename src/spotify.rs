use rspotify::{
    model::{PlayableId, SearchResult, SearchType, TrackId, UserId},
    prelude::*,
    scopes, AuthCodeSpotify, Config, Credentials, OAuth,
};
use snafu::prelude::*;
use std::path::PathBuf;

use crate::playlist::{self, PlaylistApi, PlaylistRef};
use crate::resolve::{self, TrackSearch};

const MODIFY_PRIVATE_SCOPE: &str = "playlist-modify-private";
const MODIFY_PUBLIC_SCOPE: &str = "playlist-modify-public";

const TOKEN_CACHE_PATH: &str = "/tmp/.setlist2spotify_token_cache.json";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "Spotify credentials missing. Set RSPOTIFY_CLIENT_ID, RSPOTIFY_CLIENT_SECRET and RSPOTIFY_REDIRECT_URI."
    ))]
    Credentials,
    #[snafu(display("Authorization failed: {message}"))]
    Auth { message: String },
    #[snafu(display("Spotify API error: {message}"))]
    Api { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rspotify::ClientError> for Error {
    fn from(error: rspotify::ClientError) -> Self {
        Error::Api {
            message: error.to_string(),
        }
    }
}

/// Authenticated Spotify handle. Fetching stays unauthenticated; the
/// resolver and builder each receive this through their trait seams.
pub struct Spotify {
    client: AuthCodeSpotify,
}

/// Authorize against the Spotify Web API and return a ready client.
///
/// Requests only the playlist-modify scope the run actually needs. The
/// token is cached on disk and refreshed by rspotify, so the browser
/// round-trip happens once.
pub async fn connect(public: bool) -> Result<Spotify> {
    let creds = Credentials::from_env().context(CredentialsSnafu)?;

    let scope = if public {
        MODIFY_PUBLIC_SCOPE
    } else {
        MODIFY_PRIVATE_SCOPE
    };
    let oauth = OAuth::from_env(scopes!(scope)).context(CredentialsSnafu)?;

    let config = Config {
        cache_path: PathBuf::from(TOKEN_CACHE_PATH),
        token_cached: true,
        token_refreshing: true,
        ..Default::default()
    };

    let client = AuthCodeSpotify::with_config(creds, oauth, config);

    let url = client.get_authorize_url(true).map_err(|e| Error::Auth {
        message: e.to_string(),
    })?;

    if webbrowser::open(&url).is_err() {
        info!("open this url in your browser to authorize: {url}");
    }

    client
        .prompt_for_token(&url)
        .await
        .map_err(|e| Error::Auth {
            message: e.to_string(),
        })?;

    Ok(Spotify { client })
}

impl Spotify {
    async fn current_user_id(&self) -> Result<UserId<'static>> {
        let user = self.client.me().await?;
        Ok(user.id)
    }

    async fn create_playlist_inner(
        &self,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef> {
        let user_id = self.current_user_id().await?;

        let created = self
            .client
            .user_playlist_create(user_id, name, Some(public), Some(false), Some(description))
            .await?;

        Ok(PlaylistRef {
            url: created
                .external_urls
                .get("spotify")
                .cloned()
                .unwrap_or_default(),
            id: created.id,
            name: created.name,
        })
    }
}

impl TrackSearch for Spotify {
    async fn search_track(&self, query: &str) -> resolve::Result<Option<TrackId<'static>>> {
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await
            .map_err(|e| resolve::Error::Search {
                message: e.to_string(),
            })?;

        match result {
            SearchResult::Tracks(page) => Ok(page.items.into_iter().next().and_then(|t| t.id)),
            _ => Ok(None),
        }
    }
}

impl PlaylistApi for Spotify {
    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        description: &str,
    ) -> playlist::Result<PlaylistRef> {
        self.create_playlist_inner(name, public, description)
            .await
            .map_err(|e| playlist::Error::Create {
                message: e.to_string(),
            })
    }

    async fn add_tracks(
        &self,
        playlist: &PlaylistRef,
        tracks: &[TrackId<'static>],
    ) -> playlist::Result<()> {
        let items = tracks.iter().cloned().map(PlayableId::Track);

        self.client
            .playlist_add_items(playlist.id.clone(), items, None)
            .await
            .map_err(|e| playlist::Error::AddTracks {
                message: e.to_string(),
            })?;

        Ok(())
    }
}
