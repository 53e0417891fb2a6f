use rspotify::model::{PlaylistId, TrackId};
use snafu::prelude::*;

/// Spotify caps a single add-items call at 100 tracks.
pub const ADD_TRACKS_LIMIT: usize = 100;

pub const PLAYLIST_DESCRIPTION: &str = "Created by setlist2spotify";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to create playlist: {message}"))]
    Create { message: String },
    #[snafu(display("Failed to add tracks: {message}"))]
    AddTracks { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Seam over the playlist endpoints of the streaming service; the builder
/// and its tests only need these two calls.
#[allow(async_fn_in_trait)]
pub trait PlaylistApi {
    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistRef>;

    async fn add_tracks(&self, playlist: &PlaylistRef, tracks: &[TrackId<'static>]) -> Result<()>;
}

/// A playlist that exists on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: PlaylistId<'static>,
    pub name: String,
    pub url: String,
}

/// Outcome of one build. `add_failure` carries the error message when a
/// later chunk failed to upload; the playlist itself is never rolled back.
#[derive(Debug, Clone)]
pub struct CreatedPlaylist {
    pub playlist: PlaylistRef,
    pub tracks_added: usize,
    pub add_failure: Option<String>,
}

/// Create a playlist and append tracks in order.
///
/// Tracks are submitted in chunks of [`ADD_TRACKS_LIMIT`]; order is
/// preserved across chunk boundaries. Creation failure is fatal, but a
/// failure while adding a later chunk returns the playlist with a partial
/// track count and the failure message attached.
pub async fn build_playlist(
    api: &impl PlaylistApi,
    name: &str,
    public: bool,
    tracks: &[TrackId<'static>],
) -> Result<CreatedPlaylist> {
    let playlist = api
        .create_playlist(name, public, PLAYLIST_DESCRIPTION)
        .await?;

    info!("created playlist: {name}");

    let mut tracks_added = 0;
    let mut add_failure = None;

    for chunk in tracks.chunks(ADD_TRACKS_LIMIT) {
        match api.add_tracks(&playlist, chunk).await {
            Ok(()) => {
                tracks_added += chunk.len();
                debug!("added {} tracks to {name}", chunk.len());
            }
            Err(error) => {
                warn!("stopped adding tracks to {name}: {error}");
                add_failure = Some(error.to_string());
                break;
            }
        }
    }

    Ok(CreatedPlaylist {
        playlist,
        tracks_added,
        add_failure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    #[derive(Default)]
    struct FakeApi {
        created: Mutex<Vec<(String, bool)>>,
        added: Mutex<Vec<Vec<TrackId<'static>>>>,
        fail_create: bool,
        fail_add_from_call: Option<usize>,
    }

    impl FakeApi {
        fn playlist_ref(name: &str) -> PlaylistRef {
            PlaylistRef {
                id: PlaylistId::from_id("2IkvmS2LOZJCFa6n9yiA7Z").unwrap(),
                name: name.to_string(),
                url: "https://open.spotify.com/playlist/2IkvmS2LOZJCFa6n9yiA7Z".to_string(),
            }
        }
    }

    impl PlaylistApi for FakeApi {
        async fn create_playlist(
            &self,
            name: &str,
            public: bool,
            _description: &str,
        ) -> Result<PlaylistRef> {
            if self.fail_create {
                return Err(Error::Create {
                    message: "unauthorized".to_string(),
                });
            }

            self.created.lock().unwrap().push((name.to_string(), public));
            Ok(Self::playlist_ref(name))
        }

        async fn add_tracks(
            &self,
            _playlist: &PlaylistRef,
            tracks: &[TrackId<'static>],
        ) -> Result<()> {
            let mut added = self.added.lock().unwrap();

            if let Some(from) = self.fail_add_from_call {
                if added.len() >= from {
                    return Err(Error::AddTracks {
                        message: "server error".to_string(),
                    });
                }
            }

            added.push(tracks.to_vec());
            Ok(())
        }
    }

    fn track_ids(count: usize) -> Vec<TrackId<'static>> {
        // distinct, well-formed 22-character base62 ids
        (0..count)
            .map(|i| {
                let id = format!("{i:022}");
                TrackId::from_id(&id).unwrap().into_static()
            })
            .collect()
    }

    #[tokio::test]
    async fn adds_all_tracks_in_one_chunk_when_under_the_limit() {
        let api = FakeApi::default();
        let tracks = track_ids(3);

        let created = assert_ok!(
            build_playlist(&api, "NOFX - Aug 30, 2026 - The Fillmore", false, &tracks).await
        );

        assert_eq!(created.tracks_added, 3);
        assert!(created.add_failure.is_none());
        assert_eq!(*api.added.lock().unwrap(), vec![tracks]);
    }

    #[tokio::test]
    async fn chunked_adds_preserve_order_across_boundaries() {
        let api = FakeApi::default();
        let tracks = track_ids(ADD_TRACKS_LIMIT * 2 + 5);

        let created = assert_ok!(build_playlist(&api, "long set", false, &tracks).await);

        assert_eq!(created.tracks_added, tracks.len());

        let added = api.added.lock().unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(added[0].len(), ADD_TRACKS_LIMIT);
        assert_eq!(added[1].len(), ADD_TRACKS_LIMIT);
        assert_eq!(added[2].len(), 5);

        let flattened: Vec<TrackId<'static>> = added.iter().flatten().cloned().collect();
        assert_eq!(flattened, tracks);
    }

    #[tokio::test]
    async fn zero_tracks_still_creates_the_playlist() {
        let api = FakeApi::default();

        let created = assert_ok!(build_playlist(&api, "set break only", true, &[]).await);

        assert_eq!(created.tracks_added, 0);
        assert!(created.add_failure.is_none());
        assert_eq!(api.created.lock().unwrap().len(), 1);
        assert!(api.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_failure_is_fatal() {
        let api = FakeApi {
            fail_create: true,
            ..FakeApi::default()
        };

        let result = build_playlist(&api, "doomed", false, &track_ids(1)).await;

        assert!(matches!(result, Err(Error::Create { .. })));
    }

    #[tokio::test]
    async fn later_chunk_failure_surfaces_partial_success() {
        let api = FakeApi {
            fail_add_from_call: Some(1),
            ..FakeApi::default()
        };
        let tracks = track_ids(ADD_TRACKS_LIMIT + 10);

        // creation succeeded, so the build still reports the playlist
        let created = assert_ok!(build_playlist(&api, "partial", false, &tracks).await);

        assert_eq!(created.tracks_added, ADD_TRACKS_LIMIT);
        assert!(created.add_failure.is_some());
        // the playlist was not rolled back
        assert_eq!(api.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn public_flag_is_passed_through() {
        let api = FakeApi::default();

        assert_ok!(build_playlist(&api, "public one", true, &[]).await);

        assert_eq!(
            *api.created.lock().unwrap(),
            vec![("public one".to_string(), true)]
        );
    }
}
