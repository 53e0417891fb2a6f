use snafu::prelude::*;
extern crate pretty_env_logger;
#[macro_use]
extern crate log;

pub mod cli;
pub mod convert;
pub mod fetch;
pub mod playlist;
pub mod resolve;
pub mod setlist;
pub mod spotify;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to read url file {path}: {message}"))]
    UrlFile { path: String, message: String },
    #[snafu(display("No setlist urls to convert."))]
    NoUrls,
    #[snafu(display("{error}"))]
    HttpClientError { error: fetch::Error },
    #[snafu(display("Spotify client error: {error}"))]
    SpotifyError { error: spotify::Error },
}

impl From<spotify::Error> for Error {
    fn from(error: spotify::Error) -> Self {
        Error::SpotifyError { error }
    }
}

impl From<fetch::Error> for Error {
    fn from(error: fetch::Error) -> Self {
        Error::HttpClientError { error }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
