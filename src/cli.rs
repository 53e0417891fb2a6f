use clap::{ArgGroup, Parser};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use crate::convert::{self, Outcome, Report};
use crate::fetch::HttpFetcher;
use crate::setlist::Extractor;
use crate::{spotify, Error, Result};

const TITLE: &str = r#"
╔═╗┌─┐┌┬┐┬  ┬┌─┐┌┬┐
╚═╗├┤  │ │  │└─┐ │
╚═╝└─┘ ┴ ┴─┘┴└─┘ ┴
╔═╗┌─┐┌─┐┌┬┐┬┌─┐┬ ┬
╚═╗├─┘│ │ │ │├┤ └┬┘
╚═╝┴  └─┘ ┴ ┴└   ┴
"#;

#[derive(Parser)]
#[clap(name = "setlist2spotify", about = "Convert setlist.fm setlists to Spotify playlists", long_about = None)]
#[clap(group(ArgGroup::new("input").required(true).multiple(true).args(["urls", "file"])))]
struct Cli {
    /// Setlist.fm URLs to convert
    #[clap(value_parser)]
    pub urls: Vec<String>,
    /// File containing setlist URLs (one per line)
    #[clap(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
    /// Create public playlists (default: private)
    #[clap(short = 'p', long = "public")]
    pub public: bool,
    /// Enable verbose logging
    #[clap(short = 'v', long = "verbose")]
    pub verbose: bool,
}

fn read_url_file(path: &PathBuf) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::UrlFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect())
}

/// Positional urls first, then the file's urls. An empty list is a
/// startup error rather than a silently successful no-op run.
fn gather_urls(mut urls: Vec<String>, file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(path) = file {
        urls.extend(read_url_file(path)?);
    }

    if urls.is_empty() {
        return Err(Error::NoUrls);
    }

    Ok(urls)
}

fn render(report: &Report) {
    println!();

    for result in &report.results {
        match &result.outcome {
            Outcome::Created {
                playlist,
                matched,
                unmatched,
            } => {
                println!(
                    "{} {} -> {} ({} matched, {} unmatched) {}",
                    style("✔").green(),
                    result.url,
                    playlist.playlist.name,
                    matched,
                    unmatched.len(),
                    playlist.playlist.url
                );

                if let Some(reason) = &playlist.add_failure {
                    println!(
                        "  {} only {} tracks were added: {reason}",
                        style("!").yellow(),
                        playlist.tracks_added
                    );
                }

                for title in unmatched {
                    println!("  {} not found: {title}", style("?").yellow());
                }
            }
            Outcome::Failed { stage, reason } => {
                println!(
                    "{} {} failed while {stage}: {reason}",
                    style("✖").red(),
                    result.url
                );
            }
        }
    }

    println!(
        "\n{} playlists created, {} failed, {} tracks matched, {} unmatched",
        report.created_count(),
        report.failed_count(),
        report.matched_count(),
        report.unmatched_count()
    );
}

pub async fn run() -> Result<Report> {
    let cli = Cli::parse();

    pretty_env_logger::formatted_builder()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let urls = gather_urls(cli.urls.clone(), cli.file.as_ref())?;

    println!("{TITLE}");

    let spotify = spotify::connect(cli.public).await?;
    let fetcher = HttpFetcher::new()?;
    let extractor = Extractor::new();

    let progress = ProgressBar::new(urls.len() as u64).with_prefix("converting");
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {wide_bar:.cyan/blue} [{pos}/{len}]")
            .unwrap(),
    );
    progress.enable_steady_tick(Duration::from_secs(1));

    let report = convert::convert_batch(&fetcher, &spotify, &extractor, &urls, cli.public, |_| {
        progress.inc(1)
    })
    .await;

    progress.finish_and_clear();
    render(&report);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).expect("failed to write url file");
        path
    }

    #[test]
    fn file_urls_append_after_positional_urls() {
        let path = temp_file("setlist2spotify_urls.txt", "url-2\n\n  url-3  \n");

        let urls = assert_ok!(gather_urls(vec!["url-1".to_string()], Some(&path)));

        std::fs::remove_file(&path).ok();
        assert_eq!(urls, vec!["url-1", "url-2", "url-3"]);
    }

    #[test]
    fn blank_url_file_is_a_startup_error() {
        let path = temp_file("setlist2spotify_blank_urls.txt", "\n   \n\n");

        let result = gather_urls(vec![], Some(&path));

        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::NoUrls)));
    }

    #[test]
    fn unreadable_url_file_is_a_startup_error() {
        let path = PathBuf::from("/nonexistent/setlist-urls.txt");

        let result = gather_urls(vec![], Some(&path));

        assert!(matches!(result, Err(Error::UrlFile { .. })));
    }
}
