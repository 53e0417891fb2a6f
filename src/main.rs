use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match setlist2spotify::cli::run().await {
        // at least one playlist created exits zero; a batch where every
        // url failed exits 1; startup errors (auth, bad or empty url
        // file) exit 2 before any conversion runs
        Ok(report) => {
            if report.all_failed() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(2)
        }
    }
}
