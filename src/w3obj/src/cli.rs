use clap::Parser;

use crate::cmd::convert::Convert;

mod args;
pub use args::*;

/// Converts Warcraft III object modification files to and from CSV.
///
/// The direction is chosen from the file extensions: a `.w3u`, `.w3t`,
/// `.w3h` or `.w3a` input is written as `.csv` or `.json`, and a `.csv`
/// input is written as one of the binary variants or `.json`.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub command: Convert,

    #[clap(flatten)]
    pub verbosity: Verbosity,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn requires_both_paths() {
        assert!(Cli::try_parse_from(["w3obj", "units.w3u"]).is_err());
        assert!(Cli::try_parse_from(["w3obj", "a.w3u", "b.csv", "c.csv"]).is_err());

        let cli = Cli::try_parse_from(["w3obj", "-vv", "units.w3u", "units.csv"]).unwrap();
        assert_eq!(cli.verbosity.verbose, 2);
    }
}
