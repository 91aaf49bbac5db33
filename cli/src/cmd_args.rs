use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "oneget", version, about = "Fetch one URL with a single HTTP GET", long_about = None)]
struct ClapArgs {
    /// URL to fetch, e.g. https://example.com/index.html
    url: String,

    /// Verbose mode
    /// Optional. Repeat to log more (-v warn, -vv info, -vvv debug, -vvvv trace).
    #[clap(short = 'v', long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    url: String,
    verbose: u8,
}

impl CommandLineArgs {
    pub fn try_parse() -> Result<Self, clap::Error> {
        ClapArgs::try_parse().map(Self::from)
    }

    #[cfg(test)]
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        ClapArgs::try_parse_from(itr).map(Self::from)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Most detailed level that reaches stderr.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            url: args.url,
            verbose: args.verbose,
        }
    }
}
