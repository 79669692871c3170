use clap::Parser;

/// Command-line arguments for vgdash
#[derive(Parser, Debug, Default)]
#[command(version, about = "vgdash - video-game sales dashboard in the terminal")]
pub struct Args {
    /// Base URL of the dashboard backend (overrides the config file)
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    /// Rows per table page (overrides the config file)
    #[arg(long = "per-page")]
    pub per_page: Option<usize>,

    /// Search debounce delay in milliseconds (overrides the config file)
    #[arg(long = "debounce-ms")]
    pub debounce_ms: Option<u64>,

    /// Fetch, apply no filters, write the CSV export to this path, and exit
    #[arg(long = "export")]
    pub export: Option<std::path::PathBuf>,

    /// Write the default config file and exit
    #[arg(long = "write-config", action)]
    pub write_config: bool,

    /// Overwrite an existing config file when writing it
    #[arg(long = "force", action)]
    pub force: bool,

    /// Enable debug logging to the log file
    #[arg(long = "debug", action)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "vgdash",
            "--api-url",
            "http://example.com",
            "--per-page",
            "25",
        ]);
        assert_eq!(args.api_url.as_deref(), Some("http://example.com"));
        assert_eq!(args.per_page, Some(25));
        assert!(!args.write_config);
    }

    #[test]
    fn defaults_are_empty() {
        let args = Args::parse_from(["vgdash"]);
        assert!(args.api_url.is_none());
        assert!(args.export.is_none());
        assert!(!args.debug);
    }
}
