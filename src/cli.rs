//! Command-line flags and their environment variable fallbacks

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::config::{
    CleanerConfig, DEFAULT_IMAGE_VERSION_PATTERN, DEFAULT_KEEP, DEFAULT_REGISTRY_URL,
};
use crate::retention::plan::ParseFailurePolicy;

#[derive(Debug, Parser)]
#[command(name = "registry-cleaner")]
#[command(
    version,
    about = "Delete old image versions from a Docker registry, keeping only the latest ones"
)]
pub struct Cli {
    /// Registry url
    #[arg(long, env = "URL", default_value = DEFAULT_REGISTRY_URL)]
    pub url: String,

    /// Registry username (optional)
    #[arg(short = 'u', long, env = "USERNAME")]
    pub username: Option<String>,

    /// Registry password (optional)
    #[arg(short = 'p', long, env = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Image name to clean up, e.g. 'development/nginx'
    #[arg(short = 'i', long, env = "IMAGE")]
    pub image: Option<String>,

    /// Image versions to delete, as a regex matched against the whole tag
    #[arg(
        long = "imageversion",
        visible_alias = "iv",
        env = "IMAGE_VERSION",
        default_value = DEFAULT_IMAGE_VERSION_PATTERN
    )]
    pub image_version: String,

    /// Number of matching versions to keep
    #[arg(short = 'k', long, env = "KEEP", default_value_t = DEFAULT_KEEP)]
    pub keep: usize,

    /// Do not actually delete anything
    #[arg(
        short = 'd',
        long = "dryrun",
        env = "DRYRUN",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// What to do with tags that match the pattern but are not valid versions
    #[arg(long, env = "ON_PARSE_ERROR", value_enum, default_value_t = ParseFailurePolicy::Skip)]
    pub on_parse_error: ParseFailurePolicy,

    /// Write JSON logs to a file (defaults to the data directory)
    #[arg(long, env = "LOG_FILE", num_args = 0..=1, value_name = "PATH")]
    pub log_file: Option<Option<PathBuf>>,
}

impl Cli {
    /// Build the run configuration. Returns `None` when no image is given.
    pub fn config(&self) -> Option<CleanerConfig> {
        let image = self.image.as_deref().filter(|image| !image.is_empty())?;

        Some(CleanerConfig {
            registry_url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            image: image.to_string(),
            image_version: self.image_version.clone(),
            keep: self.keep,
            dry_run: self.dry_run,
            on_parse_error: self.on_parse_error,
        })
    }

    /// Log file requested with `--log-file`, resolved against the data directory
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(crate::config::log_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;

    #[test]
    #[serial]
    fn config_from_short_flags() {
        let cli = Cli::parse_from([
            "registry-cleaner",
            "--url",
            "https://registry.example.com:5000",
            "-u",
            "ci",
            "-p",
            "secret",
            "-i",
            "development/nginx",
            "--iv",
            "1\\..*",
            "-k",
            "5",
            "-d",
        ]);

        assert_eq!(
            cli.config(),
            Some(CleanerConfig {
                registry_url: "https://registry.example.com:5000".to_string(),
                username: Some("ci".to_string()),
                password: Some("secret".to_string()),
                image: "development/nginx".to_string(),
                image_version: "1\\..*".to_string(),
                keep: 5,
                dry_run: true,
                on_parse_error: ParseFailurePolicy::Skip,
            })
        );
    }

    #[test]
    #[serial]
    fn config_from_long_flags() {
        let cli = Cli::parse_from([
            "registry-cleaner",
            "--image",
            "app",
            "--imageversion",
            ".*-rc.*",
            "--keep",
            "0",
            "--dryrun",
            "--on-parse-error",
            "abort",
        ]);
        let config = cli.config().unwrap();

        assert_eq!(config.image_version, ".*-rc.*");
        assert_eq!(config.keep, 0);
        assert!(config.dry_run);
        assert_eq!(config.on_parse_error, ParseFailurePolicy::Abort);
    }

    #[test]
    #[serial]
    fn config_is_none_without_image() {
        let cli = Cli::parse_from(["registry-cleaner", "--keep", "2"]);

        assert_eq!(cli.config(), None);
    }

    #[test]
    #[serial]
    fn config_is_none_for_empty_image() {
        let cli = Cli::parse_from(["registry-cleaner", "--image", ""]);

        assert_eq!(cli.config(), None);
    }

    #[test]
    #[serial]
    fn negative_keep_is_rejected() {
        let result = Cli::try_parse_from(["registry-cleaner", "-i", "app", "-k", "-1"]);

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn log_file_uses_given_path() {
        let cli = Cli::parse_from(["registry-cleaner", "--log-file", "/tmp/cleaner.log"]);

        assert_eq!(cli.log_file(), Some(PathBuf::from("/tmp/cleaner.log")));
    }

    #[test]
    #[serial]
    fn log_file_defaults_to_data_dir_when_flag_has_no_value() {
        let cli = Cli::parse_from(["registry-cleaner", "--log-file"]);

        assert_eq!(cli.log_file(), Some(crate::config::log_path()));
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("yes", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("no", false)]
    #[serial]
    fn dry_run_from_environment(#[case] value: &str, #[case] expected: bool) {
        unsafe { std::env::set_var("DRYRUN", value) };
        let result = Cli::try_parse_from(["registry-cleaner", "-i", "app"]);
        unsafe { std::env::remove_var("DRYRUN") };

        assert_eq!(result.unwrap().dry_run, expected);
    }
}
