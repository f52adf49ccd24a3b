pub mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sift_cli::ConfigArgs;
use sift_providers::ListKind;

#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArgs,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Runs one aggregate search and prints the ranked results.
	Search {
		#[arg(value_name = "QUERY")]
		query: String,
	},
	/// Reads queries from stdin, one per line, and prints every committed result set.
	Watch,
	/// Loads one page of a server-side listing through the page cache.
	Page {
		#[arg(value_name = "KIND")]
		kind: ListKind,
		#[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
		page: Option<u32>,
		#[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
		page_size: Option<u32>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config.config)?;

	init_tracing(args.config.log_level.as_deref().unwrap_or(&config.service.log_level));

	match args.command {
		Command::Search { query } => commands::search(&config, query).await,
		Command::Watch => commands::watch(&config).await,
		Command::Page { kind, page, page_size } =>
			commands::page(&config, kind, page, page_size).await,
	}
}

fn init_tracing(level: &str) {
	let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn parses_page_command() {
		let args = Args::try_parse_from([
			"sift-search",
			"-c",
			"sift.toml",
			"page",
			"Documents",
			"--page",
			"2",
			"--page-size",
			"5",
		])
		.expect("parse failed");

		assert_eq!(args.config.config.to_str(), Some("sift.toml"));

		match args.command {
			Command::Page { kind, page, page_size } => {
				assert_eq!(kind, ListKind::Documents);
				assert_eq!(page, Some(2));
				assert_eq!(page_size, Some(5));
			},
			other => panic!("Unexpected command: {other:?}"),
		}
	}

	#[test]
	fn rejects_zero_page_size_and_unknown_kinds() {
		assert!(
			Args::try_parse_from(["sift-search", "-c", "x.toml", "page", "chunks", "--page-size", "0"])
				.is_err()
		);
		assert!(Args::try_parse_from(["sift-search", "-c", "x.toml", "page", "widgets"]).is_err());
	}

	#[test]
	fn log_level_override_is_optional() {
		let args =
			Args::try_parse_from(["sift-search", "-c", "x.toml", "--log-level", "debug", "watch"])
				.expect("parse failed");

		assert_eq!(args.config.log_level.as_deref(), Some("debug"));
		assert!(matches!(args.command, Command::Watch));
	}
}
