//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the council.

use clap::{Parser, Subcommand};

use crate::config::Provider;
use crate::persona::PersonaVoice;

/// Council of Elders - multi-persona debate over a local LLM
///
/// Seven expert personas debate your question over several rounds, then
/// Merlin synthesizes their views. The debate is exported as a PDF report.
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments of `council debate`
#[derive(clap::Args, Debug, Clone)]
pub struct DebateArgs {
    /// Question or topic for the council
    pub question: String,

    /// Number of debate rounds (1-100)
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// Model identifier (defaults to the configured or first discovered model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "COUNCIL_CONFIG")]
    pub config: Option<String>,

    /// Directory for exported reports
    #[arg(short = 'o', long)]
    pub output_dir: Option<String>,

    /// Persona framing: worldview or technical
    #[arg(long)]
    pub voice: Option<PersonaVoice>,

    /// Ask personas one at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Skip the PDF report
    #[arg(long)]
    pub no_pdf: bool,

    /// Also write a JSON transcript
    #[arg(long)]
    pub json: bool,

    /// Chat backend: openai or mock
    #[arg(long)]
    pub provider: Option<Provider>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Put a question to the council
    Debate(DebateArgs),

    /// List models available for debates
    Models {
        /// Path to configuration file
        #[arg(short, long, env = "COUNCIL_CONFIG")]
        config: Option<String>,
    },

    /// Show the council members and the synthesizer
    Personas {
        /// Persona framing to show
        #[arg(long)]
        voice: Option<PersonaVoice>,

        /// Path to configuration file
        #[arg(short, long, env = "COUNCIL_CONFIG")]
        config: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn debate(args: &[&str]) -> DebateArgs {
        let argv = ["council", "debate"].into_iter().chain(args.iter().copied());
        match Cli::parse_from(argv).command {
            Commands::Debate(args) => args,
            other => panic!("Expected Debate command, got {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_debate_defaults() {
        let args = debate(&["Is Rust worth it?"]);
        assert_eq!(args.question, "Is Rust worth it?");
        assert!(args.rounds.is_none());
        assert!(args.model.is_none());
        assert!(args.voice.is_none());
        assert!(!args.sequential);
        assert!(!args.no_pdf);
        assert!(!args.json);
    }

    #[test]
    fn test_debate_with_options() {
        let args = debate(&[
            "Q?",
            "-r",
            "3",
            "-m",
            "llama3",
            "-o",
            "/tmp/out",
            "--voice",
            "technical",
            "--sequential",
            "--no-pdf",
            "--json",
            "--provider",
            "mock",
        ]);
        assert_eq!(args.rounds, Some(3));
        assert_eq!(args.model.as_deref(), Some("llama3"));
        assert_eq!(args.output_dir.as_deref(), Some("/tmp/out"));
        assert_eq!(args.voice, Some(PersonaVoice::Technical));
        assert!(args.sequential);
        assert!(args.no_pdf);
        assert!(args.json);
        assert_eq!(args.provider, Some(Provider::Mock));
    }

    #[test]
    fn test_round_range_is_not_enforced_by_parser() {
        assert_eq!(debate(&["Q?", "--rounds", "0"]).rounds, Some(0));
        assert_eq!(debate(&["Q?", "--rounds", "101"]).rounds, Some(101));
    }

    #[test]
    fn test_empty_question_parses() {
        assert_eq!(debate(&[""]).question, "");
    }

    #[test]
    fn test_invalid_voice_rejected() {
        let result = Cli::try_parse_from(["council", "debate", "Q?", "--voice", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_personas_command() {
        let cli = Cli::parse_from(["council", "personas", "--voice", "technical"]);
        match cli.command {
            Commands::Personas { voice, .. } => assert_eq!(voice, Some(PersonaVoice::Technical)),
            _ => panic!("Expected Personas command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["council", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["council", "models", "--quiet"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["council", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
