//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - tools: print the tool catalog
//! - call: run one tool invocation
//! - chat: multi-turn chat over stdin
//! - generate: structured JSON generation
//! - agent: function-calling loop over the tool catalog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toolbelt - filesystem, image and shell tools for generative-AI agents
#[derive(Parser, Debug)]
#[command(name = "toolbelt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every tool schema as JSON
    Tools {
        /// Print Gemini function declarations instead
        #[arg(short, long)]
        declarations: bool,
    },

    /// Execute one tool and print its JSON result
    Call {
        /// Tool name from the catalog
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },

    /// Chat with the model, one line per message
    Chat {
        /// Model override
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Generate JSON matching a schema
    Generate {
        /// JSON schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Prompt text
        prompt: String,
    },

    /// Let the model use the tools to carry out a prompt
    Agent {
        /// Prompt text
        prompt: String,

        /// Turn limit override
        #[arg(short = 't', long)]
        max_turns: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["toolbelt"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["toolbelt", "-v", "tools"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["toolbelt", "tools", "--config", "/tmp/toolbelt.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/toolbelt.yml")));
    }

    #[test]
    fn test_tools_command() {
        let cli = Cli::try_parse_from(["toolbelt", "tools", "-d"]).unwrap();
        assert!(matches!(cli.command, Commands::Tools { declarations: true }));
    }

    #[test]
    fn test_call_command() {
        let cli = Cli::try_parse_from(["toolbelt", "call", "read_file", "--args", r#"{"path":"a.txt"}"#]).unwrap();
        match cli.command {
            Commands::Call { tool, args } => {
                assert_eq!(tool, "read_file");
                assert_eq!(args.as_deref(), Some(r#"{"path":"a.txt"}"#));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_call_without_args() {
        let cli = Cli::try_parse_from(["toolbelt", "call", "get_directory_tree"]).unwrap();
        assert!(matches!(cli.command, Commands::Call { args: None, .. }));
    }

    #[test]
    fn test_generate_requires_schema() {
        assert!(Cli::try_parse_from(["toolbelt", "generate", "a recipe"]).is_err());

        let cli = Cli::try_parse_from(["toolbelt", "generate", "-s", "recipe.json", "a recipe"]).unwrap();
        match cli.command {
            Commands::Generate { schema, prompt } => {
                assert_eq!(schema, PathBuf::from("recipe.json"));
                assert_eq!(prompt, "a recipe");
            }
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_agent_command() {
        let cli = Cli::try_parse_from(["toolbelt", "agent", "tidy up", "-t", "4"]).unwrap();
        assert!(matches!(cli.command, Commands::Agent { max_turns: Some(4), .. }));
    }

    #[test]
    fn test_chat_model_override() {
        let cli = Cli::try_parse_from(["toolbelt", "chat", "--model", "gemini-2.5-pro"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { model: Some(ref m) } if m == "gemini-2.5-pro"));
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
