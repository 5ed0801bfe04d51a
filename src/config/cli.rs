use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "deprompt")]
#[command(about = "Improve prompts for a target AI model through a completion API")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the web UI and JSON API
    Serve {
        #[arg(long, env = "DEPROMPT_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value = "8000")]
        port: u16,
    },
    /// Improve a single prompt and print the result
    Improve {
        /// The prompt to improve
        prompt: String,

        /// Target model profile (e.g. gpt-4o, claude-3.5-sonnet)
        #[arg(short, long)]
        target_model: Option<String>,

        /// Extra context about the use case
        #[arg(short, long)]
        context: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl CliConfig {
    pub fn bind_addr(host: &str, port: u16) -> String {
        format!("{}:{}", host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_improve_command() {
        let config = CliConfig::parse_from([
            "deprompt",
            "improve",
            "write a poem",
            "--target-model",
            "gpt-4o",
        ]);
        match config.command {
            Command::Improve {
                prompt,
                target_model,
                context,
                json,
            } => {
                assert_eq!(prompt, "write a poem");
                assert_eq!(target_model.as_deref(), Some("gpt-4o"));
                assert!(context.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_port() {
        let config = CliConfig::parse_from(["deprompt", "-v", "serve", "--port", "9090"]);
        assert!(config.verbose);
        match config.command {
            Command::Serve { port, .. } => assert_eq!(port, 9090),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
