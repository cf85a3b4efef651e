use crate::llm::types::FormatHint;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `answer-relay` - resilient multi-provider answering for support consoles.
#[derive(Parser, Debug)]
#[command(name = "answer-relay")]
#[command(version)]
#[command(about = "Answer questions through a fallback chain of LLM providers.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question, falling back across providers
    Ask {
        /// The question to answer
        question: String,

        /// Knowledge-base context to ground the answer
        #[arg(short, long)]
        context: Option<String>,

        /// JSON file with prior turns: [{"role":"user","content":"..."}]
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// Answer layout (plain, markdown)
        #[arg(short, long, default_value = "plain")]
        format: FormatHint,

        /// Run the provider handshake first and order providers by availability
        #[arg(long)]
        probe: bool,
    },

    /// Show provider configuration, optionally probing availability
    Status {
        /// Probe every configured provider
        #[arg(long)]
        probe: bool,
    },

    /// Deliver a message through the messaging gateway
    Send {
        /// Phone number, group id, or JID
        #[arg(long)]
        to: String,

        /// Image or video to attach (repeatable)
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,

        /// Operator name recorded with the message
        #[arg(long)]
        agent: Option<String>,

        /// Message text
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_format_and_flags() {
        let cli = Cli::try_parse_from([
            "answer-relay",
            "ask",
            "How do I reset my password?",
            "--format",
            "markdown",
            "--probe",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask {
                question,
                format,
                probe,
                context,
                ..
            } => {
                assert_eq!(question, "How do I reset my password?");
                assert_eq!(format, FormatHint::Markdown);
                assert!(probe);
                assert!(context.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn send_collects_attachments() {
        let cli = Cli::try_parse_from([
            "answer-relay",
            "send",
            "--to",
            "5511987654321",
            "--attach",
            "a.png",
            "--attach",
            "b.mp4",
            "See attached",
        ])
        .unwrap();
        let Commands::Send { attachments, .. } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(attachments.len(), 2);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["answer-relay", "ask", "q", "--format", "html"]).is_err());
    }
}
