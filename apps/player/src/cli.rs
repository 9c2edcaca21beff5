use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cuesync-player",
    version,
    about = "Replay a scripted call in lockstep with its audio clock"
)]
pub struct Cli {
    /// Cue script (JSON). Defaults to the built-in charger support call.
    #[arg(long, global = true)]
    pub script: Option<PathBuf>,

    /// Engine configuration (JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings database. Defaults to the platform data directory.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Use this offset for the session without touching the stored one.
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Keep the offset in memory only.
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay the script in real time.
    Play {
        /// Playback speed multiplier.
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
    },
    /// Print the resolved snapshot at a raw transport time.
    Inspect {
        #[arg(long, allow_hyphen_values = true)]
        at: f64,
    },
    /// Print the active script as JSON.
    ExportScript,
    /// Report authoring problems in the script.
    Validate,
    /// Manage the calibration offset.
    Offset {
        #[command(subcommand)]
        action: OffsetCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum OffsetCommand {
    Get,
    Set {
        #[arg(allow_hyphen_values = true)]
        seconds: f64,
    },
    Adjust {
        #[arg(allow_hyphen_values = true)]
        delta: f64,
    },
    /// Back to the shipped default.
    Reset,
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_set_negative() {
        let cli = Cli::try_parse_from(["cuesync-player", "offset", "set", "-0.3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Offset {
                action: OffsetCommand::Set { seconds }
            } if seconds == -0.3
        ));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "cuesync-player",
            "inspect",
            "--at",
            "12.5",
            "--no-persist",
            "--offset",
            "-0.5",
        ])
        .unwrap();
        assert!(cli.no_persist);
        assert_eq!(cli.offset, Some(-0.5));
        assert!(matches!(cli.command, Command::Inspect { at } if at == 12.5));
    }

    #[test]
    fn test_play_default_rate() {
        let cli = Cli::try_parse_from(["cuesync-player", "play"]).unwrap();
        assert!(matches!(cli.command, Command::Play { rate } if rate == 1.0));
    }
}
