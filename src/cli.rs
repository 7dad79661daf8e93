// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Parsed once, then split into the target and immutable client options.

use clap::{ArgAction, Parser};
use gssh::config::{ClientOptions, EchoPolicy, Target, TargetError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gssh")]
#[command(about = "Run a command or shell on a remote host over SSH with password authentication")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Force pseudo-terminal allocation
    #[arg(short = 't')]
    pub tty: bool,

    /// Password to authenticate with
    #[arg(short = 'p', value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Password file (INI with a [passwords] section)
    #[arg(short = 'f', value_name = "CONFIG_PATH")]
    pub password_file: Option<PathBuf>,

    /// Pass the local environment to the remote command
    #[arg(short = 'e')]
    pub pass_env: bool,

    /// Kill the remote command after this many seconds (0 disables)
    #[arg(short = 'w', value_name = "TIMEOUT_SECONDS", default_value_t = 0)]
    pub timeout: u64,

    /// Remote echo when a PTY is allocated
    #[arg(long, value_enum, default_value_t = EchoPolicy::Auto)]
    pub echo: EchoPolicy,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Remote target: [user@]hostname[:port]
    #[arg(value_name = "TARGET", value_parser = parse_target)]
    pub target: Target,

    /// Command to run; a login shell is started when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// Target with the remote command attached.
    pub fn target(&self) -> Target {
        self.target.clone().with_command(&self.command)
    }

    pub fn options(&self) -> ClientOptions {
        ClientOptions {
            force_tty: self.tty,
            pass_env: self.pass_env,
            echo: self.echo,
            password_file: self.password_file.clone(),
            ..Default::default()
        }
        .timeout_secs(self.timeout)
    }
}

fn parse_target(s: &str) -> Result<Target, TargetError> {
    Target::parse(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn splits_target_and_command() {
        let cli = Cli::try_parse_from(["gssh", "-w", "5", "bob@host:2200", "ls", "-l"]).unwrap();
        let target = cli.target();
        assert_eq!(target.user, "bob");
        assert_eq!(target.port, 2200);
        assert_eq!(target.command.as_deref(), Some("ls -l"));
        assert_eq!(cli.options().timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "gssh", "-t", "-e", "--echo", "off", "-f", "/tmp/pw", "alice@host",
        ])
        .unwrap();
        let opts = cli.options();
        assert!(opts.force_tty);
        assert!(opts.pass_env);
        assert_eq!(opts.echo, EchoPolicy::Off);
        assert_eq!(opts.password_file, Some(PathBuf::from("/tmp/pw")));
        assert_eq!(opts.timeout, None);
        assert_eq!(cli.target().command, None);
    }

    #[test]
    fn rejects_malformed_target() {
        assert!(Cli::try_parse_from(["gssh", "bob@host:notaport"]).is_err());
        assert!(Cli::try_parse_from(["gssh"]).is_err());
    }
}
