use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

/// Generate Go method stubs that make a type satisfy an interface
#[derive(Parser, Debug)]
#[command(name = "goimpl", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print stubs for the interface methods the receiver is missing
    Impl {
        /// Receiver type, e.g. `github.com/org/proj.MyType` or `*MyType`
        #[arg(value_name = "RECEIVER")]
        receiver: String,

        /// Interface, e.g. `io.ReadWriter` or `net/http.Handler`
        #[arg(value_name = "INTERFACE")]
        iface: String,

        #[command(flatten)]
        env: EnvArgs,
    },
}

/// Overrides for the Go environment
#[derive(Args, Debug, Default, Clone)]
pub struct EnvArgs {
    /// Directory of the local package (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Go installation root (default: $GOROOT, then `go env GOROOT`)
    #[arg(long, value_name = "PATH")]
    pub goroot: Option<PathBuf>,

    /// GOPATH entry; repeat for several (default: $GOPATH or ~/go)
    #[arg(long, value_name = "PATH")]
    pub gopath: Vec<PathBuf>,

    /// Comma-separated build tags
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Target operating system for build constraints
    #[arg(long, value_name = "GOOS")]
    pub goos: Option<String>,

    /// Target architecture for build constraints
    #[arg(long, value_name = "GOARCH")]
    pub goarch: Option<String>,
}

impl EnvArgs {
    /// Applies the flags on top of `base`.
    pub fn apply(self, mut base: Config) -> Config {
        if let Some(dir) = self.dir {
            base.dir = dir;
        }
        if let Some(goroot) = self.goroot {
            base.goroot = Some(goroot);
        }
        if !self.gopath.is_empty() {
            base.gopath = self.gopath;
        }
        if let Some(goos) = self.goos {
            base.goos = goos;
        }
        if let Some(goarch) = self.goarch {
            base.goarch = goarch;
        }
        base.tags.extend(self.tags.into_iter().filter(|t| !t.is_empty()));
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn impl_with_flags() {
        let cli = Cli::try_parse_from([
            "goimpl",
            "impl",
            "--tags",
            "a,b",
            "--goos",
            "windows",
            "testdata.MyType",
            "io.Writer",
        ])
        .unwrap();
        let Commands::Impl { receiver, iface, env } = cli.command;
        assert_eq!(receiver, "testdata.MyType");
        assert_eq!(iface, "io.Writer");
        let cfg = env.apply(Config::new("/w"));
        assert_eq!(cfg.tags, ["a", "b"]);
        assert_eq!(cfg.goos, "windows");
        assert_eq!(cfg.dir, PathBuf::from("/w"));
    }

    #[test]
    fn missing_interface_is_a_usage_error() {
        let err = Cli::try_parse_from(["goimpl", "impl", "MyType"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
