use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dirdb",
    about = "DirDB — a hierarchical JSON store with a filesystem layout",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory
    #[arg(long, global = true, default_value = ".")]
    pub root: String,

    /// Path segment delimiter
    #[arg(short, long, global = true, default_value = ".")]
    pub delimiter: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List child names (directories marked with a trailing slash)
    Ls(LsArgs),
    /// Print the leaf value at a path
    Get(GetArgs),
    /// Write a JSON leaf value at a path
    Set(SetArgs),
    /// Remove the node at a path, recursively for directories
    Rm(RmArgs),
    /// Create a directory chain
    Mkdir(MkdirArgs),
    /// Export a subtree as pretty-printed JSON
    Export(ExportArgs),
    /// Deep-merge JSON from a file or stdin into the store
    Import(ImportArgs),
    /// Exercise the store against the in-memory and filesystem backends
    Selftest(SelftestArgs),
}

#[derive(Args)]
pub struct LsArgs {
    pub path: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub path: String,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: String,
    /// JSON value; anything that does not parse is stored as a string
    pub value: String,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: String,
}

#[derive(Args)]
pub struct MkdirArgs {
    pub path: String,
}

#[derive(Args)]
pub struct ExportArgs {
    pub path: Option<String>,
    #[arg(long, default_value = "2")]
    pub indent: usize,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to read; stdin when omitted
    pub file: Option<String>,
}

#[derive(Args)]
pub struct SelftestArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ls() {
        let cli = Cli::try_parse_from(["dirdb", "ls"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.path, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_ls_with_path() {
        let cli = Cli::try_parse_from(["dirdb", "ls", "users.michael"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.path, Some("users.michael".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["dirdb", "get", "users.michael.age"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.path, "users.michael.age");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_set() {
        let cli = Cli::try_parse_from(["dirdb", "set", "users.michael.age", "29"]).unwrap();
        if let Command::Set(args) = cli.command {
            assert_eq!(args.path, "users.michael.age");
            assert_eq!(args.value, "29");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_root_and_delimiter() {
        let cli =
            Cli::try_parse_from(["dirdb", "--root", "/tmp/db", "-d", "/", "ls"]).unwrap();
        assert_eq!(cli.root, "/tmp/db");
        assert_eq!(cli.delimiter, "/");
    }

    #[test]
    fn parse_export_indent() {
        let cli = Cli::try_parse_from(["dirdb", "export", "--indent", "4", "users"]).unwrap();
        if let Command::Export(args) = cli.command {
            assert_eq!(args.indent, 4);
            assert_eq!(args.path, Some("users".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_import_from_stdin() {
        let cli = Cli::try_parse_from(["dirdb", "import"]).unwrap();
        if let Command::Import(args) = cli.command {
            assert_eq!(args.file, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_selftest() {
        let cli = Cli::try_parse_from(["dirdb", "selftest"]).unwrap();
        assert!(matches!(cli.command, Command::Selftest(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["dirdb", "--verbose", "ls"]).unwrap();
        assert!(cli.verbose);
    }
}
