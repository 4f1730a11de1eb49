use std::path::PathBuf;

use aidl_check::LoadOptions;
use aidl_parser::ParserOptions;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "aidl")]
#[command(about = "Android Interface Definition Language front end")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Import search root, may be repeated
    #[arg(short = 'I', long = "include", value_name = "DIR", global = true)]
    pub include: Vec<PathBuf>,

    /// Preprocessed declaration file, may be repeated
    #[arg(short = 'p', long = "preprocessed", value_name = "FILE", global = true)]
    pub preprocessed: Vec<PathBuf>,

    /// Reject unstructured parcelables
    #[arg(long, global = true)]
    pub structured: bool,

    /// Render diagnostics with source excerpts
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn load_options(&self, inputs: &[PathBuf]) -> LoadOptions {
        LoadOptions {
            import_paths: self.include.clone(),
            preprocessed_files: self.preprocessed.clone(),
            input_files: inputs.to_vec(),
            structured: self.structured,
            parser: ParserOptions::default(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate .aidl files
    Check {
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Write a dependency file
        #[arg(short = 'd', long = "depfile", value_name = "FILE", requires = "output")]
        depfile: Option<PathBuf>,

        /// Dependency file in ninja format
        #[arg(long, requires = "depfile")]
        ninja: bool,

        /// Target named in the dependency file
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,
    },

    /// Write a preprocessed declaration file
    Preprocess {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Write the API of the inputs, grouped by package
    DumpApi {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from([
            "aidl", "-I", "inc", "--include", "more", "check", "a/IFoo.aidl", "-d", "out.d", "-o", "IFoo.java",
            "--structured",
        ]);
        assert_eq!(cli.global.include, [PathBuf::from("inc"), PathBuf::from("more")]);
        assert!(cli.global.structured);
        match cli.command {
            Command::Check { inputs, depfile, ninja, output } => {
                assert_eq!(inputs, [PathBuf::from("a/IFoo.aidl")]);
                assert_eq!(depfile, Some(PathBuf::from("out.d")));
                assert!(!ninja);
                assert_eq!(output.as_deref(), Some("IFoo.java"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_depfile_requires_output() {
        assert!(Cli::try_parse_from(["aidl", "check", "a.aidl", "-d", "out.d"]).is_err());
        assert!(Cli::try_parse_from(["aidl", "check", "a.aidl", "--ninja"]).is_err());
    }

    #[test]
    fn test_load_options() {
        let cli = Cli::parse_from(["aidl", "-p", "framework.aidl", "dump-api", "-o", "api.txt", "a/IFoo.aidl"]);
        let Command::DumpApi { inputs, .. } = &cli.command else {
            panic!("expected dump-api");
        };
        let options = cli.global.load_options(inputs);
        assert_eq!(options.preprocessed_files, [PathBuf::from("framework.aidl")]);
        assert_eq!(options.input_files, [PathBuf::from("a/IFoo.aidl")]);
        assert!(!options.structured);
    }
}
