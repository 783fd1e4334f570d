//! Command-line interface for linkschema

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use linkschema::{documents, Schema, SchemaConfig};
    use std::path::PathBuf;
    use std::process::ExitCode;

    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Validate a document's cross-references against a link schema
        Validate {
            /// Link schema configuration (JSON)
            #[arg(short, long)]
            schema: PathBuf,

            /// XML document to validate
            document: PathBuf,
        },
        /// Print a summary of a link schema
        Inspect {
            /// Link schema configuration (JSON)
            #[arg(short, long)]
            schema: PathBuf,
        },
    }

    fn load_schema(path: &PathBuf) -> linkschema::Result<Schema> {
        SchemaConfig::from_json_file(path)?.into_schema()
    }

    fn run() -> linkschema::Result<bool> {
        let args = Args::parse();

        match args.command {
            Command::Validate { schema, document } => {
                let schema = load_schema(&schema)?;
                let text = documents::read_document_text(&document)?;
                let doc = documents::parse_document(&text)?;

                let findings = schema.validate(&doc);
                for finding in &findings {
                    eprintln!("{}", finding);
                }
                Ok(findings.is_empty())
            }
            Command::Inspect { schema } => {
                let schema = load_schema(&schema)?;
                print!("{}", schema.summary());
                Ok(true)
            }
        }
    }

    pub fn main() -> ExitCode {
        env_logger::init();

        match run() {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(1),
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::from(2)
            }
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
