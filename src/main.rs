use std::path::PathBuf;

use clap::{Parser, Subcommand};
use course_ingest::io::excel_write;
use course_ingest::ingest;
use course_ingest::model::CourseUpload;
use course_ingest::store::JsonFileStore;
use course_ingest::{Result, ToolError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("course_ingest=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Submit(args) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            let payload = match &args.file {
                Some(path) => Some(ingest::read_payload(path)?),
                None => None,
            };
            let upload = CourseUpload {
                payload,
                title: args.title,
                description: args.description,
                banner_image: args.banner_image,
            };
            print_json(&ingest::submit_course(&mut store, upload)?)
        }
        Command::List => {
            let store = JsonFileStore::open(&cli.store)?;
            print_json(&ingest::list_courses(&store)?)
        }
        Command::Template(args) => {
            excel_write::write_template(&args.output)?;
            tracing::info!(output = %args.output.display(), "template written");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn course spreadsheets into stored module documents."
)]
struct Cli {
    /// JSON file holding the stored course documents.
    #[arg(
        long,
        global = true,
        env = "COURSE_INGEST_STORE",
        default_value = "courses.json"
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a course workbook, replacing any course with the same identifier.
    Submit(SubmitArgs),
    /// List every stored course.
    List,
    /// Write an empty course workbook with the expected header row.
    Template(TemplateArgs),
}

#[derive(clap::Args)]
struct SubmitArgs {
    /// Course workbook (.xlsx); only the first sheet is read.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Course title (required).
    #[arg(long)]
    title: Option<String>,

    /// Course description (required).
    #[arg(long)]
    description: Option<String>,

    /// Banner image reference such as a URL (required).
    #[arg(long)]
    banner_image: Option<String>,
}

#[derive(clap::Args)]
struct TemplateArgs {
    /// Output file path.
    #[arg(long)]
    output: PathBuf,
}
