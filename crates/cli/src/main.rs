//! CLI tool for appending slides to and exporting text from Google Slides.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slides_api::{
    CredentialProvider, HttpSlidesClient, InstalledAppFlow, SlideMutator, SlidesApi,
    TokenFileProvider, DEFAULT_TEXT_BOX_ID,
};
use slides_core::{ConsoleReport, MarkdownTable, ReportBuilder, TextExtractor};
use std::path::{Path, PathBuf};

/// Append slides to and extract text from a Google Slides presentation.
#[derive(Parser, Debug)]
#[command(name = "slides-text")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Presentation to operate on
    #[arg(short, long, env = "SLIDES_PRESENTATION_ID")]
    presentation_id: String,

    /// Cached OAuth token file (created on first authorization)
    #[arg(short, long, env = "SLIDES_TOKEN_FILE", default_value = "token.json")]
    token: PathBuf,

    /// OAuth client secret file, used when (re-)authorization is needed
    #[arg(short, long, env = "SLIDES_CLIENT_SECRET", default_value = "credentials.json")]
    client_secret: PathBuf,

    /// Print the authorization URL instead of opening a browser
    #[arg(long)]
    no_browser: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a new first slide with a text box, then list every element's text
    AddSlide {
        /// Text to put in the new text box
        #[arg(long)]
        text: String,

        /// Object id for the new text box (must be unused in the presentation)
        #[arg(long, default_value = DEFAULT_TEXT_BOX_ID)]
        text_box_id: String,
    },

    /// Insert text into an existing shape or table cell
    InsertText {
        /// Object id of the target shape
        #[arg(long)]
        shape_id: String,

        /// Text to insert
        #[arg(long)]
        text: String,

        /// Zero-based position, in UTF-16 code units, to insert at
        #[arg(long, default_value_t = 0)]
        insertion_index: u32,
    },

    /// Write a Markdown table of every slide element and its text
    Report {
        /// Output file, overwritten if it exists
        #[arg(short, long, default_value = "slides.md")]
        output: PathBuf,

        /// Print the table to stdout instead of writing a file
        #[arg(long)]
        print: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let flow = InstalledAppFlow::new(&args.client_secret)?.with_open_browser(!args.no_browser);
    let credentials = TokenFileProvider::new(&args.token, flow)
        .load_or_refresh_credentials()
        .with_context(|| format!("Failed to obtain credentials via {}", args.token.display()))?;
    let api = HttpSlidesClient::new(credentials.access_token()?)?;

    let outcome = match &args.command {
        Command::AddSlide { text, text_box_id } => {
            add_slide(&api, &args.presentation_id, text_box_id, text)
        }
        Command::InsertText {
            shape_id,
            text,
            insertion_index,
        } => insert_text(&api, &args.presentation_id, shape_id, text, *insertion_index),
        Command::Report { output, print } => {
            report(&api, &args.presentation_id, output, *print)
        }
    };

    // Remote API failures are reported and the run ends normally.
    match outcome {
        Err(e) if e.is_remote_api() => {
            println!("{}", e);
            Ok(())
        }
        other => other.map_err(anyhow::Error::from),
    }
}

/// Add a slide with text, then print every element's text to the console.
fn add_slide(
    api: &dyn SlidesApi,
    presentation_id: &str,
    text_box_id: &str,
    text: &str,
) -> slides_core::Result<()> {
    let slide_id = SlideMutator::new(api).add_slide_with_text(presentation_id, text_box_id, text)?;
    println!("New slide created with ID: {}", slide_id);

    let presentation = api.get_presentation(presentation_id)?;
    let rows = ReportBuilder::new(TextExtractor::new()).build(&presentation);
    print!(
        "{}",
        ConsoleReport::new().render(presentation.slide_count(), &rows)
    );

    Ok(())
}

/// Insert text into one existing shape.
fn insert_text(
    api: &dyn SlidesApi,
    presentation_id: &str,
    shape_id: &str,
    text: &str,
    insertion_index: u32,
) -> slides_core::Result<()> {
    api.insert_text(presentation_id, shape_id, text, insertion_index)?;
    println!(
        "Inserted text into {} at index {}.",
        shape_id, insertion_index
    );
    Ok(())
}

/// Fetch the presentation and write its element table.
fn report(
    api: &dyn SlidesApi,
    presentation_id: &str,
    output: &Path,
    print: bool,
) -> slides_core::Result<()> {
    let presentation = api.get_presentation(presentation_id)?;
    let rows = ReportBuilder::new(TextExtractor::new().with_trim(true)).build(&presentation);
    let table = MarkdownTable::new();

    if print {
        println!("{}", table.render(&rows));
    } else {
        table.write_to(output, &rows)?;
        println!("Saved Markdown table to '{}'.", output.display());
    }

    Ok(())
}
