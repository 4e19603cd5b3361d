use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::assemble::{MergeMode, SplitMode};

#[derive(Parser)]
#[command(name = "pdfmix")]
#[command(about = "Merge and split PDF files by page ranges, with MCP server support")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// List documents in processing order with their page counts
    Info {
        /// PDF files or directories to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Keep the order given instead of sorting by name
        #[arg(long)]
        keep_order: bool,
    },

    /// Combine several PDFs into one, with a bookmark per document
    Merge {
        /// PDF files or directories to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file name (".pdf" is appended when missing)
        #[arg(short, long, default_value = "consolidado.pdf")]
        output: String,

        /// Which pages each document contributes
        #[arg(short, long, value_enum, default_value_t = MergeMode::All)]
        mode: MergeMode,

        /// Page ranges for one file (e.g., "report.pdf=1:3, 7"), repeatable
        #[arg(short, long = "pages", value_name = "FILE=RANGES")]
        pages: Vec<String>,

        /// Keep the order given instead of sorting by name
        #[arg(long)]
        keep_order: bool,
    },

    /// Cut PDFs into pieces, zipped or consolidated into one PDF
    Split {
        /// PDF files or directories to split
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file name (extension is added from the output kind)
        #[arg(short, long, default_value = "separados")]
        output: String,

        /// One piece per page, or one per selected range
        #[arg(short, long, value_enum, default_value_t = SplitMode::All)]
        mode: SplitMode,

        /// Page ranges for one file (e.g., "report.pdf=1:3, 7"), repeatable
        #[arg(short, long = "pages", value_name = "FILE=RANGES")]
        pages: Vec<String>,

        /// Write a single bookmarked PDF instead of a ZIP of parts
        #[arg(short, long)]
        consolidate: bool,

        /// Keep the order given instead of sorting by name
        #[arg(long)]
        keep_order: bool,
    },

    /// Print table of contents / bookmarks
    Toc {
        /// PDF file to inspect
        path: PathBuf,
    },
}
