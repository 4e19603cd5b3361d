use anyhow::Result;
use clap::ValueEnum;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

use crate::assemble::{MergeMode, SplitMode};
use crate::commands::merge::MergeOptions;
use crate::commands::split::SplitOptions;
use crate::commands::{info as info_cmd, merge as merge_cmd, split as split_cmd, toc as toc_cmd};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfInfoRequest {
    #[schemars(description = "PDF files or directories containing PDFs")]
    pub paths: Vec<String>,
    #[schemars(description = "Keep the given order instead of sorting by file name (default: false)")]
    #[serde(default)]
    pub keep_order: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files or directories containing PDFs")]
    pub paths: Vec<String>,
    #[schemars(description = "Output file name, '.pdf' is appended when missing (default: consolidado.pdf)")]
    #[serde(default = "default_merge_output")]
    pub output: String,
    #[schemars(description = "Pages taken from each document: all, first, last or selected (default: all)")]
    #[serde(default = "default_mode")]
    pub mode: String,
    #[schemars(description = "Page ranges per file name for 'selected' mode, e.g. {\"a.pdf\": \"1:3, 7\"}")]
    #[serde(default)]
    pub pages: HashMap<String, String>,
    #[schemars(description = "Keep the given order instead of sorting by file name (default: false)")]
    #[serde(default)]
    pub keep_order: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "PDF files or directories containing PDFs")]
    pub paths: Vec<String>,
    #[schemars(description = "Output file name without extension (default: separados)")]
    #[serde(default = "default_split_output")]
    pub output: String,
    #[schemars(description = "How to cut documents: all (one piece per page) or ranges (default: all)")]
    #[serde(default = "default_mode")]
    pub mode: String,
    #[schemars(description = "Page ranges per file name for 'ranges' mode, e.g. {\"a.pdf\": \"1:3, 7\"}")]
    #[serde(default)]
    pub pages: HashMap<String, String>,
    #[schemars(description = "Write one bookmarked PDF instead of a ZIP of parts (default: false)")]
    #[serde(default)]
    pub consolidate: bool,
    #[schemars(description = "Keep the given order instead of sorting by file name (default: false)")]
    #[serde(default)]
    pub keep_order: bool,
}

fn default_merge_output() -> String {
    "consolidado.pdf".to_string()
}

fn default_split_output() -> String {
    "separados".to_string()
}

fn default_mode() -> String {
    "all".to_string()
}

fn parse_mode<T: ValueEnum>(value: &str) -> Result<T, String> {
    T::from_str(value.trim(), true).map_err(|_| format!("Error: Unknown mode '{}'", value))
}

fn to_paths(paths: Vec<String>) -> Vec<PathBuf> {
    paths.into_iter().map(PathBuf::from).collect()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "List PDFs in processing order with their page counts and the range text selecting all their pages")]
    fn pdf_info(&self, Parameters(req): Parameters<PdfInfoRequest>) -> String {
        match info_cmd::execute(&to_paths(req.paths), req.keep_order) {
            Ok(summary) => to_json(&summary),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Merge PDFs into one file with a bookmark per document. Ranges use ':' for intervals and ',' between items, e.g. '1:3, 7'.")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        let mode: MergeMode = match parse_mode(&req.mode) {
            Ok(m) => m,
            Err(e) => return e,
        };
        let options = MergeOptions {
            inputs: to_paths(req.paths),
            output: req.output,
            mode,
            pages: req.pages,
            keep_order: req.keep_order,
        };
        match merge_cmd::execute(&options) {
            Ok(summary) => to_json(&summary),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Split PDFs into pages or ranges, returned as a ZIP of parts or one consolidated PDF with nested bookmarks")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let mode: SplitMode = match parse_mode(&req.mode) {
            Ok(m) => m,
            Err(e) => return e,
        };
        let options = SplitOptions {
            inputs: to_paths(req.paths),
            output: req.output,
            mode,
            pages: req.pages,
            consolidate: req.consolidate,
            keep_order: req.keep_order,
        };
        match split_cmd::execute(&options) {
            Ok(summary) => to_json(&summary),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Get the table of contents (bookmarks/outlines) from a PDF as structured data")]
    fn pdf_toc(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match toc_cmd::execute(&path) {
            Ok(flat) => {
                let result: Vec<TocEntryResult> = flat
                    .into_iter()
                    .map(|e| TocEntryResult {
                        title: e.title,
                        page: e.page,
                        level: e.level,
                    })
                    .collect();
                to_json(&result)
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TocEntryResult {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF merge and split tools. Use pdf_info to list documents and page counts, \
                 pdf_merge to combine documents, pdf_split to cut them into pages or ranges, \
                 and pdf_toc to inspect the bookmarks of a result."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    info!("starting MCP server on stdio");

    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
