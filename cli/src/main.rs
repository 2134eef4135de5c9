#![warn(clippy::nursery, clippy::pedantic)]
#![deny(unsafe_code)]

use std::io::{Read as _, Write as _};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use atty::Stream;
use clap::Parser;
use pastebox_common::{
    CreatePasteRequest, CreatePasteResponse, ExpiresIn, Paste, PasteSummary, Url, ViewLimit,
    API_ENDPOINT,
};
use reqwest::blocking::Client;
use reqwest::StatusCode;

#[derive(Parser)]
struct Opts {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Parser)]
enum Action {
    /// Upload a new paste and print its shareable URL.
    Upload {
        /// The Pastebox instance to upload to.
        url: Url,
        /// Display title; blank becomes "Untitled".
        #[clap(short, long)]
        title: Option<String>,
        /// How long the paste stays readable (never, 10m, 1h, 1d, 7d, 30d).
        #[clap(short, long, default_value = "never")]
        expires_in: ExpiresIn,
        /// View cap ("unlimited" or a positive number; 1 burns after reading).
        #[clap(short, long, default_value = "unlimited")]
        max_views: ViewLimit,
        /// Mark the paste as private.
        #[clap(short, long)]
        private: bool,
        /// File to upload; stdin when omitted.
        path: Option<PathBuf>,
    },
    /// Fetch a paste and print its content. Each fetch counts as a view.
    Download {
        /// The Pastebox instance to download from.
        url: Url,
        id: String,
    },
    /// Delete a paste.
    Delete {
        /// The Pastebox instance to delete from.
        url: Url,
        id: String,
    },
    /// List stored pastes, newest first.
    List {
        /// The Pastebox instance to list.
        url: Url,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    match opts.action {
        Action::Upload {
            url,
            title,
            expires_in,
            max_views,
            private,
            path,
        } => handle_upload(&url, title, expires_in, max_views, private, path),
        Action::Download { url, id } => handle_download(&url, &id),
        Action::Delete { url, id } => handle_delete(&url, &id),
        Action::List { url } => handle_list(&url),
    }?;

    Ok(())
}

fn handle_upload(
    url: &Url,
    title: Option<String>,
    expires_in: ExpiresIn,
    max_views: ViewLimit,
    private: bool,
    path: Option<PathBuf>,
) -> Result<()> {
    let content = match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            if atty::is(Stream::Stdin) {
                eprintln!("Reading paste content from stdin until EOF.");
            }
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let request = CreatePasteRequest {
        title: title.unwrap_or_default(),
        content,
        expires_in: expires_in.to_string(),
        max_views: max_views.to_string(),
        is_private: private,
    };

    let res = Client::new()
        .post(endpoint(url, &["paste"])?)
        .json(&request)
        .send()
        .context("Request to server failed")?;

    match res.status() {
        StatusCode::OK => (),
        StatusCode::BAD_REQUEST => bail!("Upload rejected: {}", res.text()?),
        status => bail!("Upload failed. Got HTTP error {}", status),
    }

    let created: CreatePasteResponse = res.json().context("Failed to decode server response")?;
    println!("{}", endpoint(url, &["paste", &created.id])?);

    Ok(())
}

fn handle_download(url: &Url, id: &str) -> Result<()> {
    let res = Client::new()
        .get(endpoint(url, &["paste", id])?)
        .send()
        .context("Failed to get paste")?;

    match res.status() {
        StatusCode::OK => (),
        StatusCode::NOT_FOUND => bail!("No paste exists with id {id}; it may have been deleted"),
        StatusCode::GONE => bail!("This paste has expired"),
        status => bail!("Got bad response from server: {}", status),
    }

    let paste: Paste = res.json().context("Failed to decode paste")?;

    std::io::stdout().write_all(paste.content.as_bytes())?;
    if atty::is(Stream::Stdout) && !paste.content.ends_with('\n') {
        println!();
    }

    let views = paste.max_views.map_or_else(
        || format!("viewed {} time(s)", paste.current_views),
        |max| format!("{} of {} views used", paste.current_views, max),
    );
    let expiry = paste.expires_at.map_or_else(
        || "this paste does not expire by time".to_string(),
        |at| at.format("expires at %Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    eprintln!("{views}; {expiry}");

    Ok(())
}

fn handle_delete(url: &Url, id: &str) -> Result<()> {
    let res = Client::new()
        .delete(endpoint(url, &["paste", id])?)
        .send()
        .context("Failed to delete paste")?;

    match res.status() {
        StatusCode::OK => {
            eprintln!("Paste {id} deleted.");
            Ok(())
        }
        StatusCode::NOT_FOUND => bail!("No paste exists with id {id}"),
        status => bail!("Got bad response from server: {}", status),
    }
}

fn handle_list(url: &Url) -> Result<()> {
    let res = Client::new()
        .get(endpoint(url, &["pastes"])?)
        .send()
        .context("Failed to list pastes")?;

    if res.status() != StatusCode::OK {
        bail!("Got bad response from server: {}", res.status());
    }

    let summaries: Vec<PasteSummary> = res.json().context("Failed to decode paste list")?;
    if summaries.is_empty() {
        eprintln!("No pastes stored.");
        return Ok(());
    }

    for summary in summaries {
        let views = summary.max_views.map_or_else(
            || summary.current_views.to_string(),
            |max| format!("{}/{}", summary.current_views, max),
        );
        println!(
            "{}  {}  [{} views]  {}: {}",
            summary.id,
            summary.created_at.format("%Y-%m-%d %H:%M"),
            views,
            summary.title,
            summary.content_preview,
        );
    }

    Ok(())
}

/// Joins `segments` onto the server URL under [`API_ENDPOINT`].
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("Server URL cannot be a base"))?
        .pop_if_empty()
        .extend(API_ENDPOINT.split('/').filter(|part| !part.is_empty()))
        .extend(segments);
    Ok(url)
}
