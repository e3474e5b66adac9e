//! Terminal version of the perevozki list screen.
//!
//! Talks to `perevozki-server` the same way the browser does: the list comes
//! from `GET /api/perevozki` with Basic auth, documents from `POST /api/getfile`.
//! Filtering happens locally after the one fetch.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Local;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response, header::CONTENT_DISPOSITION};
use serde_json::{Value, json};
use shipments::{
    Card, DateBucket, ListState, ShipmentList, ShipmentRecord, StatusFilter, ViewTab,
    records_from_json,
};
use tokio::{fs::File, io::AsyncWriteExt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:8080")]
    server: String,

    #[arg(long)]
    login: String,

    #[arg(long)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch perevozki once and print the filtered cards
    List {
        /// all, today, this_week, this_month
        #[arg(long, default_value = "all")]
        date: DateBucket,

        /// all, created, accepted, in_transit, ready_for_pickup, delivered
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// active, archive, attention
        #[arg(long, default_value = "active")]
        tab: ViewTab,
    },

    /// Download one document
    File {
        #[arg(long)]
        metod: String,

        #[arg(long)]
        number: String,

        /// Defaults to the server-provided filename
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        server,
        login,
        password,
        command,
    } = Args::parse();
    let client = Client::new();

    match command {
        Command::List { date, status, tab } => {
            let mut list = ShipmentList::new(&login);
            list.filters.date = date;
            list.filters.status = status;
            list.filters.tab = tab;

            println!("Loading perevozki for {}...", list.login());
            list.loaded(fetch_list(&client, &server, &login, &password).await);

            print_list(&list)
        }
        Command::File {
            metod,
            number,
            out,
        } => {
            let query = json!({
                "login": login,
                "password": password,
                "metod": metod,
                "number": number,
            });

            download(&client, &server, &query, &metod, &number, out).await
        }
    }
}

async fn fetch_list(
    client: &Client,
    server: &str,
    login: &str,
    password: &str,
) -> Result<Vec<ShipmentRecord>, String> {
    let credential = STANDARD.encode(format!("{login}:{password}"));

    let response = client
        .get(format!("{server}/api/perevozki"))
        .header("Authorization", format!("Basic {credential}"))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(error_message(response).await);
    }

    let body: Value = response.json().await.map_err(|e| e.to_string())?;

    Ok(records_from_json(body))
}

fn print_list(list: &ShipmentList) -> Result<()> {
    match list.state() {
        ListState::Loading => println!("Loading..."),
        ListState::Failed(message) => bail!("Failed to load perevozki: {message}"),
        ListState::Loaded(records) => {
            let visible = list.visible(Local::now().naive_local());

            println!(
                "{} of {} perevozki (date: {}, tab: {})\n",
                visible.len(),
                records.len(),
                list.filters.date,
                list.filters.tab
            );

            for record in visible {
                let card = Card::from(record);
                println!("№ {}  [{}]", card.number, card.category.label());
                println!("  {}", card.route);
                println!("  {}  {}\n", card.status, card.date);
            }
        }
    }

    Ok(())
}

async fn download(
    client: &Client,
    server: &str,
    query: &Value,
    metod: &str,
    number: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let response = client
        .post(format!("{server}/api/getfile"))
        .json(query)
        .send()
        .await
        .context("Server unreachable")?;

    if !response.status().is_success() {
        let status = response.status();
        bail!("{status}: {}", error_message(response).await);
    }

    let path = out.unwrap_or_else(|| {
        response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| filename(value.as_bytes()))
            .or_else(|| safe_file_name(&format!("{metod}_{number}.pdf")))
            .unwrap_or_else(|| "document.pdf".to_string())
            .into()
    });

    let pb = match response.content_length() {
        Some(length) => ProgressBar::new(length),
        None => ProgressBar::new_spinner(),
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
        )?
        .progress_chars("=> "),
    );
    pb.set_message(path.display().to_string());

    let mut file = File::create(&path)
        .await
        .with_context(|| format!("Cannot create {}", path.display()))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await?;

    pb.finish_with_message(format!("Saved {}", path.display()));

    Ok(())
}

async fn error_message(response: Response) -> String {
    let status = response.status();

    match response.json::<Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => status.to_string(),
    }
}

fn filename(content_disposition: &[u8]) -> Option<String> {
    let value = String::from_utf8_lossy(content_disposition);
    let (_, rest) = value.split_once("filename=")?;
    let name = rest.split(';').next()?.trim().trim_matches('"');

    safe_file_name(name)
}

/// Last path component only, so a server-chosen name stays in the working directory.
fn safe_file_name(name: &str) -> Option<String> {
    let name = name.rsplit('\\').next()?;
    let name = Path::new(name).file_name()?.to_str()?;

    (!name.trim().is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::{filename, safe_file_name};

    #[test]
    fn test_filename() {
        assert_eq!(
            filename("attachment; filename=\"ЭР_000107984.pdf\"".as_bytes()).as_deref(),
            Some("ЭР_000107984.pdf")
        );
        assert_eq!(
            filename(b"inline; filename=scan.tiff; size=10").as_deref(),
            Some("scan.tiff")
        );
        assert_eq!(filename(b"attachment"), None);
        assert_eq!(filename(b"attachment; filename=\"\""), None);
    }

    #[test]
    fn test_filename_cannot_leave_working_directory() {
        assert_eq!(
            filename(b"attachment; filename=\"/tmp/evil/../../etc/cron.d/x\"").as_deref(),
            Some("x")
        );
        assert_eq!(
            filename(b"attachment; filename=\"..\\..\\boot.ini\"").as_deref(),
            Some("boot.ini")
        );
        assert_eq!(filename(b"attachment; filename=\"..\""), None);
        assert_eq!(filename(b"attachment; filename=\"/\""), None);
    }

    #[test]
    fn test_fallback_name_is_sanitized() {
        assert_eq!(
            safe_file_name("ЭР_000107984.pdf").as_deref(),
            Some("ЭР_000107984.pdf")
        );
        assert_eq!(safe_file_name("../x_1.pdf").as_deref(), Some("x_1.pdf"));
        assert_eq!(safe_file_name("a/b_../..").as_deref(), None);
    }
}
