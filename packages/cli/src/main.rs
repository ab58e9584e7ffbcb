//! `lexref`: command-line driver for the reference-tag pipeline.
//!
//! Subcommands:
//!
//! - **`render`**: turn raw model output into sanitized badge HTML.
//! - **`opinion`**: render a backend opinion response with its case list.
//! - **`extract`**: list the references in badge HTML or raw model output.
//! - **`sanitize`**: run the allow-list sanitizer.
//! - **`protect`**: swap badges for placeholder tokens ahead of an edit.
//! - **`resolve`**: turn edited text back into badge HTML.
//! - **`lookup`**: fetch a case title, case text or statutory text (headed
//!   by the act's name when it is a well-known act).
//!
//! Every subcommand that takes FILE reads it from a path or from stdin (`-`)
//! and writes its result to stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use lexref::{
    act_name, extract_badges, extract_inline, protect, protect_with_lookup, render_message,
    render_tags, resolve, resolve_reference, sanitize, CaseNumbering, CaseTitleLookup,
    OpinionResponse, PlaceholderMapping, Protected, Reference, UNKNOWN_TITLE,
};
use lexref_client::config::{DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
use lexref_client::{BackendClient, ClientConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// lexref: reference badges for legal-assistant chat output
#[derive(Parser)]
#[command(name = "lexref", version, about, long_about = None)]
struct Cli {
    /// Base URL of the lookup backend.
    #[arg(long, global = true, env = "LEXREF_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    /// Per-request timeout for backend calls, in seconds.
    #[arg(long, global = true, env = "LEXREF_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render inline tags in raw model output as badge HTML.
    ///
    /// Cases are numbered by first appearance unless --known-case is given,
    /// in which case they are numbered by position in that list and cases
    /// outside it show as "Case ?".
    Render {
        /// Path to the raw text, or `-` for stdin.
        file: PathBuf,

        /// A case id in the reply's known case list. Repeat in order.
        #[arg(long = "known-case", value_name = "ID")]
        known_cases: Vec<String>,

        /// Print the rendered markup without sanitizing it.
        #[arg(long)]
        no_sanitize: bool,
    },

    /// Render a backend opinion response (`{"opinion", "ref_case"}` JSON).
    ///
    /// The keys of `ref_case` form the known case list.
    Opinion {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,
    },

    /// Print the references found in the input as JSON.
    Extract {
        /// Path to the input, or `-` for stdin.
        file: PathBuf,

        /// Scan raw inline tags instead of rendered badge markup.
        #[arg(long)]
        inline: bool,
    },

    /// Sanitize HTML against the badge allow-list.
    Sanitize {
        /// Path to the HTML, or `-` for stdin.
        file: PathBuf,
    },

    /// Replace badges with placeholder tokens and print `{"text", "mapping"}`.
    ///
    /// Case tokens carry the case title fetched from the backend.
    Protect {
        /// Path to the rendered HTML, or `-` for stdin.
        file: PathBuf,

        /// Do not contact the backend; every case is labelled "Unknown Title".
        #[arg(long)]
        offline: bool,
    },

    /// Resolve placeholder tokens in edited text back into badge HTML.
    Resolve {
        /// Path to the edited text, or `-` for stdin.
        file: PathBuf,

        /// Mapping JSON, or the full output of `lexref protect`.
        #[arg(long, value_name = "MAPPING_JSON")]
        mapping: PathBuf,
    },

    /// Query the backend directly.
    Lookup {
        #[command(subcommand)]
        what: Lookup,
    },
}

#[derive(Subcommand)]
enum Lookup {
    /// Title of a case.
    CaseTitle { case_id: String },

    /// Full text of a case.
    CaseText {
        case_id: String,

        /// 0-based paragraph index to highlight. Repeat for several.
        #[arg(long = "highlight", value_name = "N")]
        highlights: Vec<usize>,
    },

    /// Text of a statutory section, e.g. `lookup code hma 17(a)`.
    Code { act: String, section: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexref=info,lexref_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.backend, cli.timeout_secs);

    match cli.command {
        Command::Render {
            file,
            known_cases,
            no_sanitize,
        } => {
            let raw = read_input(&file);
            let numbering = numbering_for(known_cases);
            if no_sanitize {
                print!("{}", render_tags(&raw, &numbering));
            } else {
                print!("{}", render_message(&raw, &numbering));
            }
        }

        Command::Opinion { file } => {
            let json = read_input(&file);
            let response: OpinionResponse = serde_json::from_str(&json)
                .unwrap_or_else(|e| fatal(&format!("failed to parse opinion response: {}", e)));
            let numbering = CaseNumbering::Known(response.known_case_ids());
            print!("{}", render_message(&response.opinion, &numbering));
        }

        Command::Extract { file, inline } => {
            let input = read_input(&file);
            let refs: Vec<Reference> = if inline {
                extract_inline(&input)
            } else {
                extract_badges(&input)
            };
            print_json(&refs);
        }

        Command::Sanitize { file } => {
            print!("{}", sanitize(&read_input(&file)));
        }

        Command::Protect { file, offline } => {
            let html = read_input(&file);
            let protected = if offline {
                protect(&html, &Default::default())
            } else {
                protect_with_lookup(&html, &backend(&config)).await
            };
            print_json(&protected);
        }

        Command::Resolve { file, mapping } => {
            let text = read_input(&file);
            let mapping = parse_mapping(&read_input(&mapping));
            print!("{}", resolve(&text, &mapping));
        }

        Command::Lookup { what } => {
            let backend = backend(&config);
            let out = match what {
                Lookup::CaseTitle { case_id } => backend
                    .case_title(&case_id)
                    .await
                    .unwrap_or_else(|_| UNKNOWN_TITLE.to_string()),
                Lookup::CaseText {
                    case_id,
                    highlights,
                } => {
                    resolve_reference(&Reference::case(case_id, ""), &backend, &highlights).await
                }
                Lookup::Code { act, section } => {
                    let reference = Reference::code(act, section, "");
                    let text = resolve_reference(&reference, &backend, &[]).await;
                    match code_heading(&reference) {
                        Some(heading) => format!("{heading}\n\n{text}"),
                        None => text,
                    }
                }
            };
            println!("{}", out);
        }
    }
}

fn numbering_for(known_cases: Vec<String>) -> CaseNumbering {
    if known_cases.is_empty() {
        CaseNumbering::FirstSeen
    } else {
        CaseNumbering::Known(known_cases)
    }
}

/// `"{act name}, Section {section}"` for a well-known act.
fn code_heading(reference: &Reference) -> Option<String> {
    let key = reference.lookup_key()?;
    let name = act_name(&key.act)?;
    Some(format!("{name}, Section {}", key.section))
}

fn backend(config: &ClientConfig) -> BackendClient {
    BackendClient::from_config(config)
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {}", e)))
}

/// Accept either a bare mapping or the `{"text", "mapping"}` object printed
/// by `protect`.
fn parse_mapping(json: &str) -> PlaceholderMapping {
    if let Ok(protected) = serde_json::from_str::<Protected>(json) {
        return protected.mapping;
    }
    serde_json::from_str(json)
        .unwrap_or_else(|e| fatal(&format!("failed to parse placeholder mapping: {}", e)))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fatal(&format!("failed to serialise output: {}", e)),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("lexref: {}", msg);
    process::exit(2);
}
