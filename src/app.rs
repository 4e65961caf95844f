use std::io::Write;

use clap::{error::ErrorKind, Parser};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::catalog::{CatalogFetcher, CatalogPage, FetchError, HttpCatalog, HttpOptions};
use crate::cli::args::CliArgs;
use crate::cli::command::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output::{self, view, BusyIndicator};
use crate::pager::{BulkTicket, LoadTicket, PageSize, Pager};

#[derive(Clone, Debug, PartialEq, Eq)]
struct RunConfig {
    http: HttpOptions,
    page: u32,
    size: PageSize,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let base_url = args
        .url
        .or(cfg.base_url)
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| crate::catalog::DEFAULT_BASE_URL.to_string());
    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let user_agent = args.user_agent.or(cfg.user_agent);

    let page = args.page.or(cfg.page).unwrap_or(1);
    if page == 0 {
        return Err("invalid page, expected positive integer".to_string());
    }
    let size = match args.size.or(cfg.page_size) {
        Some(raw) => PageSize::try_from(raw).map_err(|e| format!("invalid page size: {e}"))?,
        None => PageSize::DEFAULT,
    };

    Ok(RunConfig {
        http: HttpOptions {
            base_url,
            timeout_seconds,
            proxy,
            user_agent,
        },
        page,
        size,
        no_color,
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("artpager={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// A fetch in flight, tagged with the ticket it answers.
enum Pending {
    Load(LoadTicket),
    Bulk(BulkTicket),
}

type Completion = (Pending, Result<CatalogPage, FetchError>);

fn dispatch<'a, F: CatalogFetcher>(fetcher: &'a F, pending: Pending) -> BoxFuture<'a, Completion> {
    Box::pin(async move {
        let request = match &pending {
            Pending::Load(ticket) => ticket.request(),
            Pending::Bulk(ticket) => ticket.request(),
        };
        let result = fetcher.fetch_page(request).await;
        (pending, result)
    })
}

enum Step {
    Continue,
    Quit,
}

struct Repl<'a, F> {
    fetcher: &'a F,
    pager: Pager,
    in_flight: FuturesUnordered<BoxFuture<'a, Completion>>,
    busy: BusyIndicator,
}

impl<'a, F: CatalogFetcher> Repl<'a, F> {
    fn new(fetcher: &'a F, page: u32, size: PageSize) -> Self {
        Self {
            fetcher,
            pager: Pager::new(page, size),
            in_flight: FuturesUnordered::new(),
            busy: BusyIndicator::new(false),
        }
    }

    fn load(&mut self, ticket: LoadTicket) {
        self.in_flight.push(dispatch(self.fetcher, Pending::Load(ticket)));
    }

    fn refresh_busy(&mut self) {
        self.busy.set(self.pager.is_busy());
    }

    async fn handle_line(&mut self, line: &str) -> Step {
        let command = match command::parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Step::Continue,
            Err(e) => {
                println!("{e}");
                return Step::Continue;
            }
        };
        debug!(?command, "received command");

        let touches_view = !matches!(
            command,
            Command::Selected | Command::Export { .. } | Command::Help | Command::Quit
        );
        if touches_view && self.pager.is_bulk_in_progress() {
            println!("bulk selection in progress, please wait");
            return Step::Continue;
        }

        match command {
            Command::Next => {
                let t = self.pager.next_page();
                self.load(t);
            }
            Command::Prev => {
                let t = self.pager.prev_page();
                self.load(t);
            }
            Command::First => {
                let t = self.pager.first_page();
                self.load(t);
            }
            Command::Last => {
                let t = self.pager.last_page();
                self.load(t);
            }
            Command::Page(page) => {
                let t = self.pager.goto_page(page);
                self.load(t);
            }
            Command::Size(size) => {
                let t = self.pager.resize(size);
                self.load(t);
            }
            Command::Refresh => {
                let t = self.pager.reload();
                self.load(t);
            }
            Command::Toggle(id) => match self.pager.toggle_window_row(id) {
                Some(_) => self.render(),
                None => println!("artwork {id} is not on this page"),
            },
            Command::Select(id) => {
                match self.pager.window().iter().find(|r| r.id == id).cloned() {
                    Some(record) => {
                        self.pager.toggle_row(&record, true);
                        self.render();
                    }
                    None => println!("artwork {id} is not on this page"),
                }
            }
            Command::Deselect(id) => {
                if self.pager.deselect(id) {
                    self.render();
                } else {
                    println!("artwork {id} is not selected");
                }
            }
            Command::SelectAll => {
                self.pager.toggle_select_all();
                self.render();
            }
            Command::Bulk(None) => {}
            Command::Bulk(Some(count)) => {
                if let Some(ticket) = self.pager.begin_bulk(count) {
                    self.in_flight.push(dispatch(self.fetcher, Pending::Bulk(ticket)));
                }
            }
            Command::Selected => print!("{}", view::render_selection_list(self.pager.selection())),
            Command::Export { path, format } => {
                let path = config::expand_tilde(&path).to_string_lossy().to_string();
                match output::export_selection(self.pager.selection(), &path, format).await {
                    Ok(written) => println!("wrote {written} artworks to {path}"),
                    Err(e) => println!("{e}"),
                }
            }
            Command::Help => println!("{}", command::HELP),
            Command::Quit => return Step::Quit,
        }
        self.refresh_busy();
        Step::Continue
    }

    /// Apply a finished fetch. Returns true when the page was redrawn, which
    /// only happens once nothing is pending.
    fn handle_completion(&mut self, completion: Completion) -> bool {
        match completion {
            (Pending::Load(ticket), result) => {
                self.pager.complete_load(ticket, result);
            }
            (Pending::Bulk(ticket), result) => {
                let restore = self.pager.complete_bulk(ticket, result);
                self.load(restore);
            }
        }
        self.refresh_busy();
        if self.pager.is_busy() {
            return false;
        }
        self.render();
        true
    }

    fn render(&self) {
        println!();
        print!("{}", view::render_page(&self.pager));
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let catalog = HttpCatalog::new(&run.http).map_err(|e| e.to_string())?;
    info!(endpoint = %catalog.endpoint(), "using catalog");

    let mut repl = Repl::new(&catalog, run.page, run.size);
    let t = repl.pager.begin_load(run.page, run.size);
    repl.load(t);
    repl.refresh_busy();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if let Step::Quit = repl.handle_line(&line).await {
                            break;
                        }
                        if !repl.pager.is_busy() {
                            prompt();
                        }
                    }
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read input: {e}")),
                }
            }
            Some(completion) = repl.in_flight.next(), if !repl.in_flight.is_empty() => {
                repl.handle_completion(completion);
                if !repl.pager.is_busy() {
                    prompt();
                }
            }
        }
    }

    repl.busy.set(false);
    if !repl.in_flight.is_empty() {
        warn!(pending = repl.in_flight.len(), "exiting with requests in flight");
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    if args.init_config {
        let path = args
            .config
            .as_deref()
            .map(config::expand_tilde)
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
