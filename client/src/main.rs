use std::{io, num::NonZeroUsize, path::PathBuf};

use clap::Parser;
use client::{
    command::{Command, Target},
    directory::Tab,
    storage, Directory, Favorites, HttpApi, Storage,
};
use common::pagination::DEFAULT_PAGE_SIZE;
use reqwest::Url;
use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    task::LocalSet,
};
use tracing as log;

/// Interactive terminal client of the user directory.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL of the user search endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8080/api/users/search")]
    endpoint: Url,

    /// Path to the file favorites are stored in.
    #[arg(long, default_value = "favorites.json")]
    storage: PathBuf,

    /// Number of users per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: NonZeroUsize,

    /// Log level.
    #[arg(long, default_value_t = log::Level::WARN)]
    log_level: log::Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_max_level(args.log_level)
        .init();

    LocalSet::new().run_until(run(args)).await;
}

async fn run(args: Args) {
    let Args {
        endpoint,
        storage,
        page_size,
        ..
    } = args;

    let favorites = Favorites::load(storage::File::new(storage));
    let mut directory =
        Directory::spawn(HttpApi::new(endpoint), favorites, page_size);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("failed to read input: {e}");
                        break;
                    }
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => {
                        execute(&mut directory, cmd);
                        render(&directory);
                    }
                    Err(e) => println!("{e}\n{HELP}"),
                }
            }
            alive = directory.search_mut().changed() => {
                if !alive {
                    log::error!("user search has stopped");
                    break;
                }
                render(&directory);
            }
        }
    }
}

/// Usage of the interactive commands.
const HELP: &str = "commands: q <text> | n <code> | tab all|favorites | \
                    next | prev | fav <number|id> | clear | retry | show | \
                    quit";

/// Applies the provided [`Command`] to the [`Directory`].
fn execute<S: Storage>(directory: &mut Directory<S>, cmd: Command) {
    match cmd {
        Command::Query(term) => directory.set_search_term(term),
        Command::Nationality(code) => directory.set_nationality(code),
        Command::Tab(tab) => directory.set_tab(tab),
        Command::Next => {
            if !directory.next_page() {
                println!("already on the last page");
            }
        }
        Command::Previous => {
            if !directory.previous_page() {
                println!("already on the first page");
            }
        }
        Command::Favorite(target) => {
            let id = match target {
                Target::Id(id) => Some(id),
                Target::Position(n) => n
                    .checked_sub(1)
                    .and_then(|i| directory.visible().get(i).map(|u| u.id)),
            };
            match id {
                Some(id) => {
                    let now = directory.toggle_favorite(id);
                    log::info!("`{id}` is favorite: {now}");
                }
                None => println!("no such user on the page"),
            }
        }
        Command::Clear => directory.clear_filters(),
        Command::Retry => directory.retry(),
        Command::Show | Command::Quit => {}
    }
}

/// Prints the current state of the [`Directory`].
fn render<S: Storage>(directory: &Directory<S>) {
    let state = directory.search().state();
    let view = directory.view();
    let counts = directory.counts();

    let tab = |tab: Tab, count: usize| {
        if view.tab == tab {
            format!("[{tab} ({count})]")
        } else {
            format!(" {tab} ({count}) ")
        }
    };
    println!(
        "\n{}{}  q: {:?}  nationality: {}  page: {}{}",
        tab(Tab::All, counts.all),
        tab(Tab::Favorites, counts.favorites),
        view.search_term,
        view.nationality,
        view.page,
        if state.is_fetching { "  (fetching)" } else { "" },
    );
    if let Some(data) = &state.data {
        let nationalities = data
            .meta
            .nationalities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        println!("nationalities: {}", nationalities.join(", "));
    }

    if state.is_loading {
        println!("loading...");
        return;
    }
    if let Some(err) = &state.error {
        println!("error: {err} (type `retry`)");
    }

    let visible = directory.visible();
    if visible.is_empty() && !state.is_error() {
        println!("no users");
    }
    for (n, user) in visible.iter().enumerate() {
        let star = if directory.favorites().is_favorite(&user.id) {
            '*'
        } else {
            ' '
        };
        println!(
            "{:>3}. {star} {} <{}> {} {}",
            n + 1,
            user.name,
            user.email,
            user.nationality,
            user.id,
        );
    }

    let mut controls = Vec::new();
    if directory.can_previous() {
        controls.push("prev");
    }
    if directory.can_next() {
        controls.push("next");
    }
    if !controls.is_empty() {
        println!("pages: {}", controls.join(" | "));
    }
}
