#![forbid(unsafe_code)]

//! Guided tour demo binary entry point.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use guide_core::event::{HostEvent, TourKey};
use guide_core::geometry::Size;
use guide_demo::cli::Opts;
use guide_demo::{Session, catalog};
use guide_runtime::{CompletionStore, FileStorage, MachineConfig};
use tracing_subscriber::EnvFilter;

const FRAME_STEP: Duration = Duration::from_millis(400);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(opts: &Opts) -> CompletionStore {
    if opts.in_memory {
        return CompletionStore::in_memory();
    }
    match &opts.state_file {
        Some(path) => CompletionStore::with_file(path),
        None => CompletionStore::new(Box::new(FileStorage::default_for_profile(&opts.profile))),
    }
}

fn main() {
    init_tracing();
    let opts = Opts::parse();

    let catalog = match catalog::load(opts.catalog.as_deref()) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!("Failed to load catalog: {e}");
            process::exit(1);
        }
    };

    let store = open_store(&opts);
    if opts.reset {
        store.clear();
        tracing::info!(backend = store.backend_name(), "progress cleared");
    }

    let config = MachineConfig::default().settle_delay(Duration::from_millis(opts.settle_ms));
    let mut session = Session::new(catalog, store, config, "/dashboard", opts.viewport);

    let mut now = Duration::ZERO;
    let armed = session.mount(now);

    if let Some(tour_id) = &opts.tour {
        session.start(tour_id, now);
        if let Some(err) = session.machine().state().error() {
            eprintln!("{err}");
            process::exit(1);
        }
    } else if armed {
        now += Duration::from_millis(opts.settle_ms);
        if let Some(event) = session.tick(now) {
            tracing::info!(?event, "auto-start fired");
        }
    } else {
        tracing::info!("default tour already offered or completed; use --tour=ID to replay");
    }

    let mut shook_viewport = false;
    while session.machine().state().is_active() {
        now += FRAME_STEP;
        println!("{}", session.describe(now));

        if !shook_viewport && session.frame(now).and_then(|f| f.spotlight()).is_some() {
            shook_viewport = true;
            let scroll = session.dom_mut().scroll_by(0.0, 120.0);
            session.dispatch(&scroll, now);
            println!("  after scroll: {}", session.describe(now));
            let viewport = opts.viewport;
            let resize = session
                .dom_mut()
                .resize(Size::new(viewport.width * 0.6, viewport.height * 0.6));
            session.dispatch(&resize, now);
            println!("  after resize: {}", session.describe(now));
            let restore = session.dom_mut().resize(viewport);
            session.dispatch(&restore, now);
        }

        if let Some(event) = session.dispatch(&HostEvent::Key(TourKey::Enter), now) {
            tracing::info!(?event, "tour event");
        }
    }

    for tour in session.machine().available_tours() {
        println!(
            "{:<10} {:<12} {} step(s){}",
            tour.id,
            tour.name,
            tour.step_count,
            if tour.completed { "  [done]" } else { "" }
        );
    }
    session.dispose();
}
