#![forbid(unsafe_code)]

//! Tours shipped with the dashboard.
//!
//! Four tours: `welcome` (offered automatically on first visit) and one
//! per product area. Steps target the element ids rendered by
//! [`HeadlessDom::dashboard`](crate::host::HeadlessDom::dashboard).

use std::fs;
use std::path::Path;

use guide_core::{Catalog, Placement, StepAction, TourConfig, TourStep, WHOLE_SCREEN_TARGET};

use crate::error::DemoError;

pub const WELCOME: &str = "welcome";
pub const CAMPAIGNS: &str = "campaigns";
pub const LEADS: &str = "leads";
pub const AGENTS: &str = "agents";

fn highlight() -> StepAction {
    StepAction::Highlight {
        class: "tour-highlight".into(),
    }
}

fn welcome() -> TourConfig {
    TourConfig::new(WELCOME, "Welcome")
        .description("A first look around the dashboard.")
        .auto_start(true)
        .step(
            TourStep::new(
                "hello",
                WHOLE_SCREEN_TARGET,
                "Welcome aboard",
                "Let's take a quick look at the main areas of your workspace.",
            )
            .placement(Placement::Center)
            .controls(true, false, true, false),
        )
        .step(
            TourStep::new(
                "sidebar",
                "#sidebar-nav",
                "Navigation",
                "Every product area is one click away from this menu.",
            )
            .placement(Placement::Right)
            .action(highlight()),
        )
        .step(
            TourStep::new(
                "instances",
                "#instances-list",
                "WhatsApp instances",
                "Connect a number here before sending your first campaign.",
            )
            .page("instancias")
            .next_route("/instancias")
            .placement(Placement::Bottom)
            .delay_ms(250),
        )
        .step(
            TourStep::new(
                "done",
                WHOLE_SCREEN_TARGET,
                "You're all set",
                "Restart any tour later from the help menu.",
            )
            .placement(Placement::Center)
            .next_route("/dashboard")
            .controls(false, true, false, true),
        )
}

fn campaigns() -> TourConfig {
    TourConfig::new(CAMPAIGNS, "Campaigns")
        .description("Create and schedule a broadcast.")
        .step(
            TourStep::new(
                "new-campaign",
                "#new-campaign",
                "New campaign",
                "Start a broadcast from a template or from scratch.",
            )
            .page("campanhas")
            .next_route("/campanhas")
            .placement(Placement::Left)
            .action(StepAction::Pulse),
        )
        .step(
            TourStep::new(
                "campaign-list",
                "#campaign-list",
                "Your campaigns",
                "Track delivery and replies for every campaign.",
            )
            .page("campanhas")
            .placement(Placement::Top),
        )
}

fn leads() -> TourConfig {
    TourConfig::new(LEADS, "Leads")
        .description("Import contacts and organise them.")
        .step(
            TourStep::new(
                "import",
                "#import-leads",
                "Import leads",
                "Upload a spreadsheet to bring contacts in.",
            )
            .page("leads")
            .next_route("/leads")
            .placement(Placement::Bottom)
            .action(highlight()),
        )
        .step(
            TourStep::new(
                "table",
                "#leads-table",
                "Lead table",
                "Filter, tag, and export from here.",
            )
            .page("leads")
            .placement(Placement::Top),
        )
}

fn agents() -> TourConfig {
    TourConfig::new(AGENTS, "AI agents")
        .description("Configure the assistant that answers for you.")
        .persistent(false)
        .step(
            TourStep::new(
                "agent-form",
                "#agent-form",
                "Agent settings",
                "Give your agent a name, a tone, and a knowledge base.",
            )
            .page("agentes")
            .next_route("/agentes")
            .placement(Placement::Right),
        )
}

/// The built-in dashboard catalog.
pub fn dashboard() -> Result<Catalog, DemoError> {
    let catalog = Catalog::new(vec![welcome(), campaigns(), leads(), agents()])?;
    Ok(catalog.with_default(WELCOME)?)
}

/// Load a catalog from `path`, or the built-in one when `path` is `None`.
pub fn load(path: Option<&Path>) -> Result<Catalog, DemoError> {
    let Some(path) = path else {
        return dashboard();
    };
    let json = fs::read_to_string(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Catalog::from_json(&json)?)
}
