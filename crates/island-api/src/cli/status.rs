//! Summary printed when a command finishes.

use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::style;
use island_core::repository::{
    AgentEventRepository, AgentRepository, CredentialsRepository, MachineRepository,
    SimulationRepository,
};
use island_types::event::AgentEventKind;

use crate::state::AppState;

/// Requests answered by `island serve`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestCounts {
    pub handled: usize,
    pub failed: usize,
}

/// Print machines, agents and event counts held by the Island.
///
/// `requests` is present for commands that answer requests.
pub fn print_summary(state: &AppState, requests: Option<&RequestCounts>, json: bool) -> Result<()> {
    let repos = &state.repositories;
    let machines = repos.machines.get_machines()?;
    let agents = repos.agents.get_agents()?;
    let events = repos.agent_events.get_events()?;
    let stolen = repos.credentials.get_stolen_credentials()?;
    let mode = repos.simulation.get_mode()?;

    let event_counts: Vec<(AgentEventKind, usize)> = AgentEventKind::ALL
        .iter()
        .map(|kind| (*kind, events.iter().filter(|event| event.kind() == *kind).count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    if json {
        let mut summary = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "mode": mode,
            "machines": machines,
            "agents": agents,
            "events": event_counts
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), serde_json::json!(count)))
                .collect::<serde_json::Map<_, _>>(),
            "stolen_credentials": stolen.len(),
        });
        if let Some(requests) = requests {
            summary["requests"] = serde_json::json!({
                "handled": requests.handled,
                "failed": requests.failed,
            });
        }
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    // stdout carries protocol responses, so the summary goes to stderr
    eprintln!();
    eprintln!(
        "  {} Island v{}  mode: {}",
        style("*").bold(),
        env!("CARGO_PKG_VERSION"),
        style(mode).cyan()
    );
    eprintln!();

    if let Some(requests) = requests {
        eprintln!("  {}", style("── Requests ──").dim());
        eprintln!("  Handled: {}", style(requests.handled).green());
        if requests.failed > 0 {
            eprintln!("  Failed:  {}", style(requests.failed).red());
        }
        eprintln!();
    }

    eprintln!("  {}", style("── Machines ──").dim());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID"),
            Cell::new("Hardware ID"),
            Cell::new("Interfaces"),
            Cell::new("OS"),
            Cell::new("Hostname"),
        ]);
    for machine in &machines {
        let interfaces = machine
            .network_interfaces()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let id = if machine.is_island() {
            format!("{} (island)", machine.id())
        } else {
            machine.id().to_string()
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(machine.hardware_id.as_ref().map(|h| h.to_string()).unwrap_or_default()),
            Cell::new(interfaces),
            Cell::new(
                machine
                    .operating_system
                    .as_ref()
                    .map(|os| os.to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(&machine.hostname),
        ]);
    }
    eprintln!("{table}");
    eprintln!();

    eprintln!("  {}", style("── Agents ──").dim());
    if agents.is_empty() {
        eprintln!("  {}", style("none registered").dim());
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Agent"),
                Cell::new("Machine"),
                Cell::new("Parent"),
                Cell::new("Started"),
                Cell::new("Status"),
            ]);
        for agent in &agents {
            let status = match agent.stop_time {
                None => style("running".to_string()).green().to_string(),
                Some(stop) => style(format!("stopped {}", stop.format("%H:%M:%S")))
                    .dim()
                    .to_string(),
            };
            table.add_row(vec![
                Cell::new(agent.id),
                Cell::new(agent.machine_id),
                Cell::new(agent.parent_id.map(|p| p.to_string()).unwrap_or_default()),
                Cell::new(agent.start_time.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(status),
            ]);
        }
        eprintln!("{table}");
    }
    eprintln!();

    eprintln!("  {}", style("── Events ──").dim());
    eprintln!("  Total: {}", style(events.len()).bold());
    for (kind, count) in &event_counts {
        eprintln!("  {:<20} {count}", kind.as_str());
    }
    if !stolen.is_empty() {
        eprintln!("  Stolen credentials: {}", style(stolen.len()).yellow());
    }
    eprintln!();

    Ok(())
}
