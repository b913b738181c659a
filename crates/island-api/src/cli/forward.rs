//! `island forward`: run a plugin and drain its events onto the agent bus.
//!
//! The plugin writes one JSON `AgentEvent` per line to stdout. Its stderr is
//! inherited so plugin diagnostics show up next to the Island's logs.

use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use console::style;
use island_core::event::{ForwarderError, PluginEventForwarder, QueueError};
use island_core::repository::AgentEventRepository;
use island_infra::queue::PipeEventQueue;
use tracing::{info, warn};

use super::status::print_summary;
use crate::state::AppState;

const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub async fn forward(state: &AppState, command: &[String], json: bool) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("no plugin command given");
    };

    let events_before = state.repositories.agent_events.get_events()?.len();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to launch plugin '{program}'"))?;
    let stdout = child
        .stdout
        .take()
        .context("plugin stdout was not captured")?;

    let queue = PipeEventQueue::spawn(stdout).context("failed to start plugin event reader")?;
    let timeout = state.config.plugin_queue_timeout();
    let mut forwarder =
        PluginEventForwarder::with_timeout(queue, state.agent_event_queue.clone(), timeout);
    forwarder.start()?;
    info!(plugin = %program, pid = child.id(), "forwarding plugin events");

    let status = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!(plugin = %program, "interrupted, stopping plugin");
                if let Err(err) = child.kill() {
                    warn!(error = %err, "failed to kill plugin");
                }
                break child.wait()?;
            }
            _ = tokio::time::sleep(CHILD_POLL_INTERVAL) => {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
            }
        }
    };
    info!(plugin = %program, status = %status, "plugin exited");

    // The stream closes with the plugin; wait for what it wrote to drain.
    let drain_deadline = tokio::time::Instant::now() + timeout * 2;
    while forwarder.is_running() && tokio::time::Instant::now() < drain_deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    match forwarder.stop(Some(timeout * 2)) {
        Ok(()) | Err(ForwarderError::Queue(QueueError::Disconnected)) => {}
        Err(err) => return Err(err).context("plugin event forwarder failed"),
    }

    let forwarded = state
        .repositories
        .agent_events
        .get_events()?
        .len()
        .saturating_sub(events_before);

    if !json {
        eprintln!(
            "  {} {} forwarded {} events ({})",
            style("*").bold(),
            style(program).cyan(),
            style(forwarded).bold(),
            status
        );
    }
    print_summary(state, None, json)?;

    if !status.success() {
        bail!("plugin '{program}' exited with {status}");
    }
    Ok(())
}
