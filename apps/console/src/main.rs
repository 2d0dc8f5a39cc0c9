use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{CollectorConfig, CollectorEvent, GestureCollector, HttpWorkflowTransport};
use shared::{
    domain::{Command, Gesture},
    protocol::WorkflowResult,
};
use tokio::{sync::broadcast::error::RecvError, time::timeout};
use tracing::warn;

/// Simulates MX gesture presses against a running workflow server.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://localhost:3000")]
    server_url: String,
    #[arg(long, default_value_t = Gesture::default())]
    gesture: Gesture,
    #[arg(long, default_value_t = Command::default())]
    command: Command,
    /// Code context sent with the gesture.
    #[arg(long, default_value = "", conflicts_with = "selected_file")]
    selected_text: String,
    /// Read the code context from a file instead.
    #[arg(long)]
    selected_file: Option<PathBuf>,
    /// Number of presses to fire; presses closer than the debounce window collapse.
    #[arg(long, default_value_t = 1)]
    presses: u32,
    #[arg(long, default_value_t = 50)]
    press_interval_ms: u64,
    #[arg(long, default_value_t = 120)]
    wait_secs: u64,
    /// Print the available gestures and commands and exit.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    if args.list {
        print_catalog();
        return Ok(());
    }

    let selected_text = match &args.selected_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => args.selected_text.clone(),
    };

    let transport = HttpWorkflowTransport::new(&args.server_url)
        .with_context(|| format!("invalid server url '{}'", args.server_url))?;
    let collector = GestureCollector::spawn(Arc::new(transport), CollectorConfig::default());
    let mut events = collector.subscribe();

    collector.set_gesture(args.gesture).await;
    collector.set_command(args.command).await;
    collector.set_selected_text(selected_text).await;

    for press in 0..args.presses.max(1) {
        if press > 0 {
            tokio::time::sleep(Duration::from_millis(args.press_interval_ms)).await;
        }
        if !collector.trigger().await {
            warn!(press, "press dropped while a request is in flight");
        }
    }

    let wait = Duration::from_secs(args.wait_secs);
    let result = timeout(wait, async {
        loop {
            match events.recv().await {
                Ok(CollectorEvent::Submitted(event)) => {
                    println!("-> {} / {}", event.gesture.label(), event.command.label());
                }
                Ok(CollectorEvent::ResultReceived(result)) => return Ok(result),
                Ok(CollectorEvent::SubmitFailed { message }) => bail!(message),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => bail!("collector stopped"),
            }
        }
    })
    .await
    .with_context(|| format!("no workflow result within {}s", args.wait_secs))??;

    print_result(&result);
    Ok(())
}

fn print_result(result: &WorkflowResult) {
    println!("action:         {}", result.action);
    println!("haptic:         {}", result.haptic_feedback);
    println!("next gesture:   {}", result.next_gesture);
    println!("content:\n{}", result.content);
}

fn print_catalog() {
    println!("Gestures:");
    for gesture in Gesture::ALL {
        println!("  {:<22} {} - {}", gesture.as_str(), gesture.label(), gesture.description());
    }
    println!("Commands:");
    for command in Command::ALL {
        println!("  {:<22} {} - {}", command.as_str(), command.label(), command.description());
    }
}
