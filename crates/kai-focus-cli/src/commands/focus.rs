//! Focus session commands.
//!
//! Each invocation rebuilds the guard from the store, so `start`, `accept`
//! and `end` can run while `watch` is ticking in another terminal. Only
//! `watch` ticks; the one-shot commands refresh elapsed time without
//! counting a suggestion.

use std::ops::ControlFlow;

use clap::Subcommand;

use kai_focus_core::storage::HyperfocusConfig;
use kai_focus_core::{ticker, Config, Database, Event, GuardView, HyperfocusGuard, SystemClock};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Start a focus session (replaces any active one)
    Start,
    /// Update elapsed time and show the session
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Take the suggested break
    Accept {
        /// Break length in minutes (defaults to the configured break)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Dismiss the current suggestion
    Dismiss,
    /// End the session and archive it
    End,
    /// Print break adherence statistics
    Stats,
    /// Tick the active session until it ends or Ctrl-C
    Watch,
}

pub fn run(action: FocusAction) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut guard = HyperfocusGuard::with_config(&db, SystemClock, &config.hyperfocus);
    match action {
        FocusAction::Start => {
            let event = guard.start_session();
            print_json(&event)?;
        }
        FocusAction::Status { json } => {
            guard.refresh();
            let view = guard.view();
            if json {
                print_json(&view)?;
            } else {
                print_view(&view);
            }
        }
        FocusAction::Accept { minutes } => {
            guard.refresh();
            let event = match minutes {
                Some(m) => guard.accept_break(m),
                None => guard.accept_default_break(),
            };
            print_event_or_idle(event)?;
        }
        FocusAction::Dismiss => {
            guard.refresh();
            print_event_or_idle(guard.dismiss_suggestion())?;
        }
        FocusAction::End => {
            guard.refresh();
            print_event_or_idle(guard.end_session())?;
        }
        FocusAction::Stats => print_json(&guard.stats())?,
        FocusAction::Watch => {
            let active = guard.is_active();
            drop(guard);
            if !active {
                println!("no active focus session (run `kai-focus focus start`)");
                return Ok(());
            }
            watch(db, config.hyperfocus)?;
        }
    }
    Ok(())
}

fn print_event_or_idle(event: Option<Event>) -> CmdResult {
    match event {
        Some(event) => print_json(&event),
        None => {
            println!("no active focus session");
            Ok(())
        }
    }
}

fn print_view(view: &GuardView) {
    if !view.session_active {
        println!("No active focus session.");
        return;
    }
    println!("Focused for: {} min", view.elapsed_minutes);
    println!("Urgency:     {}", view.urgency_level);
    if let Some(suggestion) = &view.current_suggestion {
        println!();
        println!("{}", suggestion.message);
        println!();
        println!("Break ideas:");
        for activity in &view.break_activities {
            println!(
                "  {} {} ({} min)",
                activity.icon, activity.label, activity.duration_minutes
            );
        }
    }
    println!();
    println!("{}", view.encouragement_message);
}

fn watch(db: Database, config: HyperfocusConfig) -> CmdResult {
    let period = config.tick_interval();
    println!("watching focus session every {}s, Ctrl-C to stop", period.as_secs());

    let runtime = tokio::runtime::Runtime::new()?;
    tracing::debug!(?period, "starting tick loop");
    runtime.block_on(async move {
        let handle = ticker::spawn(period, move || {
            let mut guard = HyperfocusGuard::with_config(&db, SystemClock, &config);
            if let Some(Event::BreakSuggested {
                urgency,
                elapsed_minutes,
                message,
                ..
            }) = guard.tick()
            {
                println!("[{elapsed_minutes} min] {urgency}: {message}");
            }
            if guard.is_active() {
                ControlFlow::Continue(())
            } else {
                println!("focus session ended");
                ControlFlow::Break(())
            }
        });

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("stopped watching; the session is still active");
            }
            _ = handle.join() => {}
        }
    });
    Ok(())
}
