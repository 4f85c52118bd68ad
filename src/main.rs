//! quakemon daemon
//!
//! Runs the foreground tracker and the background sentinel against the
//! USGS feeds, prints alert changes and poll results, and takes simple line
//! commands on stdin:
//!
//! ```text
//! refresh                 poll now
//! region <name>           select a region from the catalogue
//! regions                 list the catalogue
//! window <hour|day|week>  select the feed window
//! floor <magnitude>       minimum magnitude for the global list
//! search [text]           filter printed events by place (empty clears)
//! status                  print the latest snapshot again
//! quit                    stop
//! ```
//!
//! Ctrl-C also stops. Closing stdin only stops command input.

use chrono::{TimeZone, Utc};
use quakemon_service::alert::notifier::Notifier;
use quakemon_service::analysis::descriptions::{
    distance_label, filter_by_place, risk_description, simple_description,
};
use quakemon_service::config;
use quakemon_service::ingest::usgs::UsgsFeedClient;
use quakemon_service::logging::{self, Component};
use quakemon_service::model::{AlertLevel, AlertState, FeedWindow, Region, SeismicEvent};
use quakemon_service::monitor::{self, MonitorHandle, MonitorSnapshot};
use quakemon_service::regions;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Events printed per list.
const LIST_PREVIEW: usize = 5;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config()?;
    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let catalogue = config.catalogue();
    let client = UsgsFeedClient::new(&config.feed.base_url, config.feed_timeout())?;
    logging::info(Component::System, None, &format!("Feed source: {}", client.base_url()));

    let notifier = Notifier::new();
    let tracker = monitor::spawn_tracker(
        client.clone(),
        notifier.clone(),
        config.tracker_region()?,
        config.tracker.window,
        config.tracker.magnitude_floor,
    );
    let sentinel = if config.sentinel.enabled {
        Some(monitor::spawn_sentinel(
            client,
            notifier.clone(),
            config.sentinel_region()?,
            config.sentinel.magnitude_floor,
            config.sentinel.interval(),
        ))
    } else {
        None
    };

    let mut alerts = notifier.subscribe();
    let mut snapshots = tracker.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut search = String::new();
    let mut shown = (AlertLevel::None, String::new());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = alerts.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = alerts.borrow_and_update().clone();
                if (state.level, state.message.clone()) != shown {
                    print_alert(&state);
                    shown = (state.level, state.message);
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if !snapshot.is_loading() {
                    print_snapshot(&snapshot, &search);
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    match parse_command(&line) {
                        Ok(UserCommand::Quit) => break,
                        Ok(command) => execute(command, &tracker, &catalogue, &mut search),
                        Err(message) => println!("{}", message),
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    logging::warn(Component::System, None, &format!("stdin closed: {}", e));
                    stdin_open = false;
                }
            },
        }
    }

    logging::info(Component::System, None, "Shutting down");
    tracker.shutdown().await;
    if let Some(sentinel) = sentinel {
        sentinel.shutdown().await;
    }
    notifier.shutdown();
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum UserCommand {
    Refresh,
    Region(String),
    ListRegions,
    Window(FeedWindow),
    Floor(f64),
    Search(String),
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<UserCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "refresh" | "r" => Ok(UserCommand::Refresh),
        "region" if !rest.is_empty() => Ok(UserCommand::Region(rest.to_string())),
        "region" => Err("usage: region <name>".to_string()),
        "regions" => Ok(UserCommand::ListRegions),
        "window" => rest.parse().map(UserCommand::Window),
        "floor" => rest
            .parse::<f64>()
            .map(UserCommand::Floor)
            .map_err(|_| format!("usage: floor <magnitude>, got '{}'", rest)),
        "search" => Ok(UserCommand::Search(rest.to_string())),
        "status" => Ok(UserCommand::Status),
        "help" | "?" | "" => Ok(UserCommand::Help),
        "quit" | "exit" | "q" => Ok(UserCommand::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

fn execute(command: UserCommand, tracker: &MonitorHandle, catalogue: &[Region], search: &mut String) {
    let result = match command {
        UserCommand::Refresh => tracker.refresh(),
        UserCommand::Region(name) => match regions::find_in(catalogue, &name) {
            Some(region) => tracker.set_region(region.clone()),
            None => {
                println!("unknown region '{}', try 'regions'", name);
                Ok(())
            }
        },
        UserCommand::ListRegions => {
            for region in catalogue {
                println!("  {:<18} {:>9.4} {:>10.4}  {}", region.name, region.latitude, region.longitude, region.label);
            }
            Ok(())
        }
        UserCommand::Window(window) => tracker.set_window(window),
        UserCommand::Floor(floor) => tracker.set_magnitude_floor(floor),
        UserCommand::Search(text) => {
            *search = text;
            print_snapshot(&tracker.snapshot(), search);
            Ok(())
        }
        UserCommand::Status => {
            print_snapshot(&tracker.snapshot(), search);
            Ok(())
        }
        UserCommand::Help => {
            println!("commands: refresh | region <name> | regions | window <hour|day|week> | floor <m> | search [text] | status | quit");
            Ok(())
        }
        UserCommand::Quit => Ok(()),
    };
    if let Err(e) = result {
        println!("{}", e);
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_alert(state: &AlertState) {
    if state.is_active() {
        println!("\n*** [{}] {}\n", state.level.to_string().to_uppercase(), state.message);
    } else {
        println!("--- alert cleared");
    }
}

fn print_snapshot(snapshot: &MonitorSnapshot, search: &str) {
    println!(
        "\n{} • last {} • M{}+ • {}",
        snapshot.region.name,
        snapshot.window,
        snapshot.magnitude_floor,
        snapshot
            .last_updated
            .map(|t| format!("updated {}", t.format("%H:%M:%S UTC")))
            .unwrap_or_else(|| "not yet updated".to_string())
    );
    if let Some(error) = &snapshot.error {
        println!("  ⚠ {} (showing previous data, retrying)", error);
    }

    let nearby = filter_by_place(&snapshot.nearby, search);
    println!("  Nearby ({}):", nearby.len());
    for event in nearby.iter().take(LIST_PREVIEW) {
        println!("    {}", event_line(event, &snapshot.region));
    }

    let global = filter_by_place(&snapshot.global, search);
    println!("  Global ({}):", global.len());
    for event in global.iter().take(LIST_PREVIEW) {
        println!("    {}", event_line(event, &snapshot.region));
    }
}

fn event_line(event: &SeismicEvent, region: &Region) -> String {
    let time = Utc
        .timestamp_millis_opt(event.occurred_at_ms)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    format!(
        "M{:.1} {} • {} • {} • {} ({}){}",
        event.magnitude,
        event.place,
        time,
        distance_label(region, event),
        simple_description(event.magnitude),
        risk_description(event.magnitude),
        if event.tsunami { " • TSUNAMI" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("refresh"), Ok(UserCommand::Refresh));
        assert_eq!(
            parse_command("region  Metro Manila "),
            Ok(UserCommand::Region("Metro Manila".to_string()))
        );
        assert_eq!(parse_command("window WEEK"), Ok(UserCommand::Window(FeedWindow::Week)));
        assert_eq!(parse_command("floor 4.5"), Ok(UserCommand::Floor(4.5)));
        assert_eq!(parse_command("search"), Ok(UserCommand::Search(String::new())));
        assert_eq!(parse_command("quit"), Ok(UserCommand::Quit));
        assert_eq!(parse_command(""), Ok(UserCommand::Help));
    }

    #[test]
    fn test_event_line_shows_labels_and_risk() {
        let region = regions::default_region();
        let event = SeismicEvent {
            id: "us7000abcd".to_string(),
            magnitude: 6.4,
            place: "10 km S of Davao, Philippines".to_string(),
            occurred_at_ms: 0,
            updated_at_ms: 0,
            longitude: 125.5,
            latitude: 7.0,
            depth_km: 12.0,
            tsunami: true,
            significance: 630,
        };
        assert_eq!(
            event_line(&event, &region),
            "M6.4 10 km S of Davao, Philippines • 00:00:00 • 22km from Davao City • \
             Dangerous (Strong earthquake - damaging) • TSUNAMI"
        );
    }

    #[test]
    fn test_parse_command_errors() {
        assert!(parse_command("region").is_err());
        assert!(parse_command("window month").is_err());
        assert!(parse_command("floor big").is_err());
        assert!(parse_command("launch").is_err());
    }
}
