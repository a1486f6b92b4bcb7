//! Line-oriented driver for the map screen, used by the `mapmarks` binary.
//!
//! Stands in for a real map toolkit: map-surface calls are printed, and
//! gestures and location fixes are typed as commands.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::app::App;
use crate::geometry::{CameraTarget, LatLng};
use crate::location::{LocationProvider, LocationRequest, LocationResult};
use crate::presentation::{marker_snippet, MapSurface, PinId, PinSpec};
use crate::workflow::PersistenceFailure;

pub const HELP: &str = "\
commands:
  press <lat> <lon>    long-press the map at a coordinate
  locate <lat> <lon>   deliver a location fix
  grant | deny         answer the location permission request
  center               move the camera to the current location
  clear                delete every marker
  list                 show markers
  info <lat> <lon>     show the info window for a coordinate
  help                 show this text
  quit                 exit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Press(LatLng),
    Locate(LatLng),
    Grant,
    Deny,
    Center,
    Clear,
    List,
    Info(LatLng),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command `{0}`; type `help`")]
    UnknownCommand(String),
    #[error("`{command}` expects <lat> <lon>")]
    MissingCoordinate { command: String },
    #[error("`{value}` is not a number")]
    InvalidNumber { value: String },
    #[error("`{command}` takes no arguments")]
    UnexpectedArgument { command: String },
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> ConsoleResult<Option<ConsoleCommand>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let parsed = match command {
        "press" => ConsoleCommand::Press(parse_coordinate(command, &args)?),
        "locate" => ConsoleCommand::Locate(parse_coordinate(command, &args)?),
        "info" => ConsoleCommand::Info(parse_coordinate(command, &args)?),
        "grant" | "deny" | "center" | "clear" | "list" | "help" | "quit" | "exit" => {
            if !args.is_empty() {
                return Err(ConsoleError::UnexpectedArgument {
                    command: command.to_string(),
                });
            }
            match command {
                "grant" => ConsoleCommand::Grant,
                "deny" => ConsoleCommand::Deny,
                "center" => ConsoleCommand::Center,
                "clear" => ConsoleCommand::Clear,
                "list" => ConsoleCommand::List,
                "help" => ConsoleCommand::Help,
                _ => ConsoleCommand::Quit,
            }
        }
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };
    Ok(Some(parsed))
}

fn parse_coordinate(command: &str, args: &[&str]) -> ConsoleResult<LatLng> {
    let [lat, lon] = args else {
        return Err(ConsoleError::MissingCoordinate {
            command: command.to_string(),
        });
    };
    Ok(LatLng::new(parse_number(lat)?, parse_number(lon)?))
}

fn parse_number(value: &str) -> ConsoleResult<f64> {
    value.parse().map_err(|_| ConsoleError::InvalidNumber {
        value: value.to_string(),
    })
}

/// Map surface that describes each call as a line of text.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    lines: Vec<String>,
    next_id: u64,
}

impl ConsoleSurface {
    pub fn drain_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl MapSurface for ConsoleSurface {
    fn add_pin(&mut self, pin: &PinSpec) -> Option<PinId> {
        let id = PinId(self.next_id);
        self.next_id += 1;
        self.lines
            .push(format!("[map] pin #{} \"{}\" at {}", id.0, pin.title, pin.position));
        Some(id)
    }

    fn move_pin(&mut self, id: PinId, position: LatLng) {
        self.lines.push(format!("[map] pin #{} moved to {position}", id.0));
    }

    fn remove_pin(&mut self, id: PinId) {
        self.lines.push(format!("[map] pin #{} removed", id.0));
    }

    fn show_info_window(&mut self, id: PinId) {
        self.lines.push(format!("[map] info window for pin #{}", id.0));
    }

    fn move_camera(&mut self, target: CameraTarget) {
        self.lines.push(format!(
            "[map] camera to {} at zoom {}",
            target.position, target.zoom
        ));
    }
}

/// Location provider for typed-in fixes; it only records that updates were
/// requested.
#[derive(Debug, Default)]
pub struct ConsoleLocationProvider {
    active: bool,
}

impl ConsoleLocationProvider {
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl LocationProvider for ConsoleLocationProvider {
    fn request_updates(&mut self, request: LocationRequest) -> LocationResult<()> {
        tracing::info!(priority = ?request.priority, "location updates requested");
        self.active = true;
        Ok(())
    }

    fn stop_updates(&mut self) {
        self.active = false;
    }
}

pub type ConsoleApp = App<ConsoleSurface, ConsoleLocationProvider>;

/// Reads commands from `input` until EOF or `quit`, writing results to
/// `output`.
pub fn run_console<R: BufRead, W: Write>(
    app: &mut ConsoleApp,
    input: R,
    output: &mut W,
) -> io::Result<()> {
    report_failures(app.settle(), output)?;
    flush_map(app, output)?;
    write_marker_list(app, output)?;

    for line in input.lines() {
        let line = line?;
        report_failures(app.pump(), output)?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        execute(app, command, output)?;
        flush_map(app, output)?;
    }

    report_failures(app.shutdown(), output)?;
    flush_map(app, output)
}

fn execute<W: Write>(
    app: &mut ConsoleApp,
    command: ConsoleCommand,
    output: &mut W,
) -> io::Result<()> {
    match command {
        ConsoleCommand::Press(point) => match app.on_map_long_press(point) {
            Ok(record) => writeln!(output, "{}", marker_snippet(&record)),
            Err(err) => writeln!(output, "error: {err}"),
        },
        ConsoleCommand::Locate(fix) => {
            if app.on_location_update(fix) {
                Ok(())
            } else {
                writeln!(output, "location ignored: updates are not active")
            }
        }
        ConsoleCommand::Grant | ConsoleCommand::Deny => {
            match app.on_permission_result(command == ConsoleCommand::Grant) {
                Ok(()) => writeln!(output, "state: {:?}", app.state()),
                Err(err) => writeln!(output, "error: {err}"),
            }
        }
        ConsoleCommand::Center => match app.on_center_pressed() {
            Ok(Some(_)) => Ok(()),
            Ok(None) => writeln!(output, "no location yet"),
            Err(err) => writeln!(output, "error: {err}"),
        },
        ConsoleCommand::Clear => match app.on_clear_pressed() {
            Ok(()) => writeln!(output, "markers cleared"),
            Err(err) => writeln!(output, "error: {err}"),
        },
        ConsoleCommand::List => write_marker_list(app, output),
        ConsoleCommand::Info(position) => {
            let window = app.info_window_at(position);
            writeln!(output, "{}\n{}", window.title, window.snippet)
        }
        ConsoleCommand::Help => writeln!(output, "{HELP}"),
        ConsoleCommand::Quit => Ok(()),
    }
}

fn write_marker_list<W: Write>(app: &ConsoleApp, output: &mut W) -> io::Result<()> {
    let markers = app.markers();
    writeln!(output, "{} marker(s)", markers.len())?;
    for (index, record) in markers.iter().enumerate() {
        writeln!(
            output,
            "{}. {}",
            index + 1,
            marker_snippet(record).replace('\n', " | ")
        )?;
    }
    Ok(())
}

fn flush_map<W: Write>(app: &mut ConsoleApp, output: &mut W) -> io::Result<()> {
    let lines = app.map_mut().surface_mut().drain_lines();
    for line in lines {
        writeln!(output, "{line}")?;
    }
    Ok(())
}

fn report_failures<W: Write>(
    failures: Vec<PersistenceFailure>,
    output: &mut W,
) -> io::Result<()> {
    for failure in failures {
        writeln!(output, "warning: {failure}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::notification::Notifier;
    use crate::storage::InMemoryMarkerStore;
    use std::sync::Arc;

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn notify(&self, _body: &str) {}
    }

    fn console_app() -> ConsoleApp {
        let mut app = App::new(
            AppConfig::default(),
            Arc::new(InMemoryMarkerStore::new()),
            ConsoleSurface::default(),
            ConsoleLocationProvider::default(),
            Box::new(SilentNotifier),
        );
        app.on_map_ready().expect("map should become ready");
        app
    }

    fn run_script(script: &str) -> String {
        let mut app = console_app();
        let mut output = Vec::new();
        run_console(&mut app, script.as_bytes(), &mut output).expect("console should run");
        String::from_utf8(output).expect("output should be utf-8")
    }

    #[test]
    fn parses_coordinates_and_bare_commands() {
        assert_eq!(
            parse_command("press 10 -20.5"),
            Ok(Some(ConsoleCommand::Press(LatLng::new(10.0, -20.5))))
        );
        assert_eq!(parse_command("  clear  "), Ok(Some(ConsoleCommand::Clear)));
        assert_eq!(parse_command("exit"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(
            parse_command("press 10"),
            Err(ConsoleError::MissingCoordinate {
                command: "press".to_string()
            })
        );
        assert_eq!(
            parse_command("locate north 3"),
            Err(ConsoleError::InvalidNumber {
                value: "north".to_string()
            })
        );
        assert_eq!(
            parse_command("clear all"),
            Err(ConsoleError::UnexpectedArgument {
                command: "clear".to_string()
            })
        );
        assert!(matches!(
            parse_command("fly"),
            Err(ConsoleError::UnknownCommand(_))
        ));
    }

    #[test]
    fn scripted_session_places_and_lists_markers() {
        let output = run_script("grant\nlocate 10 21\npress 10 20\nlist\nquit\npress 1 1\n");

        assert!(output.contains("state: Tracking"));
        assert!(output.contains("[map] camera to (10, 21) at zoom 15"));
        assert!(output.contains("Latitude: 10, Longitude: 20\nDistance: 109.6 km"));
        assert!(output.contains("1 marker(s)"));
        assert!(!output.contains("Latitude: 1, Longitude: 1"));
    }

    #[test]
    fn errors_are_reported_and_the_loop_continues() {
        let output = run_script("bogus\ncenter\nlocate 1 1\nclear\nlist\n");
        assert!(output.contains("error: unknown command `bogus`"));
        assert!(output.contains("no location yet"));
        assert!(output.contains("location ignored"));
        assert!(output.contains("markers cleared"));
        assert!(output.trim_end().ends_with("0 marker(s)"));
    }
}
