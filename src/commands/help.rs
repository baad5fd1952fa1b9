//! Help command for displaying command documentation

use crate::commands::Command;
use crate::error::Result;
use crate::ui::UI;

pub struct HelpCommand {
    command_name: Option<String>,
}

impl HelpCommand {
    pub fn new(command_name: Option<String>) -> Self {
        HelpCommand { command_name }
    }
}

fn command_help(name: &str) -> Option<&'static str> {
    let text = match name {
        "init" => {
            r#"robotr init - Initialize a new result repository

Usage: robotr [-C DIR] init

Creates the .robotr directory that stores one entry per build.

Examples:
  robotr init
  robotr -C /path/to/job init
"#
        }
        "load" => {
            r#"robotr load - Parse output files and store them as a new build

Usage: robotr load [OPTIONS]

Collects every file under output_path matching output_file_mask (see
.robotr.conf), merges them into one result and stores it as the next build.

Options:
  --force-init      Create the repository if it does not exist
  --allow-missing   Store a build without results when no file matches

Examples:
  robotr load
  robotr load --force-init
"#
        }
        "last" => {
            r#"robotr last - Show the results of a build

Usage: robotr last [OPTIONS]

Prints the totals of the most recent build with results, followed by the
failed tests with how long each has been failing.

Options:
  --build N     Show build N instead of the latest
  --no-output   Omit failure messages and traces

Examples:
  robotr last
  robotr last --build 12
"#
        }
        "failing" => {
            r#"robotr failing - Show currently failing tests

Usage: robotr failing [OPTIONS]

Lists the tests that failed in the most recent build, critical failures
first, with the build the failure streak started in.

Options:
  --list   Show test ids only (one per line)

Examples:
  robotr failing
  robotr failing --list
"#
        }
        "stats" => {
            r#"robotr stats - Show repository statistics

Usage: robotr stats

Displays the number of stored builds and the pass rates of the latest one.

Example:
  robotr stats
"#
        }
        "show" => {
            r#"robotr show - Show a suite or test

Usage: robotr show [--build N] PATH

PATH is the '/'-separated list of suite and test names, e.g.
"Root/Login/Valid password".

Examples:
  robotr show Root
  robotr show "Root/Login/Valid password" --build 3
"#
        }
        "trend" => {
            r#"robotr trend - Show pass/fail counts over recent builds

Usage: robotr trend [OPTIONS] [PATH]

Walks back from the latest build and prints passed, failed and skipped
counts per build, for the whole run or for the suite or test at PATH.

Options:
  --failures-only   Only count failures
  --critical-only   Only count critical tests
  --max-builds N    Number of builds to show, 0 for all

Examples:
  robotr trend
  robotr trend --max-builds 10 Root/Login
"#
        }
        "duration" => {
            r#"robotr duration - Show durations over recent builds

Usage: robotr duration [OPTIONS] [PATH]

Options:
  --max-builds N    Number of builds to show, 0 for all

Examples:
  robotr duration
  robotr duration Root/Login
"#
        }
        "help" => {
            r#"robotr help - Show help for commands

Usage: robotr help [COMMAND]

Shows general help or help for a specific command.

Examples:
  robotr help
  robotr help trend
"#
        }
        _ => return None,
    };
    Some(text)
}

impl Command for HelpCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        if let Some(ref cmd_name) = self.command_name {
            match command_help(cmd_name) {
                Some(text) => ui.output(text)?,
                None => {
                    ui.error(&format!("Unknown command: {}", cmd_name))?;
                    ui.output("Run 'robotr help' to see available commands.")?;
                    return Ok(1);
                }
            }
        } else {
            let help = r#"robotr - Robot Framework result history

Usage: robotr [-C DIR] <command> [options]

Available commands:
  init          Initialize a new result repository
  load          Parse output files and store them as a new build
  last          Show the results of a build
  failing       Show currently failing tests
  stats         Show repository statistics
  show          Show a suite or test
  trend         Show pass/fail counts over recent builds
  duration      Show durations over recent builds
  help          Show this help message

Run 'robotr help <command>' for more information on a specific command.

Examples:
  robotr init
  robotr load
  robotr failing --list
  robotr help trend
"#;
            ui.output(help)?;
        }
        Ok(0)
    }

    fn name(&self) -> &str {
        "help"
    }

    fn help(&self) -> &str {
        "Show help information for commands"
    }
}
