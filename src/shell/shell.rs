use std::error::Error;
use std::io::Write;

use colored::*;
use rustyline::DefaultEditor;

use crate::config::Settings;
use super::command_handlers::{
    LastAnalysis,
    ShellContext,
    handle_health,
    handle_symptoms,
    handle_image,
    handle_save,
    handle_list_records,
    handle_get_record,
};

/// A parsed line of shell input
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Exit,
    Health,
    Symptoms(String),
    Image(String),
    Save(Option<String>),
    Records,
    Record(String),
    /// A known command with missing arguments; carries the usage line
    Usage(&'static str),
    Unknown(String),
}

/// Splits a line into a command keyword (case-insensitive) and its arguments.
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let (keyword, rest) = match input.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (input, ""),
    };

    match keyword.to_lowercase().as_str() {
        "help" => Command::Help,
        "clear" => Command::Clear,
        "exit" | "bye" | "quit" => Command::Exit,
        "health" => Command::Health,
        "records" => Command::Records,
        "symptoms" if rest.is_empty() => Command::Usage("symptoms <description of your symptoms>"),
        "symptoms" => Command::Symptoms(rest.to_string()),
        "image" if rest.is_empty() => Command::Usage("image <path to image file>"),
        "image" => Command::Image(rest.to_string()),
        "save" if rest.is_empty() => Command::Save(None),
        "save" => Command::Save(Some(rest.to_string())),
        "record" if rest.is_empty() => Command::Usage("record <id>"),
        "record" => Command::Record(rest.to_string()),
        _ => Command::Unknown(input.to_string()),
    }
}

// Add color constants
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BRIGHT_CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

fn print_help() {
    println!("\n{CYAN}Medi Shell Commands{RESET}");
    println!("{BRIGHT_CYAN}{}{RESET}", "=".repeat(60));
    println!("{GREEN}symptoms <text>{RESET}   - Analyze a description of symptoms");
    println!("{GREEN}image <path>{RESET}      - Classify a medical image");
    println!("{GREEN}save [notes]{RESET}      - Store the last analysis as a diagnosis record");
    println!("{GREEN}records{RESET}           - List stored diagnosis records");
    println!("{GREEN}record <id>{RESET}       - Show one diagnosis record");
    println!("{GREEN}health{RESET}            - Check that the server is up");
    println!("{GREEN}clear{RESET}             - Clear the screen");
    println!("{GREEN}help{RESET}              - Show this help message");
    println!("{GREEN}exit, bye, quit{RESET}   - Exit the shell");
    println!();
}

// --- Main Shell Loop ---

pub async fn shell_loop(settings: &Settings) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting medi shell");
    print_help();

    let mut rl = DefaultEditor::new()?;
    let client = reqwest::Client::new();
    // 0.0.0.0 is a bind address, connect through loopback instead
    let host = if settings.server.host == "0.0.0.0" { "127.0.0.1" } else { settings.server.host.as_str() };
    let server_url = format!("http://{}:{}", host, settings.server.port);
    let mut last_analysis: Option<LastAnalysis> = None;

    loop {
        let readline = rl.readline("medi > ");

        match readline {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input_trimmed);

                let mut context = ShellContext {
                    client: &client,
                    server_url: &server_url,
                    last_analysis: &mut last_analysis,
                };

                let outcome = match parse_command(input_trimmed) {
                    Command::Exit => {
                        println!("Goodbye!");
                        break;
                    }
                    Command::Help => {
                        print_help();
                        Ok(())
                    }
                    Command::Clear => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush().map_err(anyhow::Error::from)
                    }
                    Command::Health => handle_health(&context).await,
                    Command::Symptoms(text) => handle_symptoms(&mut context, &text).await,
                    Command::Image(path) => handle_image(&mut context, &path).await,
                    Command::Save(notes) => handle_save(&mut context, notes.as_deref()).await,
                    Command::Records => handle_list_records(&context).await,
                    Command::Record(id) => handle_get_record(&context, &id).await,
                    Command::Usage(usage) => {
                        println!("Usage: {}", usage);
                        Ok(())
                    }
                    Command::Unknown(line) => {
                        println!("Unknown command: {}. Type 'help' to see available commands.", line);
                        Ok(())
                    }
                };

                if let Err(e) = outcome {
                    println!("{} {:#}", "Error:".red().bold(), e);
                }
            },
            Err(_) => {
                println!("Goodbye!");
                break;
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("  QUIT "), Command::Exit);
        assert_eq!(parse_command("bye"), Command::Exit);
        assert_eq!(parse_command("records"), Command::Records);
        assert_eq!(parse_command("health"), Command::Health);
    }

    #[test]
    fn test_parse_keeps_argument_case() {
        assert_eq!(
            parse_command("Symptoms Cough and Sore Throat"),
            Command::Symptoms("Cough and Sore Throat".to_string())
        );
        assert_eq!(
            parse_command("image ./scans/Chest X-Ray.png"),
            Command::Image("./scans/Chest X-Ray.png".to_string())
        );
    }

    #[test]
    fn test_parse_save_notes_optional() {
        assert_eq!(parse_command("save"), Command::Save(None));
        assert_eq!(
            parse_command("save follow up next week"),
            Command::Save(Some("follow up next week".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert!(matches!(parse_command("symptoms"), Command::Usage(_)));
        assert!(matches!(parse_command("image   "), Command::Usage(_)));
        assert!(matches!(parse_command("record"), Command::Usage(_)));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_command("diagnose me"), Command::Unknown("diagnose me".to_string()));
    }
}
