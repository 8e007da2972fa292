//! Availability probes for compiler tools.

use std::path::Path;

use super::CompileError;

/// Check that a configured command can be launched.
///
/// Verifies the program is on PATH (via `which`), and for `java -jar <jar>`
/// style commands that the jar file exists.
pub fn probe_command(command: &[String], hint: &str) -> Result<(), CompileError> {
    let Some(program) = command.first() else {
        return Err(CompileError::Unavailable {
            tool: "(empty command)".into(),
            hint: hint.into(),
        });
    };

    if which::which(program).is_err() {
        return Err(CompileError::Unavailable {
            tool: program.clone(),
            hint: program_hint(program, hint),
        });
    }

    if let Some(jar) = jar_argument(command)
        && !Path::new(jar).is_file()
    {
        return Err(CompileError::Unavailable {
            tool: jar.to_string(),
            hint: format!("jar file not found; {hint}"),
        });
    }

    Ok(())
}

/// Hint for well-known launcher programs, falling back to the tool hint.
fn program_hint(program: &str, hint: &str) -> String {
    match program {
        "java" => format!("install a Java runtime (e.g. https://adoptium.net); {hint}"),
        "docker" => format!("install Docker and make sure the daemon is running; {hint}"),
        "npx" | "node" => format!("install Node.js (https://nodejs.org); {hint}"),
        _ => hint.to_string(),
    }
}

fn jar_argument(command: &[String]) -> Option<&str> {
    command
        .windows(2)
        .find(|pair| pair[0] == "-jar")
        .map(|pair| pair[1].as_str())
}
