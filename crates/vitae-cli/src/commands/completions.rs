use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::commands::common::write_atomically;
use crate::error::CliError;

const BIN_NAME: &str = "vitae";

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    let mut script = Vec::new();
    match shell {
        CompletionShell::Bash => render_into(shells::Bash, &mut command, &mut script),
        CompletionShell::Zsh => render_into(shells::Zsh, &mut command, &mut script),
        CompletionShell::Fish => render_into(shells::Fish, &mut command, &mut script),
    }
    script
}

pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);

    match output_path {
        Some(path) => {
            write_atomically(path, &String::from_utf8_lossy(&script))?;
            println!("{}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }
    Ok(())
}

fn render_into<G: Generator>(generator: G, command: &mut clap::Command, script: &mut Vec<u8>) {
    generate(generator, command, BIN_NAME, script);
}
