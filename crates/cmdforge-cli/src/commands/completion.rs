//! `completion <shell>`.

use clap::CommandFactory;
use clap_complete::Shell;
use clap_complete::generate;

use crate::cli::Cli;

pub fn run(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut std::io::stdout());
}
