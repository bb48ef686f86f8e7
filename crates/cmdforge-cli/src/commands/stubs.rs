//! `session` and `update check|install`: self-update and the interactive
//! REPL are out of scope, but the CLI surface still has to name them.

pub fn session() -> ! {
    eprintln!("interactive session is not implemented in this build");
    std::process::exit(1);
}

pub fn update() -> ! {
    eprintln!("self-update is not implemented in this build");
    std::process::exit(1);
}
