use std::{env, env::VarError};

/// There's no real CLI for the server. `help` or `--help` prints the readme and the current environment; any other
/// invocation just runs the server.
pub fn handle_command_line_args() -> bool {
    let wants_help = env::args().nth(1).map(|arg| arg == "help" || arg == "--help").unwrap_or(false);
    if wants_help {
        display_readme();
        display_envs();
    }
    wants_help
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 9] = [
        "RUST_LOG",
        "BPG_HOST",
        "BPG_PORT",
        "BPG_DATABASE_URL",
        "BPG_STOREFRONT_URL",
        "BPG_TOKEN_TTL",
        "BPG_PAYMENT_API_URL",
        "BPG_USE_X_FORWARDED_FOR",
        "BPG_USE_FORWARDED",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
