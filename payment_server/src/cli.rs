use std::{env, env::VarError};

// Only these variables are echoed back. Anything holding a key or secret stays off this list.
const DISPLAY_ENVS: [&str; 13] = [
    "RUST_LOG",
    "PGW_HOST",
    "PGW_PORT",
    "PGW_DATABASE_URL",
    "PGW_PROCESSOR",
    "PGW_BTCPAY_URL",
    "PGW_BTCPAY_STORE_ID",
    "PGW_NOWPAYMENTS_URL",
    "PGW_NOWPAYMENTS_CHECKOUT_URL",
    "PGW_ALLOW_UNSIGNED_WEBHOOKS",
    "PGW_INVOICE_CATALOG",
    "PGW_INVOICE_CATALOG_FILE",
    "PGW_TRANSACTION_RETENTION_DAYS",
];

/// The server has no command line options. Any argument at all prints the help text and the current (non-secret)
/// configuration. Returns true if the help was printed, in which case the caller should exit.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        println!("\n{}\n", include_str!("./cli-help.txt"));
        println!("Current environment values (EXCLUDING variables that contain secrets):");
        for (name, val) in environment_summary() {
            println!("  {name:<35} {val:<15}");
        }
    }
    has_cli_args
}

pub fn environment_summary() -> Vec<(&'static str, String)> {
    DISPLAY_ENVS
        .iter()
        .map(|&name| {
            let val = match env::var(name) {
                Ok(s) => s,
                Err(VarError::NotPresent) => "Not set".into(),
                Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
            };
            (name, val)
        })
        .collect()
}
