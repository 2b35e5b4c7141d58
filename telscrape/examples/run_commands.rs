//! Run a list of commands on an OLT over telnet.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example run_commands -- --host 10.0.0.1 --user admin --password secret \
//!     --platform HUAWEI "display version" "display board 0"
//! ```
//!
//! Use `--error-marker` (repeatable) to fail on device error text:
//!
//! ```bash
//! cargo run --example run_commands -- --host 10.0.0.1 --user admin --password secret \
//!     --error-marker "% Unknown command" "display ont info 0 all"
//! ```

use std::env;
use std::time::Duration;

use telscrape::{ConnectionConfig, Executor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.commands.is_empty() {
        Args::print_help();
        std::process::exit(1);
    }

    let mut config = ConnectionConfig::new(&args.host, &args.user, &args.password)
        .with_port(args.port)
        .with_timeout(Duration::from_secs(args.timeout));
    if let Some(platform) = &args.platform {
        config = config.with_platform(platform);
    }

    println!("Connecting to {}:{}...", args.host, args.port);

    let executor = Executor::new();
    let results = executor
        .execute_each(&config, &args.commands, &args.error_markers)
        .await?;

    for result in &results {
        println!("\n{} ({} page(s), {:?})", result.command, result.pages + 1, result.elapsed);
        println!("{}", "-".repeat(50));
        print!("{}", result);
    }

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    platform: Option<String>,
    timeout: u64,
    error_markers: Vec<String>,
    commands: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 23,
            user: env::var("USER").unwrap_or_else(|_| "root".to_string()),
            password: String::new(),
            platform: None,
            timeout: 30,
            error_markers: Vec::new(),
            commands: Vec::new(),
        };

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => parsed.host = args.next().unwrap_or(parsed.host),
                "--port" | "-p" => {
                    parsed.port = args.next().and_then(|v| v.parse().ok()).unwrap_or(23)
                }
                "--user" | "-u" => parsed.user = args.next().unwrap_or(parsed.user),
                "--password" | "-P" => parsed.password = args.next().unwrap_or_default(),
                "--platform" => parsed.platform = args.next(),
                "--timeout" | "-t" => {
                    parsed.timeout = args.next().and_then(|v| v.parse().ok()).unwrap_or(30)
                }
                "--error-marker" | "-e" => parsed.error_markers.extend(args.next()),
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => parsed.commands.push(arg),
            }
        }

        parsed
    }

    fn print_help() {
        println!(
            r#"telscrape run_commands example

USAGE:
    cargo run --example run_commands -- [OPTIONS] <COMMAND>...

OPTIONS:
    -h, --host <HOST>            Target host [default: localhost]
    -p, --port <PORT>            Telnet port [default: 23]
    -u, --user <USER>            Username [default: $USER]
    -P, --password <PASS>        Password
        --platform <NAME>        HUAWEI or ZTE [default: HUAWEI]
    -t, --timeout <SECS>         Connect and login timeout [default: 30]
    -e, --error-marker <TEXT>    Fail when output contains TEXT (repeatable)
    --help                       Print this help message"#
        );
    }
}
