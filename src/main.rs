use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use linkpulse::api::JwtService;
use linkpulse::cli::{Cli, Commands};
use linkpulse::config::{StaticConfig, get_config, init_config, validate_config};
use linkpulse::errors::LinkpulseError;
use linkpulse::runtime::modes::run_server;
use linkpulse::system::logging::init_logging;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command_or_default() {
        Commands::GenerateConfig => {
            println!("{}", StaticConfig::generate_sample_config());
            ExitCode::SUCCESS
        }
        Commands::Token { owner_id } => {
            init_config(cli.config.as_deref());
            let config = get_config();
            if config.auth.jwt_secret.is_empty() {
                eprintln!(
                    "{} auth.jwt_secret is empty; the token will not be accepted by a running server",
                    "[WARN]".yellow().bold()
                );
            }
            match JwtService::from_config(&config.auth).issue_token(owner_id) {
                Ok(token) => {
                    println!("{}", token);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        LinkpulseError::config(format!("failed to issue token: {}", e))
                            .format_colored()
                    );
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Serve => serve(cli.config.as_deref()),
    }
}

fn serve(config_path: Option<&str>) -> ExitCode {
    init_config(config_path);
    let config = get_config();

    if let Err(e) = validate_config(&config) {
        eprintln!("{}", e.format_colored());
        return ExitCode::FAILURE;
    }

    // guard 需要存活到进程结束，保证日志刷盘
    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!(
                "{}",
                LinkpulseError::config(format!("failed to init logging: {:#}", e)).format_colored()
            );
            return ExitCode::FAILURE;
        }
    };

    let workers = config.server.cpu_count.max(1);
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", LinkpulseError::from(e).format_colored());
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run_server(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                LinkpulseError::config(format!("{:#}", e)).format_colored()
            );
            ExitCode::FAILURE
        }
    }
}
