use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use webgl_host::config::{self, Overrides};
use webgl_host::{logger, server, AppState, Config, StartupError};

/// Static file server for Unity WebGL builds
#[derive(Debug, Parser)]
#[command(name = "webgl-host", version, about)]
struct Args {
    /// Configuration file (TOML, extension optional)
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Document root, overrides `site.root`
    #[arg(long)]
    root: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), StartupError> {
    let overrides = Overrides {
        root: args.root.clone(),
        port: args.port,
    };
    let cfg = Config::load_with(&args.config, &overrides)?;

    if args.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(&cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg, &state.document_root);
    logger::log_info(&format!(
        "Environment overrides use the {}_ prefix, e.g. {}_SERVER__PORT",
        config::ENV_PREFIX,
        config::ENV_PREFIX
    ));

    let active = server::serve(listener, state, async {
        let signal = server::shutdown_signal().await;
        logger::log_shutdown(signal);
    })
    .await;

    if active > 0 {
        logger::log_info(&format!("{active} connection(s) still open at exit"));
    }
    Ok(())
}
