use color_eyre::Result;
use pipesh::{
    cmd::Executor,
    config::Config,
    input::{self, InputMessage, LineInput},
    state::State,
};
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::prelude::*;

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &config.log_dir,
        &config.log_file,
    ));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    // Keeps SIGINT from terminating the shell itself; each pipeline run
    // listens for it separately.
    let _interrupts = signal(SignalKind::interrupt())?;

    let mut state = State::new(config, Executor::default(), input::is_interactive());
    let mut input = LineInput::new();

    trace!(config = ?state.config, "starting shell");

    loop {
        state.render(&mut std::io::stdout().lock())?;

        match input.next().await {
            Ok(InputMessage::Line(line)) => {
                state.execute(&line).await;
            }
            Ok(InputMessage::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                error!("failed to read input: {err}");
                eprintln!("read error: {err}");
                break;
            }
        }
    }

    Ok(())
}
