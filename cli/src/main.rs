mod commands;
mod rules;
mod terminal;
mod transport;

use commands::CommandLine;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    commands::fuzz::fuzz(commands).await
}
