use clap::Parser;
use lua_auth_keys::cli::{self, Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config();

    match cli.command {
        Command::Console => cli::console::run(&config, &cli.options).await,
        command => cli::keys::run(&config, &cli.options, command).await,
    }
}
