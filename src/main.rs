use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = gelf_relay::cli::Cli::parse();
    if let Err(e) = gelf_relay::cmd::dispatch(cli).await {
        eprintln!("Error: {}", gelf_relay::error::error_chain(&e));
        std::process::exit(1);
    }
}
