// src/bin/cli.rs
fn main() -> color_eyre::Result<()> {
    eden::cli::run()
}
