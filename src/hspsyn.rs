extern crate clap;
use clap::*;
use tracing_subscriber::EnvFilter;

mod cmd_hspsyn;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let app = Command::new("hspsyn")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`hspsyn` - Rescore HSPs and group them into synteny blocks")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_hspsyn::block::make_subcommand())
        .subcommand(cmd_hspsyn::score::make_subcommand())
        .after_help(
            r###"Subcommands:

* block - Rescore, de-duplicate and number HSPs into synteny blocks
* score - Six-frame score of two aligned nucleotide sequences

Set RUST_LOG=debug for per-line and per-pair details on stderr.

"###,
        );

    match app.get_matches().subcommand() {
        Some(("block", sub_matches)) => cmd_hspsyn::block::execute(sub_matches),
        Some(("score", sub_matches)) => cmd_hspsyn::score::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
