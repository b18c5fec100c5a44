use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_set;
mod cmd_get;
mod cmd_del;
mod cmd_list;
mod cmd_batch;
mod cmd_flush;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./snapcache ...
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Set { path, key, value } =>
            cmd_set::exec(path, key, value),

        cli::Cmd::Get { path, key, out, json } =>
            cmd_get::exec(path, key, out, json),

        cli::Cmd::Del { path, key } =>
            cmd_del::exec(path, key),

        cli::Cmd::List { path, json } =>
            cmd_list::exec(path, json),

        cli::Cmd::Batch { path, ops_file, ops_json } =>
            cmd_batch::exec(path, ops_file, ops_json),

        cli::Cmd::Flush { path, codec } =>
            cmd_flush::exec(path, codec),

        cli::Cmd::Status { path, json } =>
            cmd_status::exec(path, json),
    }
}
