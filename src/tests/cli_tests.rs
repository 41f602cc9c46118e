use crate::{Args, Command};
use clap::Parser;

#[test]
fn serve_accepts_worker_override() {
    let args = Args::try_parse_from(["restaurant_agent", "serve", "--workers", "4"]).unwrap();
    match args.command {
        Command::Serve { workers, .. } => assert_eq!(workers.map(|w| w.get()), Some(4)),
        _ => panic!("expected serve"),
    }
}

#[test]
fn zero_workers_is_rejected() {
    assert!(Args::try_parse_from(["restaurant_agent", "serve", "--workers", "0"]).is_err());
}

#[test]
fn db_flag_works_after_subcommand() {
    let args = Args::try_parse_from(["restaurant_agent", "etl", "--db", "/tmp/r.db"]).unwrap();
    assert_eq!(args.db.as_deref(), Some(std::path::Path::new("/tmp/r.db")));
    assert!(matches!(args.command, Command::Etl { data_dir: None }));
}
