//! Lay out a boom from a saved config and print the parts list and install
//! instructions.
//!
//! ```text
//! cargo run --example plan --features tracing -- tests/layouts/legacy_nested.json
//! ```

use boomplan::{BomTable, BoomStore};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut store = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| miette::miette!("failed to read {path}: {e}"))?;
            BoomStore::from_json(&text)
        }
        None => BoomStore::default(),
    };

    for warning in store.load_warnings() {
        eprintln!("{:?}", miette::Report::new(warning.clone()));
    }

    let layout = store.layout()?;
    for warning in &layout.warnings {
        eprintln!("{:?}", miette::Report::new(warning.clone()));
    }
    println!("{}", BomTable(&layout.bom));

    let document = store.generate_install()?;
    println!("{document}");
    Ok(())
}
