//! demos/notebook_feed.rs
//!
//! A demo app that feeds a snapshot and a delta through a notebook session,
//! prints the selected output representation, and shows an insert intent
//! flowing out as an action record instead of mutating local state.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use quillbook::notebook::{Cell, CellKind, Delta, Notebook, Output, Snapshot, Update, Worksheet};
use quillbook::session::{ChannelDispatcher, NotebookSession};

fn demo_snapshot() -> Update {
    let mut worksheet = Worksheet {
        id: "w1".to_string(),
        ..Default::default()
    };
    let mut cell = Cell::new("c1", CellKind::Code);
    cell.source = "2 + 2".to_string();
    worksheet.cell_ids.push(cell.id.clone());
    worksheet.cells.insert(cell.id.clone(), cell);

    let mut notebook = Notebook {
        id: "demo-notebook".to_string(),
        ..Default::default()
    };
    notebook.worksheet_ids.push(worksheet.id.clone());
    notebook.worksheets.insert(worksheet.id.clone(), worksheet);

    Update::Snapshot(Snapshot { notebook })
}

fn demo_delta() -> Update {
    let mut bundle = HashMap::new();
    bundle.insert("text/plain".to_string(), "4".to_string());
    bundle.insert("text/html".to_string(), "<b>4</b>".to_string());

    let mut cell = Cell::new("c1", CellKind::Code);
    cell.source = "2 + 2".to_string();
    cell.execution_counter = Some(1);
    cell.outputs.push(Output {
        mimetype_bundle: bundle,
        ..Default::default()
    });

    Update::Delta(Delta {
        worksheet_id: "w1".to_string(),
        cells: vec![cell],
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let (updates_tx, updates_rx) = mpsc::channel(8);
    let (actions_tx, mut actions_rx) = mpsc::channel(8);
    let mut session = NotebookSession::new(updates_rx, Arc::new(ChannelDispatcher::new(actions_tx)));

    // The server side of the feed: one snapshot, then one delta
    updates_tx.send(demo_snapshot()).await?;
    updates_tx.send(demo_delta()).await?;
    drop(updates_tx);

    session.run().await;

    let worksheet = session
        .current_worksheet()
        .expect("snapshot should have selected a worksheet");
    println!("selected worksheet: {}", worksheet.id);

    let cell = session.cell("w1", "c1")?;
    let output = &cell.outputs[0];
    println!(
        "cell {} output rendered as {:?}: {:?}",
        cell.id,
        output.preferred_mimetype,
        output.trusted_html.as_ref().map(|h| h.as_html())
    );

    // User intent: nothing changes locally, an action record goes out
    session.insert_markdown_cell().await?;
    let record = actions_rx.recv().await.expect("action record");
    println!("emitted action {}: {:?}", record.id, record.action);

    Ok(())
}
