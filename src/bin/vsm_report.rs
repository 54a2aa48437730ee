//! Print a report for a value-stream map document
//!
//! ```text
//! vsm-report <document.json>          metrics and analyses of an exported map
//! vsm-report --wizard <wizard.json>   generate a map and print its export document
//! ```

use anyhow::{bail, Context, Result};
use cim_domain_vsm::generator::WizardInput;
use cim_domain_vsm::metrics::analysis::{self, WaitMethod};
use cim_domain_vsm::{ImportMode, VsmDocument, VsmWorkspace};
use std::fs;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [flag, path] if flag == "--wizard" => generate(path),
        [path] if !path.starts_with('-') => report(path),
        _ => bail!("usage: vsm-report <document.json> | vsm-report --wizard <wizard.json>"),
    }
}

fn generate(path: &str) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("reading wizard file {path}"))?;
    let input = WizardInput::from_json_str(&json)
        .with_context(|| format!("parsing wizard file {path}"))?;

    let mut workspace = VsmWorkspace::default();
    workspace
        .apply_wizard(&input, ImportMode::Replace)
        .context("applying generated map")?;
    let document = workspace
        .export_document()
        .to_json_pretty()
        .context("encoding export document")?;
    println!("{document}");
    Ok(())
}

fn report(path: &str) -> Result<()> {
    let document =
        VsmDocument::from_file(path).with_context(|| format!("loading document {path}"))?;
    let mut workspace = VsmWorkspace::default();
    workspace
        .import_document(document, ImportMode::Replace)
        .context("importing document")?;

    let map = workspace.map();
    let metrics = workspace.metrics().rounded();
    println!("Value-stream report: {path}");
    println!("  nodes: {}, edges: {}", map.node_count(), map.edge_count());
    println!("  takt time:       {:>10.2} s", metrics.takt_time);
    println!("  calculated takt: {:>10.2} s", metrics.calculated_takt);
    println!("  pitch:           {:>10.2} s", metrics.pitch);
    println!("  total CT:        {:>10.2} s", metrics.total_ct);
    println!("  total VA:        {:>10.2} s", metrics.total_va);
    println!("  total LT:        {:>10.2} s", metrics.total_lt);
    println!("  efficiency:      {:>10.2} %", metrics.efficiency);

    if let Some(bottleneck) = &workspace.report().bottleneck {
        println!(
            "  bottleneck: {} ({:.2} s)",
            bottleneck.name, bottleneck.cycle_time
        );
    }

    let takt = workspace.global_takt();
    let steps = analysis::analyze_steps(map, takt);
    if !steps.is_empty() {
        println!("\nProcess steps");
        for step in &steps {
            let loading = step
                .loading
                .map_or_else(|| "-".to_string(), |l| format!("{l:.1}%"));
            println!(
                "  {:<24} CT {:>8.2} s  OEE {:>5.1}%  loading {:>7}{}",
                step.name,
                step.cycle_time,
                step.oee * 100.0,
                loading,
                if step.over_takt { "  over takt" } else { "" }
            );
        }
    }

    if let Some(epei) = analysis::epei(map) {
        match epei.days {
            Some(days) => println!(
                "\nEPEI of {}: {:.2} days ({})",
                epei.node_id,
                days,
                if epei.healthy { "healthy" } else { "too long" }
            ),
            None => println!("\nEPEI of {}: no spare time for changeovers", epei.node_id),
        }
    }

    let path_ids = analysis::material_path(map);
    if let Some(ladder) =
        analysis::lead_time_ladder(map, &path_ids, WaitMethod::Takt, 0.0, takt)
    {
        println!("\nLead-time ladder ({} steps)", path_ids.len());
        for segment in &ladder.segments {
            println!("  {:<40} {:>10.2} s", segment.name, segment.seconds);
        }
        println!(
            "  lead time {:.2} s, PCE {:.2}%",
            ladder.lead_time, ladder.pce
        );
    }

    let stations = analysis::timeline(map);
    if !stations.is_empty() {
        println!("\nTimeline");
        for station in &stations {
            println!(
                "  {:<24} VA {:>10.2} s  NVA {:>12.2} s",
                station.name, station.va, station.nva
            );
        }
    }
    Ok(())
}
