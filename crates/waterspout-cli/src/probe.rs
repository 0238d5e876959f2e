//! `waterspout probe`: what the CPU offers and what the dispatcher picks.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use waterspout_core::{cpu, Endianness, Engine, FeatureMask, Tier, TierSelector};

/// Everything `probe` prints, in one serializable record.
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub vendor: Option<String>,
    pub endianness: Endianness,
    pub features: FeatureMask,
    pub requested: TierSelector,
    pub selected: Tier,
    pub chain: Vec<Tier>,
    pub available: Vec<Tier>,
}

impl ProbeReport {
    pub fn new(requested: TierSelector, engine: &Engine) -> Self {
        let info = cpu::init();
        Self {
            vendor: info.vendor.clone(),
            endianness: info.endianness,
            features: info.features,
            requested,
            selected: engine.tier(),
            chain: engine.chain().collect(),
            available: Engine::available(),
        }
    }
}

pub fn print(report: &ProbeReport) {
    println!("{}", "CPU".bold());
    println!("  Vendor:     {}", report.vendor.as_deref().unwrap_or("unknown"));
    println!("  Endianness: {}", report.endianness);
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Feature", "Present"]);
    for (name, present) in report.features.report() {
        let mark = if present {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(name), mark]);
    }
    println!("{table}");
    println!();

    let chain: Vec<&str> = report.chain.iter().map(|t| t.name()).collect();
    let available: Vec<&str> = report.available.iter().map(|t| t.name()).collect();
    println!("{}", "Dispatch".bold());
    println!("  Available:  {}", available.join(" "));
    println!("  Requested:  {}", report.requested);
    println!("  Selected:   {}", report.selected.name().green());
    println!("  Chain:      {}", chain.join(" -> "));
}
