//! Install instruction composer
//!
//! Builds a structured [`InstallDocument`] from a computed layout. The
//! document renders as plain text through `Display`; richer front ends can
//! walk the sections and tables directly.

use std::fmt;

use crate::config::{BoomConfig, HubMode};
use crate::layout::{HubPlacement, Layout};

pub const DEFAULT_TITLE: &str = "PinPoint III Boom Install Instructions";

const PREP_CHECKLIST: [&str; 9] = [
    "Install PowerHub using machine-specific mounting brackets or a universal mounting kit.",
    "If the power harness is installed, ensure the circuit breaker is tripped before continuing.",
    "Confirm the boom on the machine matches the boom drawing (nozzle count, spacing, folds).",
    "Flush/clean boom prior to valve install and confirm 80-mesh (or finer) strainers are installed.",
    "Install all solenoid valves onto spray bodies across the boom.",
    "IMPORTANT: Do not spin o-rings when installing Spitfire valves. Hold the coil stationary while tightening the flynut.",
    "VCM orientation: mount with connectors facing the ground or perpendicular to the ground. Do not face connectors upward.",
    "VCM orientation: keep the 12-pin DT connector labeled \"Left 1-6\" on the left and \"Right 7-12\" on the right.",
    "Installer workflow: start at the leftmost boom tip and work left to right.",
];

const VCM_MAP_NOTES: [&str; 4] = [
    "Mounting: Mount each VCM at the labeled position shown in the Boom Graphic.",
    "Nozzle Drop Harness Installation Rules: If a nozzle drop harness runs to the left of a VCM mounting position, \
     plug it into the VCM 12-pin connector labeled Left 1-6. If it runs to the right of a VCM mounting position, \
     plug it into the VCM 12-pin connector labeled Right 7-12.",
    "Nozzle Drop Harnesses Note: During installation of nozzle drop harnesses, drops may be skipped to go around \
     obstacles and fold joints.",
    "Dust plugs: Install 2-pin Weatherpack dust plugs on all nozzle harness drops not plugged into a valve \
     (see Dust Plugs column).",
];

const BEST_PRACTICES: [&str; 5] = [
    "Do not overtighten zip ties.",
    "Do not zip tie harnesses permanently until initial tests are completed.",
    "If a harness is too long and must be coiled, do not overbend it (never tighter than the radius of a soda can).",
    "Avoid routing over rough surfaces and sharp points.",
    "Add additional protection in high-friction areas.",
];

// ============================================================================
// Document model
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InstallDocument {
    pub title: String,
    /// Header facts such as machine and boom summary, as label/value pairs
    pub facts: Vec<(String, String)>,
    pub sections: Vec<Section>,
}

impl InstallDocument {
    pub fn section(&self, heading_prefix: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading.starts_with(heading_prefix))
    }

    pub fn fact(&self, label: &str) -> Option<&str> {
        self.facts.iter().find(|(l, _)| l == label).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

impl Section {
    fn new(heading: impl Into<String>) -> Self {
        Self { heading: heading.into(), blocks: Vec::new() }
    }

    fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// First table in the section
    pub fn table(&self) -> Option<&Table> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Every bullet in the section, in order
    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Bullets(items) => Some(items),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(String),
    Subheading(String),
    Bullets(Vec<String>),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Shown in place of the table when there are no rows
    pub empty: String,
}

impl Table {
    fn new(headers: &[&str], empty: &str) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            empty: empty.to_string(),
        }
    }
}

// ============================================================================
// Composition
// ============================================================================

fn hub_description(mode: HubMode) -> &'static str {
    match mode {
        HubMode::Lite => "PinPoint III Lite Hub (Ports 1–4)",
        HubMode::Standard => "PinPoint III Standard Hub (Ports 1–8)",
    }
}

fn hub_position(placement: HubPlacement) -> &'static str {
    match placement {
        HubPlacement::Center => "Mount PowerHub in the center.",
        HubPlacement::LeftOfCenter => "Mount PowerHub to the left of center.",
        HubPlacement::RightOfCenter => "Mount PowerHub to the right of center.",
    }
}

fn bullets(items: &[&str]) -> Block {
    Block::Bullets(items.iter().map(|s| s.to_string()).collect())
}

/// Compose installer instructions for a layout.
pub fn compose(layout: &Layout, config: &BoomConfig) -> InstallDocument {
    let geometry = &layout.geometry;

    let title = match config.name.trim() {
        "" => DEFAULT_TITLE.to_string(),
        name => name.to_string(),
    };

    let machine = [config.make.trim(), config.model.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let machine = if machine.is_empty() {
        "Unspecified machine".to_string()
    } else {
        machine
    };

    let mut facts = vec![
        ("Machine".to_string(), machine),
        (
            "Boom".to_string(),
            format!(
                "{}-nozzle boom @ {} spacing, {} ft wide",
                geometry.total_nozzles,
                geometry.spacing,
                geometry.width_feet()
            ),
        ),
        ("Hub".to_string(), hub_description(layout.hub_mode).to_string()),
    ];
    if !geometry.folds.is_empty() {
        let folds = geometry
            .folds
            .iter()
            .map(|f| format!("{} {}", f.kind, f.offset))
            .collect::<Vec<_>>()
            .join(", ");
        facts.push(("Folds".to_string(), format!("{folds} (nozzles from each end)")));
    }

    let mut prep: Vec<String> = PREP_CHECKLIST.iter().map(|s| s.to_string()).collect();
    prep.insert(
        1,
        format!(
            "PowerHub mounting position: {} Orient hub with power lugs at the bottom.",
            hub_position(geometry.hub_placement())
        ),
    );

    let sections = vec![
        Section::new("Section 1 – Prep & Verification").with(Block::Bullets(prep)),
        vcm_map(layout),
        extension_table(layout),
        terminators(layout),
    ];

    crate::log::debug!(title = %title, sections = sections.len(), "composed install document");
    InstallDocument { title, facts, sections }
}

fn vcm_map(layout: &Layout) -> Section {
    let mut table = Table::new(
        &["VCM", "Port", "Valves", "Used", "6-Drop Harnesses", "Dust Plugs", "CAN Terminator"],
        "No VCMs defined.",
    );
    for unit in layout.units_left_to_right() {
        let label = unit.label();
        let terminate = if layout.terminators().contains(&label) {
            "Terminate VCM"
        } else {
            ""
        };
        table.rows.push(vec![
            label,
            unit.port.to_string(),
            format!("{}–{}", unit.nozzle_start, unit.nozzle_end),
            unit.nozzle_count.to_string(),
            unit.drop_harnesses().to_string(),
            unit.dust_plugs().to_string(),
            terminate.to_string(),
        ]);
    }

    Section::new("Section 2 – VCM Map (Mount + Valve Ranges)")
        .with(Block::Paragraph(
            "Mount each VCM at the labeled position shown in the Boom Graphic.".to_string(),
        ))
        .with(Block::Table(table))
        .with(bullets(&VCM_MAP_NOTES))
}

fn extension_table(layout: &Layout) -> Section {
    let mut table = Table::new(&["From", "To", "Length"], "No extension harnesses required.");
    for edge in layout.edges_left_to_right() {
        table.rows.push(vec![
            edge.from.to_string(),
            edge.to.to_string(),
            format!("{}'", edge.length_ft),
        ]);
    }

    Section::new("Section 3 – Extension Harness Table")
        .with(Block::Paragraph(
            "Install extension harnesses per the Boom Graphic, use table as reference to boom graphic."
                .to_string(),
        ))
        .with(Block::Table(table))
        .with(Block::Subheading("Best Practices".to_string()))
        .with(bullets(&BEST_PRACTICES))
}

fn terminators(layout: &Layout) -> Section {
    let lines = layout
        .harness
        .chains
        .iter()
        .filter_map(|chain| {
            let unit = &layout.units[chain.terminal()?];
            Some(format!(
                "Port {}: Install chain terminator at outermost VCM {}.",
                chain.port,
                unit.label()
            ))
        })
        .collect::<Vec<_>>();

    let section = Section::new("Section 4 – CAN Terminators");
    if lines.is_empty() {
        section.with(Block::Paragraph("No chains to terminate.".to_string()))
    } else {
        section.with(Block::Bullets(lines))
    }
}

// ============================================================================
// Plain-text rendering
// ============================================================================

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "{}", self.empty);
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        write_row(f, &self.headers, &widths)?;
        write!(f, "|")?;
        for width in &widths {
            write!(f, "{}|", "-".repeat(width + 2))?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    write!(f, "|")?;
    for (cell, &width) in cells.iter().zip(widths) {
        write!(f, " {cell:<width$} |")?;
    }
    writeln!(f)
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Paragraph(text) => writeln!(f, "{text}"),
            Block::Subheading(text) => writeln!(f, "### {text}"),
            Block::Bullets(items) => items.iter().try_for_each(|item| writeln!(f, "- {item}")),
            Block::Table(table) => write!(f, "{table}"),
        }
    }
}

impl fmt::Display for InstallDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        for (label, value) in &self.facts {
            writeln!(f, "{label}: {value}")?;
        }
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "## {}", section.heading)?;
            for block in &section.blocks {
                writeln!(f)?;
                write!(f, "{block}")?;
            }
        }
        Ok(())
    }
}
