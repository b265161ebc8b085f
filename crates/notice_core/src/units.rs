use std::sync::LazyLock;

use notice_logging::notice_warn;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::text::element_text;

/// Units carried per record; missing units stay as empty slots.
pub const UNIT_SLOTS: usize = 3;

/// Column names of the flattened unit vector, in output order.
pub const UNIT_FIELD_NAMES: [&str; UNIT_SLOTS * 6] = [
    "Current PWR 1",
    "Current PWR 2",
    "Current PWR 3",
    "Current RX Mode 1",
    "Current RX Mode 2",
    "Current RX Mode 3",
    "Initial PWR 1",
    "Initial PWR 2",
    "Initial PWR 3",
    "Initial RX Mode 1",
    "Initial RX Mode 2",
    "Initial RX Mode 3",
    "RX CRIT 1",
    "RX CRIT 2",
    "RX CRIT 3",
    "Scram Code 1",
    "Scram Code 2",
    "Scram Code 3",
];

const CURRENT_POWER: &[&str] = &["Current PWR"];
const CURRENT_MODE: &[&str] = &["Current RX Mode"];
const INITIAL_POWER: &[&str] = &["Initial PWR"];
const INITIAL_MODE: &[&str] = &["Initial RX Mode"];
const CRITICALITY: &[&str] = &["RX CRIT", "RX Crit"];
const SCRAM_CODE: &[&str] = &["SCRAM Code", "SCAM Code"];

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    /// 1-based position of the unit row in the table.
    pub unit_index: u8,
    pub current_power: Option<String>,
    pub current_mode: Option<String>,
    pub initial_power: Option<String>,
    pub initial_mode: Option<String>,
    pub critical_flag: Option<String>,
    pub scram_code: Option<String>,
}

/// Fixed-width three-unit frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitFrame {
    pub units: [Option<UnitStatus>; UNIT_SLOTS],
}

impl UnitFrame {
    pub fn present_units(&self) -> usize {
        self.units.iter().filter(|u| u.is_some()).count()
    }

    /// Flattens to the 18 values named by [`UNIT_FIELD_NAMES`].
    pub fn to_vector(&self) -> Vec<Option<String>> {
        let getters: [fn(&UnitStatus) -> &Option<String>; 6] = [
            |u| &u.current_power,
            |u| &u.current_mode,
            |u| &u.initial_power,
            |u| &u.initial_mode,
            |u| &u.critical_flag,
            |u| &u.scram_code,
        ];
        getters
            .iter()
            .flat_map(|get| {
                self.units
                    .iter()
                    .map(move |unit| unit.as_ref().and_then(|u| get(u).clone()))
            })
            .collect()
    }

    pub fn named_fields(&self) -> Vec<(&'static str, Option<String>)> {
        UNIT_FIELD_NAMES.iter().copied().zip(self.to_vector()).collect()
    }
}

/// Finds the first table whose first cell reads `Unit` and reads one unit
/// per data row. Returns `None` when the markup has no unit table.
pub fn extract_unit_table(markup: &str) -> Option<UnitFrame> {
    let fragment = Html::parse_fragment(markup);
    let table = fragment.select(&TABLE_SEL).find(|table| {
        table
            .select(&CELL_SEL)
            .next()
            .is_some_and(|cell| cell_text(cell) == "Unit")
    })?;

    let rows: Vec<Vec<String>> = table
        .select(&ROW_SEL)
        .map(|row| row.select(&CELL_SEL).map(cell_text).collect())
        .collect();
    let table = SquaredTable::new(rows)?;

    if table.rows.len() > UNIT_SLOTS {
        notice_warn!(
            "Unit table has {} rows; keeping the first {}",
            table.rows.len(),
            UNIT_SLOTS
        );
    }

    let mut frame = UnitFrame::default();
    for (idx, slot) in frame.units.iter_mut().enumerate() {
        if idx >= table.rows.len() {
            break;
        }
        *slot = Some(UnitStatus {
            unit_index: idx as u8 + 1,
            current_power: table.cell(idx, CURRENT_POWER),
            current_mode: table.cell(idx, CURRENT_MODE),
            initial_power: table.cell(idx, INITIAL_POWER),
            initial_mode: table.cell(idx, INITIAL_MODE),
            critical_flag: table.cell(idx, CRITICALITY),
            scram_code: table.cell(idx, SCRAM_CODE),
        });
    }
    Some(frame)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    element_text(cell).trim().to_string()
}

/// Header plus data rows, each padded to the header width.
struct SquaredTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SquaredTable {
    fn new(mut rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let header = rows.remove(0);
        let width = header.len();
        for row in &mut rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
        Some(Self { header, rows })
    }

    /// Cell under the first header matching one of `names`, in preference order.
    fn cell(&self, row: usize, names: &[&str]) -> Option<String> {
        let column = names
            .iter()
            .find_map(|name| self.header.iter().position(|h| h == name))?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .filter(|value| !value.is_empty())
            .cloned()
    }
}
