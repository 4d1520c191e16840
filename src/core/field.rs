//! Purpose: Name the tables and fields a FastTrack file can populate.
//! Exports: `TableKind`, `Field`, `FieldClass`.
//! Role: Resolves `(table, column index)` pairs found on disk into stable identities.
//! Invariants: `FIELDS` is ordered exactly like the `Field` variants.
//! Invariants: Indexes are unique within a table; unknown pairs resolve to `None`.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Activities,
    Resources,
    #[serde(rename = "actbars")]
    ActBars,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Activities, TableKind::Resources, TableKind::ActBars];

    /// Matches the uppercased name declared by a table definition block.
    pub fn from_declared_name(name: &str) -> Option<Self> {
        match name {
            "ACTIVITIES" => Some(TableKind::Activities),
            "RESOURCES" => Some(TableKind::Resources),
            "ACTBARS" => Some(TableKind::ActBars),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Activities => "activities",
            TableKind::Resources => "resources",
            TableKind::ActBars => "actbars",
        }
    }
}

/// Which unit-inference slot a duration-valued field feeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldClass {
    Plain,
    Duration,
    Work,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    ActivityId,
    ActivityName,
    StartDate,
    StartTime,
    FinishDate,
    FinishTime,
    Duration,
    PercentComplete,
    Predecessors,
    Successors,
    ResourcesAssigned,
    Milestone,
    Priority,
    ActivityNotes,
    OutlineLevel,
    Work,
    ActualDuration,
    RemainingDuration,
    Cost,
    ActivityCalendar,
    ActualStartDate,
    ActualFinishDate,
    TotalFloat,
    ActualWork,
    Critical,
    WbsCode,
    ResourceId,
    ResourceName,
    ResourceType,
    StandardRate,
    OvertimeRate,
    MaxUnits,
    Group,
    Email,
    ResourceNotes,
    ResourceWork,
    ResourceCalendar,
    BarActivityId,
    BarStartDate,
    BarFinishDate,
    BarDuration,
    BarStartTime,
    BarFinishTime,
    BarPercentComplete,
    BarWork,
}

struct FieldDef {
    field: Field,
    table: TableKind,
    index: u16,
    name: &'static str,
    class: FieldClass,
}

const fn def(
    field: Field,
    table: TableKind,
    index: u16,
    name: &'static str,
    class: FieldClass,
) -> FieldDef {
    FieldDef {
        field,
        table,
        index,
        name,
        class,
    }
}

use FieldClass::{Duration as D, Plain as P, Work as W};
use TableKind::{ActBars, Activities, Resources};

const FIELDS: &[FieldDef] = &[
    def(Field::ActivityId, Activities, 0, "Activity ID", P),
    def(Field::ActivityName, Activities, 1, "Activity Name", P),
    def(Field::StartDate, Activities, 2, "Start Date", P),
    def(Field::StartTime, Activities, 3, "Start Time", P),
    def(Field::FinishDate, Activities, 4, "Finish Date", P),
    def(Field::FinishTime, Activities, 5, "Finish Time", P),
    def(Field::Duration, Activities, 6, "Duration", D),
    def(Field::PercentComplete, Activities, 7, "Percent Complete", P),
    def(Field::Predecessors, Activities, 8, "Predecessors", P),
    def(Field::Successors, Activities, 9, "Successors", P),
    def(Field::ResourcesAssigned, Activities, 10, "Resources Assigned", P),
    def(Field::Milestone, Activities, 11, "Milestone", P),
    def(Field::Priority, Activities, 12, "Priority", P),
    def(Field::ActivityNotes, Activities, 13, "Notes", P),
    def(Field::OutlineLevel, Activities, 14, "Outline Level", P),
    def(Field::Work, Activities, 15, "Work", W),
    def(Field::ActualDuration, Activities, 16, "Actual Duration", D),
    def(Field::RemainingDuration, Activities, 17, "Remaining Duration", D),
    def(Field::Cost, Activities, 18, "Cost", P),
    def(Field::ActivityCalendar, Activities, 19, "Calendar", P),
    def(Field::ActualStartDate, Activities, 20, "Actual Start Date", P),
    def(Field::ActualFinishDate, Activities, 21, "Actual Finish Date", P),
    def(Field::TotalFloat, Activities, 22, "Total Float", D),
    def(Field::ActualWork, Activities, 23, "Actual Work", W),
    def(Field::Critical, Activities, 24, "Critical", P),
    def(Field::WbsCode, Activities, 25, "WBS Code", P),
    def(Field::ResourceId, Resources, 0, "Resource ID", P),
    def(Field::ResourceName, Resources, 1, "Resource Name", P),
    def(Field::ResourceType, Resources, 2, "Resource Type", P),
    def(Field::StandardRate, Resources, 3, "Standard Rate", P),
    def(Field::OvertimeRate, Resources, 4, "Overtime Rate", P),
    def(Field::MaxUnits, Resources, 5, "Max Units", P),
    def(Field::Group, Resources, 6, "Group", P),
    def(Field::Email, Resources, 7, "Email", P),
    def(Field::ResourceNotes, Resources, 8, "Notes", P),
    def(Field::ResourceWork, Resources, 9, "Work", W),
    def(Field::ResourceCalendar, Resources, 10, "Calendar", P),
    def(Field::BarActivityId, ActBars, 0, "Activity ID", P),
    def(Field::BarStartDate, ActBars, 1, "Bar Start Date", P),
    def(Field::BarFinishDate, ActBars, 2, "Bar Finish Date", P),
    def(Field::BarDuration, ActBars, 3, "Bar Duration", D),
    def(Field::BarStartTime, ActBars, 4, "Bar Start Time", P),
    def(Field::BarFinishTime, ActBars, 5, "Bar Finish Time", P),
    def(Field::BarPercentComplete, ActBars, 6, "Bar Percent Complete", P),
    def(Field::BarWork, ActBars, 7, "Bar Work", W),
];

impl Field {
    pub fn resolve(table: TableKind, index: u16) -> Option<Field> {
        FIELDS
            .iter()
            .find(|def| def.table == table && def.index == index)
            .map(|def| def.field)
    }

    fn def(self) -> &'static FieldDef {
        &FIELDS[self as usize]
    }

    pub fn table(self) -> TableKind {
        self.def().table
    }

    pub fn index(self) -> u16 {
        self.def().index
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn class(self) -> FieldClass {
        self.def().class
    }

    /// Stable snake_case key used in JSON output.
    pub fn key(self) -> String {
        let mut key = String::new();
        for ch in self.name().chars() {
            if ch.is_ascii_alphanumeric() {
                key.push(ch.to_ascii_lowercase());
            } else if !key.ends_with('_') {
                key.push('_');
            }
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::{FIELDS, Field, FieldClass, TableKind};
    use std::collections::HashSet;

    #[test]
    fn catalog_order_matches_variants() {
        for (position, def) in FIELDS.iter().enumerate() {
            assert_eq!(def.field as usize, position, "{:?} out of order", def.field);
        }
    }

    #[test]
    fn indexes_are_unique_per_table() {
        let mut seen = HashSet::new();
        for def in FIELDS {
            assert!(seen.insert((def.table, def.index)), "duplicate {:?}", def.field);
        }
    }

    #[test]
    fn resolves_by_table_and_index() {
        assert_eq!(Field::resolve(TableKind::Activities, 2), Some(Field::StartDate));
        assert_eq!(Field::resolve(TableKind::Resources, 1), Some(Field::ResourceName));
        assert_eq!(Field::resolve(TableKind::ActBars, 0), Some(Field::BarActivityId));
        assert_eq!(Field::resolve(TableKind::ActBars, 400), None);
    }

    #[test]
    fn table_names_resolve_from_uppercase() {
        assert_eq!(TableKind::from_declared_name("ACTIVITIES"), Some(TableKind::Activities));
        assert_eq!(TableKind::from_declared_name("Activities"), None);
        assert_eq!(TableKind::from_declared_name("ACTBARS"), Some(TableKind::ActBars));
        assert_eq!(TableKind::from_declared_name("calendars"), None);
    }

    #[test]
    fn duration_and_work_classes() {
        assert_eq!(Field::Duration.class(), FieldClass::Duration);
        assert_eq!(Field::BarWork.class(), FieldClass::Work);
        assert_eq!(Field::Cost.class(), FieldClass::Plain);
    }

    #[test]
    fn keys_are_snake_case() {
        assert_eq!(Field::ActivityId.key(), "activity_id");
        assert_eq!(Field::WbsCode.key(), "wbs_code");
        assert_eq!(Field::BarPercentComplete.key(), "bar_percent_complete");
    }
}
