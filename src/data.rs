use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// Type aliases for clarity
pub type ApplicantId = String;

/// Raw slot catalog as supplied by the caller: day -> batch -> start times.
pub type RawSlotCatalog = BTreeMap<Label, BTreeMap<Label, Vec<Label>>>;

/// The assignment grid as handed back to callers: day -> batch -> occupant per index.
pub type Schedule = BTreeMap<Label, BTreeMap<Label, Vec<Option<ApplicantId>>>>;

/// A day key, batch key or slot start time.
///
/// Input files use both `1` and `"1"` for the same day, so labels accept
/// either and are normalised to text. Ordering is numeric when both sides
/// are integers, integers sort before text, and text compares lexically.
/// Day `10` therefore follows day `2`, where a plain string sort would put it
/// first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Label(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label(value.to_string())
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label(value.to_string())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Label(text),
            Repr::Integer(n) => Label(n.to_string()),
            Repr::Float(x) => Label(x.to_string()),
        })
    }
}

/// All slots sharing the same (day, batch).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Group {
    pub day: Label,
    pub batch: Label,
}

impl Group {
    pub fn new(day: impl Into<Label>, batch: impl Into<Label>) -> Self {
        Group {
            day: day.into(),
            batch: batch.into(),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.day, self.batch)
    }
}

/// A single bookable slot. Ordering is (day, batch, index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef {
    pub group: Group,
    pub index: usize,
}

impl SlotRef {
    pub fn new(group: Group, index: usize) -> Self {
        SlotRef { group, index }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.group.day, self.group.batch, self.index
        )
    }
}

/// One applicant's submission.
///
/// Reading a record never fails. A missing or non-string timestamp becomes
/// text the roster cannot parse, and entries that are not a `[day, batch]`
/// pair are kept aside in `unreadable` so one bad submission cannot sink the
/// whole preferences file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreferenceRecord {
    pub timestamp: String,
    pub preferences: Vec<(Label, Label)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<String>,
}

impl From<Value> for PreferenceRecord {
    fn from(mut value: Value) -> Self {
        let timestamp = match value.get_mut("timestamp").map(Value::take) {
            Some(Value::String(text)) => text,
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        let entries = match value.get_mut("preferences").map(Value::take) {
            Some(Value::Array(entries)) => entries,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => vec![other],
        };

        let mut record = PreferenceRecord {
            timestamp,
            ..PreferenceRecord::default()
        };
        for entry in entries {
            match <(Label, Label)>::deserialize(&entry) {
                Ok(pair) => record.preferences.push(pair),
                Err(_) => record.unreadable.push(entry.to_string()),
            }
        }
        record
    }
}

impl<'de> Deserialize<'de> for PreferenceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PreferenceRecord::from)
    }
}

/// Preference records in the order they were submitted.
///
/// Deserialises from a JSON object and keeps the object's key order, which
/// is the enumeration order used for placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences(pub Vec<(ApplicantId, PreferenceRecord)>);

impl Preferences {
    pub fn iter(&self) -> impl Iterator<Item = &(ApplicantId, PreferenceRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ApplicantId, PreferenceRecord)> for Preferences {
    fn from_iter<I: IntoIterator<Item = (ApplicantId, PreferenceRecord)>>(iter: I) -> Self {
        Preferences(iter.into_iter().collect())
    }
}

impl Serialize for Preferences {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, record)| (id, record)))
    }
}

impl<'de> Deserialize<'de> for Preferences {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PreferencesVisitor;

        impl<'de> Visitor<'de> for PreferencesVisitor {
            type Value = Preferences;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of applicant id to preference record")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Preferences, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, record)) = map.next_entry::<ApplicantId, PreferenceRecord>()? {
                    entries.push((id, record));
                }
                Ok(Preferences(entries))
            }
        }

        deserializer.deserialize_map(PreferencesVisitor)
    }
}

/// Which procedure produces the primary assignment grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// First-fit placement in submission order.
    #[default]
    Greedy,
    /// Maximum-weight matching, with greedy placement filling any gaps.
    Optimal,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Greedy => f.write_str("greedy"),
            Strategy::Optimal => f.write_str("optimal"),
        }
    }
}

/// Which matching engine the optimal strategy uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Integer program solved by HiGHS.
    #[default]
    Highs,
    /// Combinatorial augmenting-path matching.
    Augmenting,
}

/// The complete input for one scheduling run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub slots: RawSlotCatalog,
    pub preferences: Preferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

/// An input anomaly that was tolerated by dropping data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputIssue {
    UnparsableTimestamp {
        applicant: ApplicantId,
        timestamp: String,
    },
    UnknownGroup {
        applicant: ApplicantId,
        day: Label,
        batch: Label,
    },
    UnreadablePreference {
        applicant: ApplicantId,
        entry: String,
    },
    DuplicateApplicant {
        applicant: ApplicantId,
    },
    NoUsablePreferences {
        applicant: ApplicantId,
    },
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputIssue::UnparsableTimestamp {
                applicant,
                timestamp,
            } => write!(
                f,
                "[Unparsable Timestamp] {applicant} submitted at '{timestamp}'; excluded from placement"
            ),
            InputIssue::UnknownGroup {
                applicant,
                day,
                batch,
            } => write!(
                f,
                "[Unknown Group] {applicant} asked for day {day}, batch {batch}, which has no slots"
            ),
            InputIssue::UnreadablePreference { applicant, entry } => write!(
                f,
                "[Unreadable Preference] {applicant} listed {entry}, which is not a (day, batch) pair"
            ),
            InputIssue::DuplicateApplicant { applicant } => {
                write!(f, "[Duplicate Applicant] {applicant} appears more than once; last record kept")
            }
            InputIssue::NoUsablePreferences { applicant } => {
                write!(f, "[No Usable Preferences] {applicant} has no preference that matches a slot")
            }
        }
    }
}

/// The slot suggested to an applicant who could not be placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSuggestion {
    pub day: Label,
    pub batch: Label,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Label>,
}

impl SlotSuggestion {
    pub fn slot(&self) -> SlotRef {
        SlotRef::new(Group::new(self.day.clone(), self.batch.clone()), self.index)
    }
}

/// Unplaced applicants in enumeration order, each with a suggestion or
/// `None` once no empty slot is left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unallocated(pub Vec<(ApplicantId, Option<SlotSuggestion>)>);

impl Unallocated {
    pub fn get(&self, applicant: &str) -> Option<&Option<SlotSuggestion>> {
        self.0
            .iter()
            .find(|(id, _)| id == applicant)
            .map(|(_, suggestion)| suggestion)
    }

    pub fn contains(&self, applicant: &str) -> bool {
        self.get(applicant).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Unallocated {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, suggestion)| (id, suggestion)))
    }
}

/// The final output of the solver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub schedule: Schedule,
    pub unallocated: Unallocated,
    /// The strategy that actually produced `schedule`.
    pub strategy: Strategy,
    pub fallback_reason: Option<String>,
    pub placed_count: usize,
    pub total_weight: f64,
    pub issues: Vec<InputIssue>,
}

impl SchedulingOutput {
    /// Where `applicant` sits in the schedule, if anywhere.
    pub fn position_of(&self, applicant: &str) -> Option<SlotRef> {
        self.schedule.iter().find_map(|(day, batches)| {
            batches.iter().find_map(|(batch, cells)| {
                cells
                    .iter()
                    .position(|cell| cell.as_deref() == Some(applicant))
                    .map(|index| SlotRef::new(Group::new(day.clone(), batch.clone()), index))
            })
        })
    }
}

impl fmt::Display for SchedulingOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schedule ({}):", self.strategy)?;
        for (day, batches) in &self.schedule {
            for (batch, cells) in batches {
                let occupants = cells
                    .iter()
                    .map(|cell| cell.as_deref().unwrap_or("-"))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, "Day {day}, Batch {batch}: [{occupants}]")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Unallocated:")?;
        for (applicant, suggestion) in &self.unallocated.0 {
            match suggestion {
                Some(s) => writeln!(f, "{applicant}: {}", s.slot())?,
                None => writeln!(f, "{applicant}: no slot available")?,
            }
        }

        if let Some(reason) = &self.fallback_reason {
            writeln!(f)?;
            writeln!(f, "Fell back to greedy placement: {reason}")?;
        }
        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Input issues:")?;
            for issue in &self.issues {
                writeln!(f, "{issue}")?;
            }
        }
        write!(
            f,
            "\nPlaced {} applicants, total weight {:.4}",
            self.placed_count, self.total_weight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_labels_sort_numerically_not_as_strings() {
        let mut labels: Vec<Label> = ["10", "2", "b", "1", "a"].into_iter().map(Label::from).collect();
        labels.sort();
        let sorted: Vec<&str> = labels.iter().map(Label::as_str).collect();
        assert_eq!(sorted, vec!["1", "2", "10", "a", "b"]);
    }

    #[test]
    fn labels_accept_numbers_and_strings() {
        let labels: Vec<Label> = serde_json::from_str(r#"[1, "1", "08:00", 8.5]"#).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2].as_str(), "08:00");
        assert_eq!(labels[3].as_str(), "8.5");
    }

    #[test]
    fn preferences_keep_submission_order() {
        let json = r#"{
            "zed": {"timestamp": "2024-12-10T08:00:00", "preferences": [[1, 1]]},
            "amy": {"timestamp": "2024-12-10T09:00:00", "preferences": [[2, "1"], [1, 2]]}
        }"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = prefs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["zed", "amy"]);
        assert_eq!(
            prefs.0[1].1.preferences,
            vec![(Label::from(2), Label::from(1)), (Label::from(1), Label::from(2))]
        );
    }

    #[test]
    fn odd_records_parse_instead_of_failing_the_file() {
        let json = r#"{
            "missing": {"preferences": [[1, 1]]},
            "null": {"timestamp": null, "preferences": [[1, 1]]},
            "epoch": {"timestamp": 1702195200, "preferences": [[1, 1]]},
            "pairs": {"timestamp": "2024-12-10T08:00:00", "preferences": [[null, 1], [1, 2], "x", [1, 2, 3]]},
            "scalar": 7
        }"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();

        assert_eq!(prefs.len(), 5);
        assert_eq!(prefs.0[0].1.timestamp, "");
        assert_eq!(prefs.0[1].1.timestamp, "");
        assert_eq!(prefs.0[2].1.timestamp, "1702195200");
        assert_eq!(prefs.0[2].1.preferences, vec![(Label::from(1), Label::from(1))]);

        let pairs = &prefs.0[3].1;
        assert_eq!(pairs.preferences, vec![(Label::from(1), Label::from(2))]);
        assert_eq!(pairs.unreadable, vec!["[null,1]", "\"x\"", "[1,2,3]"]);

        assert_eq!(prefs.0[4].1, PreferenceRecord::default());
    }

    #[test]
    fn text_rendering_lists_grid_leftovers_and_notes() {
        let mut schedule = Schedule::new();
        schedule.entry(Label::from(2)).or_default().insert(Label::from(1), vec![None, Some("C".to_string())]);
        schedule
            .entry(Label::from(1))
            .or_default()
            .insert(Label::from(2), vec![Some("B".to_string()), None]);
        schedule
            .entry(Label::from(1))
            .or_default()
            .insert(Label::from(1), vec![Some("A".to_string()), Some("D".to_string())]);

        let output = SchedulingOutput {
            schedule,
            unallocated: Unallocated(vec![
                (
                    "E".to_string(),
                    Some(SlotSuggestion {
                        day: Label::from(1),
                        batch: Label::from(2),
                        index: 1,
                        start_time: Some(Label::from("13:20")),
                    }),
                ),
                ("F".to_string(), None),
            ]),
            strategy: Strategy::Greedy,
            fallback_reason: Some("time limit reached".to_string()),
            placed_count: 4,
            total_weight: 3.5,
            issues: vec![InputIssue::DuplicateApplicant {
                applicant: "A".to_string(),
            }],
        };

        let text = output.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[..4],
            &[
                "Schedule (greedy):",
                "Day 1, Batch 1: [A, D]",
                "Day 1, Batch 2: [B, -]",
                "Day 2, Batch 1: [-, C]",
            ]
        );
        assert!(lines.contains(&"Unallocated:"));
        assert!(lines.contains(&"E: (1, 2, 1)"));
        assert!(lines.contains(&"F: no slot available"));
        assert!(lines.contains(&"Fell back to greedy placement: time limit reached"));
        assert!(lines.contains(&"Input issues:"));
        assert!(lines.contains(&"[Duplicate Applicant] A appears more than once; last record kept"));
        assert_eq!(lines.last(), Some(&"Placed 4 applicants, total weight 3.5000"));
    }

    #[test]
    fn slot_refs_order_by_day_batch_index() {
        let a = SlotRef::new(Group::new(1, 2), 0);
        let b = SlotRef::new(Group::new(2, 1), 0);
        let c = SlotRef::new(Group::new(1, 2), 3);
        let mut slots = vec![b.clone(), c.clone(), a.clone()];
        slots.sort();
        assert_eq!(slots, vec![a, c, b]);
    }

    #[test]
    fn unallocated_serializes_as_ordered_map() {
        let unallocated = Unallocated(vec![
            (
                "s2".to_string(),
                Some(SlotSuggestion {
                    day: Label::from(1),
                    batch: Label::from(2),
                    index: 0,
                    start_time: Some(Label::from("08:30")),
                }),
            ),
            ("s1".to_string(), None),
        ]);
        let json = serde_json::to_string(&unallocated).unwrap();
        assert_eq!(
            json,
            r#"{"s2":{"day":"1","batch":"2","index":0,"startTime":"08:30"},"s1":null}"#
        );
    }
}
