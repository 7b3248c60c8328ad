//! Lab-session annotation
//!
//! Entries of lab departments are grouped by (day, room, teacher, subject,
//! course code). Inside a group, slots are chained by adjacency (one slot's
//! end equals the next one's start) rather than sorted as strings, so a run
//! crossing "12:00-1:00" is still found. Runs of two or more slots become one
//! lab session.
//!
//! Entries left over whose subject or raw text says "Lab" are annotated as
//! keyword labs with a default duration, their span guessed by following the
//! day's slot list.

use crate::config::ParserConfig;
use crate::text::slots_consecutive;
use crate::types::ClassEntry;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::debug;

static LAB_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLAB\b").unwrap());

type GroupKey = (String, String, String, String, String);

fn group_key(e: &ClassEntry) -> GroupKey {
    (
        e.day.clone(),
        e.room_name.clone(),
        e.teacher_name.clone(),
        e.subject.clone(),
        e.course_code.clone(),
    )
}

fn group_id(e: &ClassEntry, first_slot: &str) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        e.day, e.room_name, e.teacher_name, e.subject, e.course_code, first_slot
    )
}

/// Split group members (indices into `entries`) into adjacency-chained runs.
fn chain_runs(entries: &[ClassEntry], members: &[usize]) -> Vec<Vec<usize>> {
    let slot = |i: usize| entries[i].time_slot.as_str();
    let has_predecessor =
        |i: usize| members.iter().any(|&j| j != i && slots_consecutive(slot(j), slot(i)));

    let mut used = vec![false; members.len()];
    let mut runs = Vec::new();
    let starts: Vec<usize> = (0..members.len())
        .filter(|&m| !has_predecessor(members[m]))
        .chain(0..members.len())
        .collect();
    for start in starts {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut run = vec![members[start]];
        let mut tail = members[start];
        while let Some(m) =
            (0..members.len()).find(|&m| !used[m] && slots_consecutive(slot(tail), slot(members[m])))
        {
            used[m] = true;
            tail = members[m];
            run.push(tail);
        }
        runs.push(run);
    }
    runs
}

/// Slot that starts where `slot` ends, from the day's known slots.
fn next_slot<'a>(day_slots: &'a BTreeSet<String>, slot: &str) -> Option<&'a str> {
    day_slots
        .iter()
        .find(|s| slots_consecutive(slot, s))
        .map(String::as_str)
}

/// Annotate lab runs in place.
pub fn annotate_labs(entries: &mut [ClassEntry], config: &ParserConfig) {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_index: HashMap<GroupKey, usize> = HashMap::new();
    let mut slots_by_day: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (i, e) in entries.iter().enumerate() {
        if !config.is_lab_department(&e.department) {
            continue;
        }
        let idx = *group_index.entry(group_key(e)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(i);
        slots_by_day
            .entry(e.day.clone())
            .or_default()
            .insert(e.time_slot.clone());
    }

    let mut runs_found = 0usize;
    for members in &groups {
        for run in chain_runs(entries, members) {
            if run.len() < 2 {
                continue;
            }
            runs_found += 1;
            let span: Vec<String> = run.iter().map(|&i| entries[i].time_slot.clone()).collect();
            let gid = group_id(&entries[run[0]], &span[0]);
            for (pos, &i) in run.iter().enumerate() {
                let e = &mut entries[i];
                e.is_lab_session = true;
                e.lab_duration = Some(format!("{}_hours", run.len()));
                e.lab_span_slots = span.clone();
                e.lab_span_group_id = Some(gid.clone());
                e.lab_span_is_start = Some(pos == 0);
                e.lab_annotation_source = Some(config.lab_annotation_source.clone());
            }
        }
    }

    let hops = config.keyword_lab_hours.saturating_sub(1) as usize;
    let mut keyword_labs = 0usize;
    for e in entries.iter_mut() {
        if e.is_lab_session || !config.is_lab_department(&e.department) {
            continue;
        }
        if !(LAB_WORD.is_match(&e.raw_text) || LAB_WORD.is_match(&e.subject)) {
            continue;
        }
        let mut span = vec![e.time_slot.clone()];
        if let Some(day_slots) = slots_by_day.get(&e.day) {
            while span.len() <= hops {
                let Some(next) = span.last().and_then(|last| next_slot(day_slots, last)) else {
                    break;
                };
                span.push(next.to_string());
            }
        }
        keyword_labs += 1;
        e.is_lab_session = true;
        e.lab_duration = Some(format!("{}_hours", config.keyword_lab_hours));
        e.lab_span_group_id = Some(group_id(e, &e.time_slot));
        e.lab_span_slots = span;
        e.lab_span_is_start = Some(true);
        e.lab_annotation_source = Some(config.lab_annotation_source.clone());
    }

    debug!(runs = runs_found, keyword_labs, "Annotated lab sessions");
}
