//! Department ownership and sub-department tables.

use crate::patterns::program::canonical_spec;
use crate::text::{collapse_ws, norm_key};
use regex::Regex;
use std::sync::LazyLock;

pub const CS_IT: &str = "CS & IT";
pub const BUSINESS_SCHOOL: &str = "LAHORE BUSINESS SCHOOL";
pub const ALLIED_HEALTH: &str = "Radiology and Imaging Technology/Medical Lab Technology";
pub const NUTRITION: &str = "Human Nutrition and Dietetics";

/// Sub-department labels each department may carry.
const DEPT_SUBDEPT: &[(&str, &[&str])] = &[
    (
        CS_IT,
        &["Computer Science", "Software Engineering", "Artificial Intelligence", "CS & IT General"],
    ),
    (
        BUSINESS_SCHOOL,
        &[
            "Business Administration",
            "Business Administration (2Y)",
            "Accounting & Finance",
            "Accounting & Finance (2Y)",
            "Digital Marketing",
            "Financial Technology",
            "Business General",
        ],
    ),
    ("ENGLISH", &["English", "English Literature", "English General"]),
    ("ZOOLOGY", &["Zoology", "Zoology General"]),
    ("CHEMISTRY", &["Chemistry", "Chemistry General"]),
    ("MATHEMATICS", &["Mathematics", "Mathematics General"]),
    ("PHYSICS", &["Physics", "Physics General"]),
    ("PSYCHOLOGY", &["Psychology", "Psychology General"]),
    ("BIO TECHNOLOGY", &["Biotechnology", "Biotechnology General"]),
    ("DPT", &["Doctor of Physical Therapy"]),
    (
        ALLIED_HEALTH,
        &["Radiology & Imaging Technology", "Medical Lab Technology", "Medical Technology General"],
    ),
    (NUTRITION, &["Human Nutrition & Dietetics"]),
    ("School of Nursing", &["Nursing"]),
    ("PHARM-D", &["Pharmacy"]),
    ("EDUCATION", &["Education"]),
    ("SSISS", &["Social Sciences", "Criminology", "International Relations"]),
    ("URDU", &["Urdu", "Urdu Literature"]),
    ("ISLAMIC STUDY", &["Islamic Studies"]),
];

/// "BS <spec>" specialisation -> owning department.
const SPEC_TO_DEPT: &[(&str, &str)] = &[
    ("MATHEMATICS", "MATHEMATICS"),
    ("MATH", "MATHEMATICS"),
    ("MATHS", "MATHEMATICS"),
    ("PHYSICS", "PHYSICS"),
    ("CHEMISTRY", "CHEMISTRY"),
    ("BIOTECH", "BIO TECHNOLOGY"),
    ("BIOTECHNOLOGY", "BIO TECHNOLOGY"),
    ("ZOOLOGY", "ZOOLOGY"),
    ("ENGLISH", "ENGLISH"),
    ("ENG", "ENGLISH"),
    ("EDUCATION", "EDUCATION"),
    ("EDU", "EDUCATION"),
    ("PSYCHOLOGY", "PSYCHOLOGY"),
    ("NURSING", "School of Nursing"),
    ("URDU", "URDU"),
];

/// Coded program -> owning department.
const PROGRAM_TO_DEPT: &[(&str, &str)] = &[
    ("BSCS", CS_IT),
    ("BSSE", CS_IT),
    ("BSAI", CS_IT),
    ("PHARM-D", "PHARM-D"),
    ("PHARMD", "PHARM-D"),
    ("DPT", "DPT"),
    ("RIT", ALLIED_HEALTH),
    ("MLT", ALLIED_HEALTH),
    ("HND", NUTRITION),
    ("BBA", BUSINESS_SCHOOL),
    ("BBA2Y", BUSINESS_SCHOOL),
    ("BSAF", BUSINESS_SCHOOL),
    ("BSAF2Y", BUSINESS_SCHOOL),
    ("BSDM", BUSINESS_SCHOOL),
    ("BSFT", BUSINESS_SCHOOL),
];

static NUTRITION_WITH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Human Nutrition and Dietetics\s*\([^)]+\)\s*$").unwrap());

/// Collapse whitespace and fold "Human Nutrition and Dietetics (...)" to its bare name.
pub fn normalize_department_name(name: &str) -> String {
    let trimmed = name.trim();
    if NUTRITION_WITH_SUFFIX.is_match(trimmed) {
        return NUTRITION.to_string();
    }
    collapse_ws(trimmed)
}

/// Two department names refer to the same department.
pub fn same_department(a: &str, b: &str) -> bool {
    norm_key(&normalize_department_name(a)) == norm_key(&normalize_department_name(b))
}

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

/// Department that owns a program, if any.
///
/// Bare "BS" and "BS <level>" have no owner.
pub fn program_owner(program: &str) -> Option<&'static str> {
    let p = program.trim();
    if p.is_empty() {
        return None;
    }
    let upper = p.to_uppercase();
    if let Some(spec) = upper.strip_prefix("BS ") {
        return lookup(SPEC_TO_DEPT, spec.trim().replace('.', "").as_str());
    }
    lookup(PROGRAM_TO_DEPT, &upper)
}

fn is_wildcard(program: &str) -> bool {
    let upper = program.trim().to_uppercase();
    upper.is_empty()
        || upper == "BS"
        || upper
            .strip_prefix("BS ")
            .is_some_and(|spec| !spec.chars().any(|c| c.is_ascii_alphabetic()))
}

/// Whether a cohort's program is attributable to `department`.
pub fn belongs_to(program: &str, department: &str) -> bool {
    if is_wildcard(program) {
        return true;
    }
    program_owner(program).is_some_and(|owner| same_department(owner, department))
}

fn subdepartments_of(department: &str) -> &'static [&'static str] {
    DEPT_SUBDEPT
        .iter()
        .find(|(dept, _)| same_department(dept, department))
        .map_or(&[], |(_, subs)| *subs)
}

/// Sub-department label implied by a department and program.
///
/// Returns an empty string when a "BS <spec>" program names a specialisation
/// the department does not offer.
pub fn sub_department(department: &str, program: &str) -> String {
    let dept = normalize_department_name(department);
    let upper = program.trim().to_uppercase();

    if let Some(spec) = upper.strip_prefix("BS ") {
        if spec.chars().any(|c| c.is_ascii_alphabetic()) {
            let label = canonical_spec(spec);
            return if subdepartments_of(&dept).contains(&label.as_str()) {
                label
            } else {
                String::new()
            };
        }
    }

    let fixed = match upper.as_str() {
        "HND" => Some("Human Nutrition & Dietetics"),
        "RIT" => Some("Radiology & Imaging Technology"),
        "MLT" => Some("Medical Lab Technology"),
        "DPT" => Some("Doctor of Physical Therapy"),
        _ => None,
    };
    if let Some(label) = fixed {
        return label.to_string();
    }

    let bs_prefixed = upper.starts_with("BS");
    let by_program = |pairs: &[(&str, &str)], general: &str| -> String {
        pairs
            .iter()
            .find(|(p, _)| *p == upper)
            .map_or(general, |(_, label)| *label)
            .to_string()
    };
    let science = |name: &str| -> String {
        if bs_prefixed {
            name.to_string()
        } else {
            format!("{name} General")
        }
    };

    match dept.to_uppercase().as_str() {
        "CS & IT" => by_program(
            &[
                ("BSCS", "Computer Science"),
                ("BSSE", "Software Engineering"),
                ("BSAI", "Artificial Intelligence"),
            ],
            "CS & IT General",
        ),
        "LAHORE BUSINESS SCHOOL" => by_program(
            &[
                ("BBA2Y", "Business Administration (2Y)"),
                ("BSAF2Y", "Accounting & Finance (2Y)"),
                ("BBA", "Business Administration"),
                ("BSAF", "Accounting & Finance"),
                ("BSDM", "Digital Marketing"),
                ("BSFT", "Financial Technology"),
            ],
            "Business General",
        ),
        "ENGLISH" => by_program(&[("BS", "English")], "English General"),
        "ZOOLOGY" => science("Zoology"),
        "CHEMISTRY" => science("Chemistry"),
        "MATHEMATICS" => science("Mathematics"),
        "PHYSICS" => science("Physics"),
        "PSYCHOLOGY" => science("Psychology"),
        "BIO TECHNOLOGY" => science("Biotechnology"),
        "DPT" => "Doctor of Physical Therapy".to_string(),
        "SCHOOL OF NURSING" => "Nursing".to_string(),
        "PHARM-D" => "Pharmacy".to_string(),
        "EDUCATION" => "Education".to_string(),
        "SSISS" => "Social Sciences".to_string(),
        "URDU" => "Urdu Literature".to_string(),
        "ISLAMIC STUDY" => "Islamic Studies".to_string(),
        _ if same_department(&dept, ALLIED_HEALTH) => "Medical Technology General".to_string(),
        _ if same_department(&dept, NUTRITION) => "Human Nutrition & Dietetics".to_string(),
        _ => dept,
    }
}

/// Fallback labels end in "General".
pub fn is_general_label(label: &str) -> bool {
    norm_key(label).ends_with("general")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_owner() {
        assert_eq!(program_owner("BSCS"), Some(CS_IT));
        assert_eq!(program_owner("BBA2Y"), Some(BUSINESS_SCHOOL));
        assert_eq!(program_owner("BS Maths"), Some("MATHEMATICS"));
        assert_eq!(program_owner("BS English"), Some("ENGLISH"));
        assert_eq!(program_owner("BS"), None);
        assert_eq!(program_owner("B.Ed"), None);
    }

    #[test]
    fn test_belongs_to() {
        assert!(belongs_to("BSCS", "CS & IT"));
        assert!(belongs_to("BSCS", "cs and it"));
        assert!(!belongs_to("BBA", "CS & IT"));
        assert!(belongs_to("BS", "PHYSICS"));
        assert!(belongs_to("BS 3", "PHYSICS"));
        assert!(belongs_to("", "PHYSICS"));
        assert!(belongs_to("HND", "Human Nutrition and Dietetics (HND)"));
    }

    #[test]
    fn test_sub_department_cs() {
        assert_eq!(sub_department("CS & IT", "BSCS"), "Computer Science");
        assert_eq!(sub_department("CS & IT", "BSAI"), "Artificial Intelligence");
        assert_eq!(sub_department("CS & IT", ""), "CS & IT General");
    }

    #[test]
    fn test_sub_department_specialisation() {
        assert_eq!(sub_department("MATHEMATICS", "BS Maths"), "Mathematics");
        assert_eq!(sub_department("CS & IT", "BS Physics"), "");
        assert_eq!(sub_department("PHYSICS", "BS"), "Physics");
        assert_eq!(sub_department("PHYSICS", ""), "Physics General");
    }

    #[test]
    fn test_sub_department_fixed_programs() {
        assert_eq!(sub_department("CS & IT", "DPT"), "Doctor of Physical Therapy");
        assert_eq!(sub_department(ALLIED_HEALTH, "RIT"), "Radiology & Imaging Technology");
        assert_eq!(sub_department(ALLIED_HEALTH, ""), "Medical Technology General");
        assert_eq!(sub_department("LAHORE BUSINESS SCHOOL", "BSAF2Y"), "Accounting & Finance (2Y)");
        assert_eq!(sub_department("Unknown Dept", "BSCS"), "Unknown Dept");
    }

    #[test]
    fn test_general_labels() {
        assert!(is_general_label("CS & IT General"));
        assert!(!is_general_label("Computer Science"));
    }
}
