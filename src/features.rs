/// Feature-gate registry for missing-dataset diagnosis.
///
/// Some datasets only exist in a scenario store when the scenario was run
/// with a particular model feature switched on. When a read for one of those
/// datasets comes back empty, the generic "not found" message would send the
/// user hunting for a data problem that is really a configuration choice.
///
/// Each gate names the side-file flag controlling a feature, the datasets
/// that feature produces, and the explanation to show when the feature was
/// off. This is the single source of truth for gated dataset names — the
/// fetch path scans it uniformly rather than special-casing each feature.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{self, DataSource};

// ---------------------------------------------------------------------------
// Gate registry
// ---------------------------------------------------------------------------

/// One gated feature: a side-file flag, the datasets it produces, and the
/// explanation used when a gated dataset is missing and the flag is off.
pub struct FeatureGate {
    /// Label of the flag line in the scenario side file, e.g. "Dynamic_SJR".
    pub flag_label: &'static str,
    /// Dataset names (VARIABLE/CATEGORY) produced only under this feature.
    pub datasets: &'static [&'static str],
    /// Explanation appended to the missing-dataset message.
    pub explanation: &'static str,
}

/// All gated features, scanned in order.
pub static FEATURE_GATES: &[FeatureGate] = &[
    FeatureGate {
        flag_label: "Dynamic_SJR",
        datasets: &[
            "S_MELON/STORAGE",
            "S_PEDRO/STORAGE",
            "S_MCLRE/STORAGE",
            "S_MLRTN/STORAGE",
            "C_STANRIPN/FLOW-CHANNEL",
            "C_TUOL/FLOW-CHANNEL",
            "C_MERCED2/FLOW-CHANNEL",
            "C_SJRMS/FLOW-CHANNEL",
            "D_STANRIPN/FLOW-DELIVERY",
            "D_STANGDWN/FLOW-DELIVERY",
            "D_TUOL/FLOW-DELIVERY",
            "D_TUOL1B/FLOW-DELIVERY",
            "D_TUOL2/FLOW-DELIVERY",
            "D_MERCED1/FLOW-DELIVERY",
            "D_MERCED2/FLOW-DELIVERY",
            "D_MDRCNL/FLOW-DELIVERY",
            "D_FKCNL/FLOW-DELIVERY",
        ],
        explanation: "The selected scenario was not run using dynamic SJR simulation.",
    },
    FeatureGate {
        flag_label: "CkbReg_AN",
        datasets: &["AN_EC_STD/SALINITY", "CH_EC_STD/SALINITY"],
        explanation: "The selected scenario was not run with D-1485 Fish and Wildlife \
                      (at Antioch and Chipps) regulations.",
    },
    FeatureGate {
        flag_label: "fac_ckb3",
        datasets: &[
            "S422/STORAGE",
            "WQ408_OR_/SALINITY",
            "WQ408_VC_/SALINITY",
            "WQ408_RS_/SALINITY",
            "C422_FILL_CC/FLOW-CHANNEL",
            "D420/FLOW-DELIVERY",
            "D408_OR/FLOW-DELIVERY",
            "D408_VC/FLOW-DELIVERY",
            "D408_RS/FLOW-DELIVERY",
            "WQ420/SALINITY",
        ],
        explanation: "The selected scenario was not run with Los Vaqueros Enlargement.",
    },
];

/// Finds the gate governing a dataset name, if any.
pub fn gate_for_dataset(dataset: &str) -> Option<&'static FeatureGate> {
    FEATURE_GATES.iter().find(|g| g.datasets.contains(&dataset))
}

// ---------------------------------------------------------------------------
// Side-file flags
// ---------------------------------------------------------------------------

/// Extension of the per-scenario configuration side file.
pub const SIDE_FILE_EXTENSION: &str = "cls";

/// Path of the configuration side file companion to a scenario store file:
/// same base name, `.cls` extension.
pub fn side_file_path(store_file: &Path) -> PathBuf {
    store_file.with_extension(SIDE_FILE_EXTENSION)
}

/// Reads a labeled flag from a scenario's side file.
///
/// The side file is plain text with pipe-delimited `Label|value` lines; the
/// first line starting with `{label}|` wins, and the flag is on only when
/// its value is exactly "true". An unreadable side file means the feature is
/// assumed off — logged at info, never an error.
pub fn side_file_flag(store_file: &Path, label: &str) -> bool {
    let path = side_file_path(store_file);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => {
            logging::info(
                DataSource::Store,
                path.to_str(),
                &format!("side file not openable - {} assumed off", label),
            );
            return false;
        }
    };
    let prefix = format!("{}|", label);
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(&prefix) {
            let value = rest.split('|').next().unwrap_or("");
            return value == "true";
        }
    }
    false
}

/// Diagnostic for a dataset that came back empty from a scenario store:
/// either a feature-specific explanation (dataset is gated and the flag is
/// off in the scenario's side file) or the generic not-found message.
pub fn missing_dataset_message(dataset: &str, store_file: &Path) -> String {
    let file = store_file.display();
    match gate_for_dataset(dataset) {
        Some(gate) if !side_file_flag(store_file, gate.flag_label) => {
            format!("Could not find {} in {}. {}", dataset, file, gate.explanation)
        }
        _ => format!("Could not find {} in {}", dataset, file),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_gate_has_datasets_and_an_explanation() {
        for gate in FEATURE_GATES {
            assert!(
                !gate.datasets.is_empty(),
                "gate '{}' must cover at least one dataset",
                gate.flag_label
            );
            assert!(
                !gate.explanation.is_empty(),
                "gate '{}' must carry an explanation",
                gate.flag_label
            );
        }
    }

    #[test]
    fn test_no_dataset_appears_in_two_gates() {
        let mut seen = std::collections::HashSet::new();
        for gate in FEATURE_GATES {
            for dataset in gate.datasets {
                assert!(
                    seen.insert(*dataset),
                    "dataset '{}' listed under more than one gate",
                    dataset
                );
            }
        }
    }

    #[test]
    fn test_gate_lookup_by_dataset() {
        let gate = gate_for_dataset("S_MELON/STORAGE").expect("gated dataset");
        assert_eq!(gate.flag_label, "Dynamic_SJR");

        let gate = gate_for_dataset("AN_EC_STD/SALINITY").expect("gated dataset");
        assert_eq!(gate.flag_label, "CkbReg_AN");

        let gate = gate_for_dataset("S422/STORAGE").expect("gated dataset");
        assert_eq!(gate.flag_label, "fac_ckb3");

        assert!(gate_for_dataset("S_SHSTA/STORAGE").is_none());
    }

    #[test]
    fn test_side_file_path_swaps_extension() {
        let p = side_file_path(Path::new("/runs/Alt1_DV.json"));
        assert_eq!(p, PathBuf::from("/runs/Alt1_DV.cls"));
    }

    #[test]
    fn test_side_file_flag_reads_first_matching_line() {
        let dir = std::env::temp_dir().join("calscen_test_cls");
        std::fs::create_dir_all(&dir).unwrap();
        let store = dir.join("scenario_a.json");
        std::fs::write(
            side_file_path(&store),
            "Comment|anything\nDynamic_SJR|true\nDynamic_SJR|false\nfac_ckb3|false\n",
        )
        .unwrap();

        assert!(side_file_flag(&store, "Dynamic_SJR"));
        assert!(!side_file_flag(&store, "fac_ckb3"));
        assert!(!side_file_flag(&store, "CkbReg_AN"), "absent label reads as off");
    }

    #[test]
    fn test_side_file_flag_unreadable_file_is_off() {
        assert!(!side_file_flag(Path::new("/nonexistent/scenario.json"), "Dynamic_SJR"));
    }

    #[test]
    fn test_missing_message_is_feature_specific_when_flag_absent() {
        let dir = std::env::temp_dir().join("calscen_test_cls_msg");
        std::fs::create_dir_all(&dir).unwrap();
        let store = dir.join("scenario_b.json");
        std::fs::write(side_file_path(&store), "SomethingElse|true\n").unwrap();

        let msg = missing_dataset_message("S_MELON/STORAGE", &store);
        assert!(msg.contains("dynamic SJR"), "expected feature explanation, got: {}", msg);

        let msg = missing_dataset_message("S_SHSTA/STORAGE", &store);
        assert!(!msg.contains("dynamic SJR"));
        assert!(msg.starts_with("Could not find S_SHSTA/STORAGE"));
    }

    #[test]
    fn test_missing_message_generic_when_feature_was_on() {
        let dir = std::env::temp_dir().join("calscen_test_cls_on");
        std::fs::create_dir_all(&dir).unwrap();
        let store = dir.join("scenario_c.json");
        std::fs::write(side_file_path(&store), "Dynamic_SJR|true\n").unwrap();

        // Feature was on, so the dataset really is missing data - generic
        // message, no explanation.
        let msg = missing_dataset_message("S_MELON/STORAGE", &store);
        assert!(!msg.contains("dynamic SJR"));
    }
}
