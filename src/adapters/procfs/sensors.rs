use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::parser;

/// Read named temperature sensors from sysfs.
///
/// Both hwmon chips (`tempN_label`, else `<chip> tempN`) and thermal zones
/// (named by their `type`) are read; one die may show up under both names.
/// Unreadable individual sensors are skipped.
pub fn read_temperatures(sys_path: &Path) -> BTreeMap<String, f64> {
    let mut temperatures = BTreeMap::new();

    read_hwmon(&sys_path.join("class/hwmon"), &mut temperatures);
    read_thermal_zones(&sys_path.join("class/thermal"), &mut temperatures);

    temperatures
}

fn read_hwmon(root: &Path, out: &mut BTreeMap<String, f64>) {
    let Ok(chips) = fs::read_dir(root) else {
        return;
    };

    let mut chip_dirs: Vec<_> = chips.flatten().map(|e| e.path()).collect();
    chip_dirs.sort();

    for dir in chip_dirs {
        let chip = read_trimmed(&dir.join("name")).unwrap_or_else(|| file_name(&dir));

        let Ok(files) = fs::read_dir(&dir) else {
            continue;
        };
        let mut inputs: Vec<String> = files
            .flatten()
            .map(|f| f.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("temp") && name.ends_with("_input"))
            .collect();
        inputs.sort();

        for input in inputs {
            let Some(celsius) = read_celsius(&dir.join(&input)) else {
                continue;
            };
            let sensor = input.trim_end_matches("_input");
            let label = read_trimmed(&dir.join(format!("{}_label", sensor)))
                .unwrap_or_else(|| format!("{} {}", chip, sensor));
            insert_unique(out, label, celsius);
        }
    }
}

fn read_thermal_zones(root: &Path, out: &mut BTreeMap<String, f64>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    let mut zones: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| file_name(p).starts_with("thermal_zone"))
        .collect();
    zones.sort();

    for zone in zones {
        let Some(celsius) = read_celsius(&zone.join("temp")) else {
            continue;
        };
        let label = read_trimmed(&zone.join("type")).unwrap_or_else(|| file_name(&zone));
        insert_unique(out, label, celsius);
    }
}

fn read_celsius(path: &Path) -> Option<f64> {
    let content = fs::read_to_string(path).ok()?;
    match parser::parse_millidegrees(&content) {
        Ok(celsius) => Some(celsius),
        Err(e) => {
            debug!("Skipping sensor {}: {}", path.display(), e);
            None
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Sensor names must be unique; repeats get a `#2`, `#3`... suffix
fn insert_unique(out: &mut BTreeMap<String, f64>, name: String, celsius: f64) {
    if !out.contains_key(&name) {
        out.insert(name, celsius);
        return;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{} #{}", name, n);
        if !out.contains_key(&candidate) {
            out.insert(candidate, celsius);
            return;
        }
        n += 1;
    }
}
