//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use devpull_device::DeviceInfo;
use devpull_engine::{MatchedObject, Outcome, RunReport};

use crate::cli::{CliError, CliResult, OutputFormat};

pub(crate) fn render_device_list(devices: &[DeviceInfo], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(devices)?,
        OutputFormat::Table => {
            if devices.is_empty() {
                println!("no devices available");
                return Ok(());
            }
            println!("{:<24} {:<16} DESCRIPTION", "FRIENDLY NAME", "MANUFACTURER");
            for device in devices {
                println!(
                    "{:<24} {:<16} {}",
                    device.friendly_name, device.manufacturer, device.description
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_file_list(items: &[MatchedObject], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let objects: Vec<_> = items.iter().map(|item| &item.object).collect();
            print_json(&objects)?;
        }
        OutputFormat::Table => {
            for item in items {
                println!("{}", item.object.name);
            }
            println!("{} files matched", items.len());
        }
    }
    Ok(())
}

pub(crate) fn render_run_summary(report: &RunReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => {
            for item in &report.items {
                match &item.outcome {
                    Outcome::Failed { reason } => {
                        println!("{:<7} {} ({reason})", "failed", item.object.name);
                    }
                    Outcome::Succeeded => println!("{:<7} {}", "ok", item.object.name),
                    Outcome::Pending => println!("{:<7} {}", "pending", item.object.name),
                }
            }
            println!(
                "copied {} ({}), deleted {}, failed {} of {} files",
                report.copied,
                format_bytes(report.copied_bytes),
                report.deleted,
                report.failed(),
                report.items.len()
            );
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_scales_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn device_list_renders_as_json() {
        let devices = vec![DeviceInfo {
            friendly_name: "phone".to_owned(),
            manufacturer: "local mount".to_owned(),
            description: "test phone".to_owned(),
        }];
        render_device_list(&devices, OutputFormat::Json).expect("json device list");
    }

    #[test]
    fn renderers_accept_empty_input() {
        render_device_list(&[], OutputFormat::Table).expect("empty table");
        render_device_list(&[], OutputFormat::Json).expect("empty json");
        render_file_list(&[], OutputFormat::Table).expect("empty file table");
    }
}
