use super::ui;
use crate::core::config::AppConfig;
use crate::core::resolver::{self, ComparisonSession};
use crate::core::{ComparisonReport, Lookback, compare, registry};
use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Table};
use indicatif::ProgressBar;
use tracing::{debug, info};

const SPARKLINE_WIDTH: usize = 32;

/// A comparison request as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Registry identifiers making up the basket, in order.
    pub identifiers: Vec<String>,
    pub guest: Option<String>,
    pub guest_label: String,
    /// Falls back to the configured default when unset.
    pub lookback: Option<Lookback>,
    pub json: bool,
}

pub async fn run(options: &CompareOptions, config: &AppConfig) -> Result<()> {
    let registry_path = config.registry_path();
    let (registry, registry_error) = registry::load(&registry_path);
    if let Some(e) = registry_error {
        if !options.identifiers.is_empty() {
            bail!(
                "{e}. Please ensure {} contains the fund registry.",
                registry_path.display()
            );
        }
        eprintln!(
            "{}",
            ui::style_text(
                &format!("Registry missing ({e}); only the guest fund can be compared."),
                ui::StyleType::Warning
            )
        );
    }

    let mut session = ComparisonSession::new();
    for identifier in &options.identifiers {
        match registry.get(&identifier.trim().to_uppercase()) {
            Some(fund) => {
                if !session.add(fund.clone()) {
                    debug!("{} already selected", identifier);
                }
            }
            None => eprintln!(
                "{}",
                ui::style_text(
                    &format!("Unknown fund identifier {identifier}, skipping"),
                    ui::StyleType::Warning
                )
            ),
        }
    }

    let targets = resolver::resolve(
        session.basket(),
        &registry,
        options.guest.as_deref(),
        &options.guest_label,
    );
    if targets.is_empty() {
        println!("No funds selected. Pass registry identifiers or --guest to start a comparison.");
        return Ok(());
    }

    let fetcher = crate::build_history_fetcher(config)?;
    let lookback = options.lookback.unwrap_or(config.default_lookback);

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        ui::new_progress_bar(targets.len() as u64, false)
    };
    let report = compare::compare(
        &fetcher,
        targets,
        lookback,
        config.max_concurrent_fetches,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();
    info!("Comparison finished");

    if options.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        display_report(&report);
    }
    Ok(())
}

fn display_report(report: &ComparisonReport) {
    if !report.has_data() {
        println!(
            "{}",
            ui::style_text(
                "No data found for the selected funds/dates.",
                ui::StyleType::Warning
            )
        );
        display_issues(report);
        return;
    }

    let title = format!("Relative Performance (Base 100) - {}", report.lookback);
    println!("\n{}", ui::style_text(&title, ui::StyleType::Title));
    println!("{}", performance_table(report));

    if report.metrics().next().is_some() {
        println!(
            "\n{}",
            ui::style_text("Performance Summary", ui::StyleType::Title)
        );
        println!("{}", metrics_table(report));
    }
    display_issues(report);
}

fn display_issues(report: &ComparisonReport) {
    for (target, issue) in report.issues() {
        println!(
            "{}",
            ui::style_text(
                &format!("{} ({}): {}", target.label, target.code, issue),
                ui::StyleType::Error
            )
        );
    }
}

/// Rebased series side by side, drawn on one shared scale.
fn performance_table(report: &ComparisonReport) -> Table {
    let (min, max) = report
        .targets
        .iter()
        .filter_map(|t| t.series.as_ref())
        .flat_map(|s| s.points())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.nav), hi.max(p.nav))
        });

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Low"),
        ui::header_cell("High"),
        ui::header_cell("Latest"),
        ui::header_cell("Trend"),
    ]);

    for target_report in &report.targets {
        let Some(series) = &target_report.series else {
            continue;
        };
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            continue;
        };
        let navs: Vec<f64> = series.points().iter().map(|p| p.nav).collect();
        let low = navs.iter().copied().fold(f64::INFINITY, f64::min);
        let high = navs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let target = &target_report.target;
        let name = if target.is_guest {
            format!("{} {}", target.label, ui::style_text("(guest)", ui::StyleType::Subtle))
        } else {
            target.label.clone()
        };

        table.add_row(vec![
            Cell::new(name),
            Cell::new(first.date.format("%d-%b-%Y")),
            Cell::new(last.date.format("%d-%b-%Y")),
            ui::number_cell(format!("{low:.1}")),
            ui::number_cell(format!("{high:.1}")),
            ui::number_cell(format!("{:.1}", last.nav)),
            Cell::new(ui::sparkline(&navs, SPARKLINE_WIDTH, min, max)),
        ]);
    }
    table
}

fn metrics_table(report: &ComparisonReport) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Total Return (%)"),
        ui::header_cell("CAGR (%)"),
        ui::header_cell("Duration"),
        ui::header_cell("Start NAV"),
        ui::header_cell("End NAV"),
    ]);

    for metrics in report.metrics() {
        table.add_row(vec![
            Cell::new(&metrics.label),
            ui::change_cell(metrics.total_return_pct),
            metrics
                .cagr_pct
                .map_or_else(|| ui::na_cell(false), ui::change_cell),
            ui::number_cell(format!("{:.1} Yrs", metrics.years)),
            ui::number_cell(format!("{:.2}", metrics.start_nav)),
            ui::number_cell(format!("{:.2}", metrics.end_nav)),
        ]);
    }
    table
}
