//! Console rendering of the analysis results. Every function returns the text
//! instead of printing it.

use crate::core::aggregate::{ChartData, DatasetOverview, HistogramBin, Share, ZoneSummary};
use crate::core::raster::{Grid, RasterOptions};
use crate::core::search::ProvinceProfile;
use crate::domain::model::DistrictRecord;
use std::fmt::Write;

const RULE_WIDTH: usize = 50;

fn heading(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{}\n{}\n{}", rule, title, rule);
}

pub fn render_overview(overview: &DatasetOverview) -> String {
    let mut out = String::new();
    heading(&mut out, "📊 DATASET OVERVIEW");

    let zones: Vec<String> = overview.zones.iter().map(u32::to_string).collect();
    let _ = writeln!(out, "📋 Dimensions: {} rows × {} columns", overview.rows, overview.columns);
    let _ = writeln!(out, "🏛️ Distinct provinces: {}", overview.provinces);
    let _ = writeln!(out, "🏘️ Distinct cantons: {}", overview.cantons);
    let _ = writeln!(out, "📍 Administrative zones: {}", zones.join(", "));
    let _ = writeln!(out, "✅ Complete records: {}", overview.complete_records);
    let _ = writeln!(out, "⚠️  Missing values: {}", overview.missing_values);

    if let Some(bounds) = &overview.bounds {
        let _ = writeln!(out, "\n🌍 Geographic coverage:");
        let _ = writeln!(out, "   • Latitude: {:.4}° to {:.4}°", bounds.lat_min, bounds.lat_max);
        let _ = writeln!(out, "   • Longitude: {:.4}° to {:.4}°", bounds.lon_min, bounds.lon_max);
    }

    let _ = writeln!(out, "\n🏛️ Districts by locality:");
    let _ = writeln!(out, "   • In provincial capitals: {}", overview.capitals);
    let _ = writeln!(out, "   • Elsewhere: {}", overview.non_capitals);
    out
}

pub fn render_province_analysis(ranking: &[Share], regions: &[Share]) -> String {
    let mut out = String::new();
    heading(&mut out, "🏛️ PROVINCE ANALYSIS");

    let _ = writeln!(out, "📊 Provinces ranked by number of districts:");
    for (rank, share) in ranking.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {:2}. {:<30} {:2} districts ({:4.1}%)",
            rank + 1,
            share.label,
            share.count,
            share.percent
        );
    }

    let _ = writeln!(out, "\n🗺️ Natural regions:");
    for share in regions {
        let _ = writeln!(
            out,
            "   • {:<14}: {:2} districts ({:4.1}%)",
            share.label, share.count, share.percent
        );
    }
    out
}

pub fn render_zone_analysis(summaries: &[ZoneSummary], distribution: &[Share]) -> String {
    let mut out = String::new();
    heading(&mut out, "🏛️ ADMINISTRATIVE ZONES");

    let _ = writeln!(
        out,
        "{:>6} {:>10} {:>10} {:>9} {:>9} {:>9}",
        "ZONA", "Districts", "Provinces", "Cantons", "Lat span", "Lon span"
    );
    for summary in summaries {
        let zone = summary
            .zone
            .map(|z| z.to_string())
            .unwrap_or_else(|| "-".to_string());
        let (lat_span, lon_span) = summary
            .bounds
            .map(|b| (format!("{:.4}", b.lat_span()), format!("{:.4}", b.lon_span())))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        let _ = writeln!(
            out,
            "{:>6} {:>10} {:>10} {:>9} {:>9} {:>9}",
            zone, summary.districts, summary.provinces, summary.cantons, lat_span, lon_span
        );
    }

    let _ = writeln!(out, "\n📈 Share per zone:");
    for share in distribution {
        let _ = writeln!(
            out,
            "   {}: {:2} districts ({:4.1}%)",
            share.label, share.count, share.percent
        );
    }
    out
}

fn district_line(out: &mut String, record: &DistrictRecord, mark_capital: bool) {
    let star = if mark_capital && record.is_capital() { "★ " } else { "  " };
    let _ = writeln!(
        out,
        "   {}{} - {} ({}, {})",
        star, record.code, record.name, record.canton_name, record.province_name
    );
}

pub fn render_search_results(term: &str, results: &[DistrictRecord]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        let _ = writeln!(out, "❌ No districts found for '{}'", term);
        return out;
    }

    let _ = writeln!(out, "🔍 '{}': {} districts found", term, results.len());
    for record in results {
        district_line(&mut out, record, false);
        let _ = writeln!(out, "       📍 {}", record.address);
    }
    out
}

pub fn render_province_profile(profile: &ProvinceProfile) -> String {
    let mut out = String::new();
    if profile.is_empty() {
        let _ = writeln!(out, "❌ No districts found for '{}'", profile.query);
        return out;
    }

    let zones: Vec<String> = profile.zones.iter().map(u32::to_string).collect();
    let _ = writeln!(
        out,
        "🏛️ Districts in {}: {} found",
        profile.query.to_uppercase(),
        profile.districts.len()
    );
    let _ = writeln!(out, "   • Cantons: {}", profile.cantons);
    let _ = writeln!(out, "   • In the provincial capital: {}", profile.capitals);
    let _ = writeln!(out, "   • Zones: {}", zones.join(", "));
    let _ = writeln!(out);
    for record in &profile.districts {
        district_line(&mut out, record, true);
    }
    let _ = writeln!(out, "\n   ★ = provincial capital");
    out
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let length = (count * width / max).max(1);
    "█".repeat(length)
}

/// Horizontal bars scaled so the largest value spans `width` cells.
pub fn render_bar_chart(title: &str, rows: &[(String, usize)], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", title);
    if rows.is_empty() {
        let _ = writeln!(out, "   (no data)");
        return out;
    }

    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let label_width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, count) in rows {
        let padding = label_width - label.chars().count();
        let _ = writeln!(
            out,
            "   {}{} │{} {}",
            label,
            " ".repeat(padding),
            bar(*count, max, width),
            count
        );
    }
    out
}

pub fn render_histogram(title: &str, bins: &[HistogramBin], width: usize) -> String {
    let rows: Vec<(String, usize)> = bins
        .iter()
        .map(|bin| (format!("[{:8.3}, {:8.3}]", bin.lower, bin.upper), bin.count))
        .collect();
    render_bar_chart(title, &rows, width)
}

fn share_rows(shares: &[Share]) -> Vec<(String, usize)> {
    shares.iter().map(|s| (s.label.clone(), s.count)).collect()
}

pub fn render_charts(data: &ChartData, bar_width: usize) -> String {
    let mut out = String::new();
    heading(&mut out, "📊 CHARTS");

    out.push_str(&render_bar_chart(
        &format!("🏛️ Top {} provinces by districts", data.top_provinces.len()),
        &share_rows(&data.top_provinces),
        bar_width,
    ));

    let zone_rows: Vec<(String, usize)> = data
        .zone_shares
        .iter()
        .map(|s| (format!("{} ({:.1}%)", s.label, s.percent), s.count))
        .collect();
    out.push_str(&render_bar_chart("🥧 Share per zone", &zone_rows, bar_width));

    out.push_str(&render_histogram("🌐 Latitude distribution", &data.latitude_bins, bar_width));
    out.push_str(&render_histogram("🌐 Longitude distribution", &data.longitude_bins, bar_width));

    out.push_str(&render_bar_chart(
        "🏙️ Capital vs other localities",
        &[
            ("Provincial capital".to_string(), data.capitals),
            ("Other".to_string(), data.non_capitals),
        ],
        bar_width,
    ));
    out
}

/// The grid framed with row numbers, longitude extent and a legend.
pub fn render_map(grid: &Grid, options: &RasterOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n🗺️ DISTRICT MAP (ASCII)\n{}", "=".repeat(RULE_WIDTH));

    let Some(bounds) = &grid.bounds else {
        let _ = writeln!(out, "   (no districts with coordinates to draw)");
        return out;
    };

    let border = format!("   {}", "=".repeat(grid.width()));
    let _ = writeln!(out, "{}", border);
    for row in 0..grid.height() {
        let _ = writeln!(out, "{:2}|{}|", row, grid.row_text(row));
    }
    let _ = writeln!(out, "{}", border);
    let _ = writeln!(
        out,
        "   {:.1}°{}{:.1}°",
        bounds.lon_min,
        " ".repeat(grid.width().saturating_sub(12)),
        bounds.lon_max
    );
    let _ = writeln!(out, "\nNorth: {:.1}°, South: {:.1}°", bounds.lat_max, bounds.lat_min);
    let _ = writeln!(
        out,
        "Legend: {} = provincial capital, {} = other districts",
        options.capital_glyph, options.district_glyph
    );
    out
}
