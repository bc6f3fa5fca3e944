//! Output formatting module

use chrono::{Local, TimeZone};
use serde::Serialize;

use freightmap_app::MapView;
use freightmap_domain::service::{haversine_km, ProximityNotification};
use freightmap_types::{GeoPoint, Marker, MarkerKind, OutputFormat, Result, RouteHistoryItem, SavedRoute};

/// Truncate to `max` characters, marking the cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Type-specific attributes in one short column
fn attributes(marker: &Marker) -> String {
    match marker.kind {
        MarkerKind::Cargo => {
            let mut parts = Vec::new();
            if let Some(cargo_type) = marker.cargo_type() {
                parts.push(cargo_type.label().to_string());
            }
            if let Some(weight) = marker.weight {
                parts.push(format!("{} кг", weight));
            }
            if let Some(ref ready) = marker.ready_status {
                parts.push(ready.clone());
            }
            parts.join(", ")
        }
        MarkerKind::Driver => {
            let mut parts = Vec::new();
            if let Some(category) = marker.vehicle_category() {
                parts.push(category.label().to_string());
            }
            parts.push(marker.vehicle_status().unwrap_or_default().label().to_string());
            parts.join(", ")
        }
    }
}

pub fn output_markers(output_format: OutputFormat, markers: &[Marker], location: Option<GeoPoint>) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(markers);
    }

    println!(
        "{:<12} {:<9} {:<20} {:<28} {:<26} {:>8}",
        "ID", "Type", "Name", "Details", "Attributes", "Dist km"
    );
    println!("{}", "-".repeat(108));
    for marker in markers {
        let distance = location
            .map(|here| format!("{:.1}", haversine_km(here, marker.position())))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<9} {:<20} {:<28} {:<26} {:>8}",
            truncate(&marker.id, 12),
            marker.kind,
            truncate(&marker.name, 20),
            truncate(&marker.details, 28),
            truncate(&attributes(marker), 26),
            distance
        );
    }
    println!("\n{} marker(s)", markers.len());
    Ok(())
}

#[derive(Serialize)]
struct NearbyRow<'a> {
    distance_km: f64,
    #[serde(flatten)]
    marker: &'a Marker,
}

pub fn output_nearby(output_format: OutputFormat, nearby: &[(f64, Marker)], radius_km: f64) -> Result<()> {
    if output_format == OutputFormat::Json {
        let rows: Vec<NearbyRow> = nearby
            .iter()
            .map(|(distance_km, marker)| NearbyRow {
                distance_km: *distance_km,
                marker,
            })
            .collect();
        return print_json(&rows);
    }

    if nearby.is_empty() {
        println!("No cargo within {} km", radius_km);
        return Ok(());
    }

    println!("Cargo within {} km", radius_km);
    println!("{}", "=".repeat(24));
    for (distance, marker) in nearby {
        println!(
            "{:>7.1} km  {:<12} {:<20} {}",
            distance,
            truncate(&marker.id, 12),
            truncate(&marker.name, 20),
            truncate(&marker.details, 40)
        );
    }
    Ok(())
}

pub fn format_notification(notification: &ProximityNotification) -> String {
    let cargo = &notification.cargo;
    let label = cargo
        .cargo_type()
        .map(|t| t.label())
        .unwrap_or_else(|| cargo.kind.label());
    format!(
        "📦 Новый груз рядом: {} ({:.1} км) {}",
        if cargo.name.is_empty() { label } else { cargo.name.as_str() },
        notification.distance_km,
        truncate(&cargo.details, 40)
    )
}

/// One-line status for the spinner
pub fn view_summary(view: &MapView) -> String {
    let mut summary = format!(
        "{} shown / {} total | cargo waiting: {} | drivers free: {} | map: {}",
        view.filtered.len(),
        view.markers_total,
        view.stats.cargo_waiting,
        view.stats.drivers_free,
        view.provider
    );
    if let Some(ref error) = view.last_error {
        summary.push_str(&format!(" | last fetch failed: {}", truncate(error, 40)));
    }
    summary
}

pub fn output_routes(output_format: OutputFormat, routes: &[SavedRoute]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(routes);
    }

    if routes.is_empty() {
        println!("No saved routes");
        return Ok(());
    }

    println!("{:<36}  {:<24} {:<20} {:<20}", "ID", "Name", "From", "To");
    println!("{}", "-".repeat(104));
    for route in routes {
        println!(
            "{:<36}  {:<24} {:<20} {:<20}",
            route.id,
            truncate(&route.name, 24),
            truncate(&route.from, 20),
            truncate(&route.to, 20)
        );
    }
    Ok(())
}

pub fn output_history(output_format: OutputFormat, history: &[RouteHistoryItem]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(history);
    }

    if history.is_empty() {
        println!("No recent searches");
        return Ok(());
    }

    for item in history {
        let when = Local
            .timestamp_millis_opt(item.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!("{:<14} {}  {} → {}", item.id, when, item.from, item.to);
        if let Some(ref cargo_type) = item.cargo_type {
            line.push_str(&format!("  [{}]", cargo_type));
        }
        if let Some(ref weight) = item.weight {
            line.push_str(&format!("  {} кг", weight));
        }
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Москва", 10), "Москва");
        assert_eq!(truncate("Санкт-Петербург", 6), "Санкт…");
    }

    #[test]
    fn test_format_notification() {
        let notification = ProximityNotification {
            id: "c1".to_string(),
            cargo: Marker::cargo("c1", 0.0, 0.0).with_details("Москва - Казань"),
            distance_km: 3.24,
            ticket: 1,
        };
        let text = format_notification(&notification);
        assert!(text.contains("Груз"));
        assert!(text.contains("3.2"));
        assert!(text.contains("Москва - Казань"));
    }
}
