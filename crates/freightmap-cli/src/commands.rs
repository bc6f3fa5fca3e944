//! Command handlers

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use freightmap_app::config::Config;
use freightmap_app::repository::{open_location, open_marker_feed, open_route_history, open_saved_routes};
use freightmap_app::{LiveMap, LiveMapSession};
use freightmap_domain::repository::{LocationProvider, MarkerSource};
use freightmap_domain::service::{apply_filters, haversine_km};
use freightmap_infra::{ConfiguredLocation, FixedLocationProvider};
use freightmap_types::{Error, GeoPoint, MapProvider, MarkerKind, OutputFormat, PositionReport, Result};

use crate::cli::{Cli, Commands, FilterArgs, RouteCommands};
use crate::output::{
    format_notification, output_history, output_markers, output_nearby, output_routes, view_summary,
};

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(ref endpoint) = cli.endpoint {
        config.markers_endpoint = endpoint.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Watch {
            ref filter,
            duration,
            public,
            provider,
        } => {
            if let Some(provider) = provider {
                config.map_provider = provider;
            }
            runtime()?.block_on(cmd_watch(&config, cli.location, filter, duration, public, output_format))
        }
        Commands::Markers { ref filter } => runtime()?.block_on(cmd_markers(&config, cli.location, filter, output_format)),
        Commands::Nearby { radius } => {
            let radius = radius.unwrap_or(config.proximity_radius_km);
            runtime()?.block_on(cmd_nearby(&config, cli.location, radius, output_format))
        }
        Commands::Render {
            ref filter,
            ref output,
            provider,
            ref route,
        } => {
            if let Some(provider) = provider {
                config.map_provider = provider;
            }
            runtime()?.block_on(cmd_render(&config, cli.location, filter, output, route))
        }
        Commands::Route { command } => cmd_route(&config, command, output_format),
        Commands::ReportPosition { kind, id, lat, lng } => {
            runtime()?.block_on(cmd_report_position(&config, kind, id, GeoPoint::new(lat, lng)))
        }
        Commands::Config {
            show,
            set_endpoint,
            set_poll_interval,
            set_radius,
            set_notification_ttl,
            set_provider,
            set_yandex_key,
            set_output,
            set_home,
            clear_home,
            set_ip_geolocation,
            set_store_dir,
            reset,
        } => cmd_config(ConfigChanges {
            show,
            set_endpoint,
            set_poll_interval,
            set_radius,
            set_notification_ttl,
            set_provider,
            set_yandex_key,
            set_output,
            set_home,
            clear_home,
            set_ip_geolocation,
            set_store_dir,
            reset,
        }),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// A `--location` flag wins over the configured provider
fn location_for(config: &Config, flag: Option<GeoPoint>) -> Result<ConfiguredLocation> {
    match flag {
        Some(point) => Ok(ConfiguredLocation::Fixed(FixedLocationProvider::new(Some(point)))),
        None => open_location(config),
    }
}

async fn locate_once(config: &Config, flag: Option<GeoPoint>) -> Result<Option<GeoPoint>> {
    let provider = location_for(config, flag)?;
    match provider.locate().await {
        Ok(point) => Ok(Some(point)),
        Err(e) => {
            log::info!("Location unavailable: {}", e);
            Ok(None)
        }
    }
}

/// Remember an active route search in the history
fn record_route_search(config: &Config, filter: &FilterArgs) {
    let route = filter.route_search();
    if !route.is_active() {
        return;
    }
    let cargo_type = filter.cargo_type.map(|t| format!("{:?}", t).to_lowercase());
    match open_route_history(config).and_then(|h| h.record(&route.from, &route.to, cargo_type, None)) {
        Ok(_) => {}
        Err(e) => log::warn!("Could not record route search: {}", e),
    }
}

async fn cmd_watch(
    config: &Config,
    location: Option<GeoPoint>,
    filter: &FilterArgs,
    duration: Option<u64>,
    public: bool,
    output_format: OutputFormat,
) -> Result<()> {
    record_route_search(config, filter);

    let live_map = LiveMap::from_config(config)?
        .with_public(public)
        .with_filters(filter.filters())
        .with_route_search(filter.route_search());
    let source = open_marker_feed(config)?;
    let location = location_for(config, location)?;
    let handle = LiveMapSession::spawn(source, location, live_map, config.session_settings());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| Error::InvalidInput(e.to_string()))?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Polling {}", config.markers_endpoint));

    let mut views = handle.views();
    let mut announced: HashSet<u64> = HashSet::new();
    let mut banner_shown = false;
    let deadline = tokio::time::sleep(duration.map(Duration::from_secs).unwrap_or(Duration::MAX));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if let (Some(banner), false) = (&view.banner, banner_shown) {
                    pb.println(format!("ℹ {}: {}", banner.title, banner.message));
                    banner_shown = true;
                }
                for notification in &view.notifications {
                    if announced.insert(notification.ticket) {
                        pb.println(format_notification(notification));
                    }
                }
                pb.set_message(view_summary(&view));
            }
        }
    }

    pb.finish_and_clear();
    let live_map = handle.shutdown().await?;
    let view = live_map.view();
    println!("{}", view_summary(&view));
    output_markers(output_format, &view.filtered, view.user_location)
}

async fn cmd_markers(
    config: &Config,
    location: Option<GeoPoint>,
    filter: &FilterArgs,
    output_format: OutputFormat,
) -> Result<()> {
    record_route_search(config, filter);

    let feed = open_marker_feed(config)?;
    let markers = feed.fetch_markers().await?;
    let filtered = apply_filters(&markers, &filter.filters(), &filter.route_search());
    let here = locate_once(config, location).await?;
    output_markers(output_format, &filtered, here)
}

async fn cmd_nearby(config: &Config, location: Option<GeoPoint>, radius_km: f64, output_format: OutputFormat) -> Result<()> {
    let here = locate_once(config, location)
        .await?
        .ok_or_else(|| Error::InvalidInput("location unknown; pass --location or set a home location".to_string()))?;

    let feed = open_marker_feed(config)?;
    let markers = feed.fetch_markers().await?;

    let mut nearby: Vec<(f64, _)> = markers
        .into_iter()
        .filter(|m| m.is_cargo() && !m.is_booked())
        .map(|m| (haversine_km(here, m.position()), m))
        .filter(|(distance, _)| *distance <= radius_km)
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

    output_nearby(output_format, &nearby, radius_km)
}

async fn cmd_render(
    config: &Config,
    location: Option<GeoPoint>,
    filter: &FilterArgs,
    output: &Path,
    route: &[GeoPoint],
) -> Result<()> {
    let feed = open_marker_feed(config)?;
    let markers = feed.fetch_markers().await?;

    let mut live_map = LiveMap::from_config(config)?
        .with_filters(filter.filters())
        .with_route_search(filter.route_search());
    live_map.apply_snapshot(1, Ok(markers));
    live_map.set_route_path(route.to_vec());
    if let Some(point) = locate_once(config, location).await? {
        live_map.set_user_location(point);
    }

    let view = live_map.view();
    if let Some(banner) = view.banner {
        eprintln!("ℹ {}: {}", banner.title, banner.message);
    }

    let document = live_map.map().document()?;
    std::fs::write(output, document)?;
    println!(
        "Map written to {} ({} markers, {})",
        output.display(),
        view.filtered.len(),
        match view.provider {
            MapProvider::Yandex => "Yandex Maps",
            MapProvider::OpenStreetMap => "OpenStreetMap",
        }
    );
    Ok(())
}

fn cmd_route(config: &Config, command: RouteCommands, output_format: OutputFormat) -> Result<()> {
    match command {
        RouteCommands::Save { from, to, name } => {
            let route = open_saved_routes(config)?.save(&from, &to, name.as_deref())?;
            println!("Saved route {} ({})", route.name, route.id);
        }
        RouteCommands::List => {
            let routes = open_saved_routes(config)?.list()?;
            output_routes(output_format, &routes)?;
        }
        RouteCommands::Remove { id } => {
            open_saved_routes(config)?.remove(&id)?;
            println!("Removed route {}", id);
        }
        RouteCommands::History => {
            let history = open_route_history(config)?.entries()?;
            output_history(output_format, &history)?;
        }
        RouteCommands::Forget { id } => {
            if !open_route_history(config)?.remove(&id)? {
                return Err(Error::RouteNotFound(id));
            }
            println!("Removed search {}", id);
        }
        RouteCommands::ClearHistory => {
            open_route_history(config)?.clear()?;
            println!("Search history cleared");
        }
    }
    Ok(())
}

async fn cmd_report_position(config: &Config, kind: MarkerKind, id: String, point: GeoPoint) -> Result<()> {
    let feed = open_marker_feed(config)?;
    let report = PositionReport {
        kind,
        id,
        lat: point.lat,
        lng: point.lng,
    };
    feed.report_position(&report).await?;
    println!("Position of {} {} updated to {}", report.kind.label(), report.id, point);
    Ok(())
}

struct ConfigChanges {
    show: bool,
    set_endpoint: Option<String>,
    set_poll_interval: Option<u64>,
    set_radius: Option<f64>,
    set_notification_ttl: Option<u64>,
    set_provider: Option<MapProvider>,
    set_yandex_key: Option<String>,
    set_output: Option<OutputFormat>,
    set_home: Option<GeoPoint>,
    clear_home: bool,
    set_ip_geolocation: Option<bool>,
    set_store_dir: Option<PathBuf>,
    reset: bool,
}

fn cmd_config(changes: ConfigChanges) -> Result<()> {
    if changes.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(endpoint) = changes.set_endpoint {
        config.markers_endpoint = endpoint;
        modified = true;
    }

    if let Some(interval) = changes.set_poll_interval {
        config.poll_interval_ms = interval;
        modified = true;
    }

    if let Some(radius) = changes.set_radius {
        config.proximity_radius_km = radius;
        modified = true;
    }

    if let Some(ttl) = changes.set_notification_ttl {
        config.notification_ttl_ms = ttl;
        modified = true;
    }

    if let Some(provider) = changes.set_provider {
        config.map_provider = provider;
        modified = true;
    }

    if let Some(key) = changes.set_yandex_key {
        config.yandex_api_key = Some(key).filter(|k| !k.trim().is_empty());
        modified = true;
    }

    if let Some(output_format) = changes.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(home) = changes.set_home {
        config.home_location = Some(home);
        modified = true;
    }

    if changes.clear_home {
        config.home_location = None;
        modified = true;
    }

    if let Some(enabled) = changes.set_ip_geolocation {
        config.ip_geolocation = enabled;
        modified = true;
    }

    if let Some(dir) = changes.set_store_dir {
        config.store_dir = Some(dir);
        modified = true;
    }

    if modified {
        config.validate()?;
        config.save()?;
        println!("Configuration updated");
    }

    if changes.show || !modified {
        println!("\n{}", config);
    }

    Ok(())
}
