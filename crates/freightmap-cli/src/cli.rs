//! CLI definition using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use freightmap_types::{
    CargoReadiness, CargoType, FilterState, GeoPoint, MapProvider, MarkerKind, OutputFormat, RouteSearch, UserType,
    VehicleCategory, VehicleStatus,
};

#[derive(Parser)]
#[command(name = "freightmap")]
#[command(version)]
#[command(about = "Live map of cargo offers and available drivers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Marker feed endpoint. Uses config value if not specified.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Your location as "lat,lng" (overrides config and IP geolocation)
    #[arg(long, global = true, value_parser = parse_geo_point)]
    pub location: Option<GeoPoint>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Sidebar filters
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Look as a client (drivers) or a carrier (cargo)
    #[arg(long, short = 'u', value_enum, default_value_t = UserType::All)]
    pub user_type: UserType,

    #[arg(long, value_enum)]
    pub cargo_type: Option<CargoType>,

    #[arg(long, value_enum)]
    pub vehicle_type: Option<VehicleCategory>,

    /// Driver status (only with --user-type client)
    #[arg(long, value_enum)]
    pub vehicle_status: Option<VehicleStatus>,

    /// Cargo readiness (only with --user-type carrier)
    #[arg(long, value_enum)]
    pub readiness: Option<CargoReadiness>,

    /// Route search: origin
    #[arg(long)]
    pub from: Option<String>,

    /// Route search: destination
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn filters(&self) -> FilterState {
        FilterState {
            user_type: self.user_type,
            cargo_type: self.cargo_type,
            vehicle_type: self.vehicle_type,
            vehicle_status: self.vehicle_status,
            cargo_readiness: self.readiness,
        }
    }

    pub fn route_search(&self) -> RouteSearch {
        RouteSearch::new(
            self.from.clone().unwrap_or_default(),
            self.to.clone().unwrap_or_default(),
        )
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow the live map until interrupted
    Watch {
        #[command(flatten)]
        filter: FilterArgs,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Anonymous mode
        #[arg(long)]
        public: bool,

        /// Map backend. Uses config value if not specified.
        #[arg(long, value_enum)]
        provider: Option<MapProvider>,
    },

    /// Fetch and list markers once
    Markers {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// List cargo near your location, nearest first
    Nearby {
        /// Radius in km. Uses config value if not specified.
        #[arg(long, short = 'r')]
        radius: Option<f64>,
    },

    /// Export the current map as a standalone HTML page
    Render {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output HTML file
        #[arg(long, short = 'o', default_value = "freightmap.html")]
        output: PathBuf,

        /// Route point as "lat,lng"; repeat to draw a route line
        #[arg(long = "via", value_parser = parse_geo_point)]
        route: Vec<GeoPoint>,

        /// Map backend. Uses config value if not specified.
        #[arg(long, value_enum)]
        provider: Option<MapProvider>,
    },

    /// Saved routes and search history
    Route {
        #[command(subcommand)]
        command: RouteCommands,
    },

    /// Report a marker's current coordinates to the server
    ReportPosition {
        #[arg(value_enum)]
        kind: MarkerKind,

        id: String,

        #[arg(allow_hyphen_values = true)]
        lat: f64,

        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set marker feed endpoint
        #[arg(long)]
        set_endpoint: Option<String>,

        /// Set poll interval in milliseconds
        #[arg(long)]
        set_poll_interval: Option<u64>,

        /// Set nearby cargo radius in km
        #[arg(long)]
        set_radius: Option<f64>,

        /// Set notification lifetime in milliseconds
        #[arg(long)]
        set_notification_ttl: Option<u64>,

        /// Set preferred map backend
        #[arg(long, value_enum)]
        set_provider: Option<MapProvider>,

        /// Set Yandex Maps API key
        #[arg(long)]
        set_yandex_key: Option<String>,

        /// Set default output format
        #[arg(long, value_enum)]
        set_output: Option<OutputFormat>,

        /// Set fixed home location as "lat,lng"
        #[arg(long, value_parser = parse_geo_point)]
        set_home: Option<GeoPoint>,

        /// Remove the fixed home location
        #[arg(long)]
        clear_home: bool,

        /// Enable/disable IP geolocation
        #[arg(long)]
        set_ip_geolocation: Option<bool>,

        /// Set local storage directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Reset to default configuration
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum RouteCommands {
    /// Save a named route
    Save {
        from: String,
        to: String,
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// List saved routes
    List,

    /// Remove a saved route
    Remove { id: String },

    /// Show recent route searches
    History,

    /// Remove one search from the history
    Forget { id: String },

    /// Clear the search history
    ClearHistory,
}

/// Parse "lat,lng"
pub fn parse_geo_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got \"{}\"", s))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude: {}", lat.trim()))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("invalid longitude: {}", lng.trim()))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinates out of range: {}, {}", lat, lng));
    }
    Ok(GeoPoint::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_geo_point() {
        assert_eq!(parse_geo_point("55.75, 37.62").unwrap(), GeoPoint::new(55.75, 37.62));
        assert_eq!(parse_geo_point("-33.9,18.4").unwrap(), GeoPoint::new(-33.9, 18.4));
        assert!(parse_geo_point("55.75").is_err());
        assert!(parse_geo_point("north,37").is_err());
        assert!(parse_geo_point("95,37").is_err());
    }

    #[test]
    fn test_render_route_points() {
        let cli = Cli::parse_from(["freightmap", "render", "--via", "55.75,37.61", "--via", "55.79,49.12"]);
        let Commands::Render { route, .. } = cli.command else {
            panic!("expected render command");
        };
        assert_eq!(route, vec![GeoPoint::new(55.75, 37.61), GeoPoint::new(55.79, 49.12)]);
    }

    #[test]
    fn test_filter_args() {
        let cli = Cli::parse_from([
            "freightmap",
            "markers",
            "--user-type",
            "client",
            "--vehicle-status",
            "has-space",
            "--from",
            "Москва",
        ]);
        let Commands::Markers { filter } = cli.command else {
            panic!("expected markers command");
        };
        let filters = filter.filters();
        assert_eq!(filters.user_type, UserType::Client);
        assert_eq!(filters.vehicle_status, Some(VehicleStatus::HasSpace));
        assert!(!filter.route_search().is_active());
    }
}
