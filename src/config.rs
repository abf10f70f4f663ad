//! Application-level configuration constants.

// Cache generations
pub const SHELL_CACHE_NAME: &str = "topJobsPWA-v1";
pub const DATA_CACHE_NAME: &str = "jobData-v1";

// Upstream job-listing API
pub const DATA_API_HOST: &str = "api.arbetsformedlingen.se";
pub const DATA_API_BASE: &str = "http://api.arbetsformedlingen.se/af/v0/platsannonser/matchning";

/// App shell assets pre-cached on install. Anything missing here is not
/// available offline.
pub const FILES_TO_CACHE: &[&str] = &[
    "/",
    "/index.html",
    "/scripts/app.js",
    "/styles/inline.css",
    "/images/ic_add_white_24px.svg",
    "/images/ic_refresh_white_24px.svg",
];

// Browser integration
pub const SELECTED_CITIES_KEY: &str = "selectedCities";
pub const SERVICE_WORKER_SCRIPT: &str = "./service-worker.js";

// Card rendering
pub const TOP_AREA_COUNT: usize = 3;

/// Counties offered by the add-city dialog, as `(lanid, label)`.
pub const CITY_OPTIONS: &[(&str, &str)] = &[
    ("1", "Stockholm"),
    ("3", "Uppsala"),
    ("4", "Södermanland"),
    ("5", "Östergötland"),
    ("6", "Jönköping"),
    ("7", "Kronoberg"),
    ("8", "Kalmar"),
    ("9", "Gotland"),
    ("10", "Blekinge"),
    ("12", "Skåne"),
    ("13", "Halland"),
    ("14", "Västra Götaland"),
    ("17", "Värmland"),
    ("18", "Örebro"),
    ("19", "Västmanland"),
    ("20", "Dalarna"),
    ("21", "Gävleborg"),
    ("22", "Västernorrland"),
    ("23", "Jämtland"),
    ("24", "Västerbotten"),
    ("25", "Norrbotten"),
];
