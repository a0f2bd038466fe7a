// src/config/consts.rs

// Local artifacts
pub const DATA_DIR: &str = "data";
pub const TEMP_SUBDIR: &str = "temp";
pub const CHECKPOINT_SUFFIX: &str = "_checkpoint";
pub const ERRORS_SUFFIX: &str = "_errors";
pub const ARTIFACT_EXT: &str = "csv";
pub const STORE_SEP: char = ',';

/// Written for "attempted, nothing usable". Never parsed as a number.
pub const SENTINEL: &str = "?";

// Concerns (one artifact family each)
pub const PLACES: &str = "places";
pub const COUNTIES: &str = "counties";
pub const CLIMATE: &str = "climate";
pub const HEALTH: &str = "health";
pub const HOUSING: &str = "housing";
pub const DISTRICTS: &str = "districts";
pub const VOTING: &str = "voting";
pub const GEODATA: &str = "geodata";
pub const CRIME: &str = "crime";
pub const POPULATION: &str = "population";
pub const TEMPLES: &str = "temples";
pub const DROUGHT_HISTORY: &str = "drought_history";
pub const DROUGHT: &str = "drought";

// Master and side artifacts
pub const MASTER: &str = "master";
pub const PREDICT: &str = "predict";
pub const DROPPED_PREFIX: &str = "dropped_";

/// Column names: the contract between fetchers, merge and scoring.
pub mod col {
    // identity
    pub const PLACE: &str = "Place";
    pub const STATE: &str = "State";
    pub const STATE_CODE: &str = "StateCode";
    pub const CITY: &str = "City";
    pub const COUNTY: &str = "County";
    pub const FIPS: &str = "Fips";

    // geodata
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const POPULATION: &str = "Population";
    pub const DENSITY: &str = "Density";
    pub const ZIP: &str = "Zip";

    // derived
    pub const DISTRICT: &str = "CongressionalDistrict";
    pub const TEMPLE_DISTANCE: &str = "TempleDistance";

    // climate
    pub const RAINFALL: &str = "Rainfall";
    pub const SNOWFALL: &str = "Snowfall";
    pub const PRECIPITATION: &str = "Precipitation";
    pub const SUNSHINE: &str = "Sunshine";
    pub const UV: &str = "UV";
    pub const ABOVE_90: &str = "Above90";
    pub const BELOW_30: &str = "Below30";
    pub const BELOW_0: &str = "Below0";
    pub const HOT_SCORE: &str = "HotScore";
    pub const COLD_SCORE: &str = "ColdScore";

    // health
    pub const PHYSICIANS: &str = "Physicians";
    pub const HEALTH_COSTS: &str = "HealthCosts";
    pub const WATER_QUALITY: &str = "WaterQuality";
    pub const AIR_QUALITY: &str = "AirQuality";

    // housing
    pub const MEDIAN_HOME_COST: &str = "MedianHomeCost";
    pub const HOME_INSURANCE: &str = "HomeInsurance";

    // voting
    pub const CONSTITUTIONALITY: &str = "Constitutionality";
    pub const BIOGUIDE: &str = "Bioguide";

    // crime
    pub const VIOLENT_CRIME: &str = "ViolentCrime";
    pub const PROPERTY_CRIME: &str = "PropertyCrime";

    // census
    pub const CENSUS_POPULATION: &str = "CensusPopulation";

    // drought
    pub const MAP_DATE: &str = "MapDate";
    pub const DROUGHT: &str = "Drought";

    // temples
    pub const NAME: &str = "Name";

    // score
    pub const EDEN_SCORE: &str = "EdenScore";

    // dropped-row report
    pub const SIDE: &str = "Side";

    // error ledger
    pub const ROW: &str = "Row";
    pub const FIELD: &str = "Field";
    pub const ERROR: &str = "Error";
}

// Remote sources
pub const BESTPLACES_BASE: &str = "https://www.bestplaces.net";
pub const GEODATA_URL: &str =
    "https://simplemaps.com/static/data/us-cities/1.75/basic/simplemaps_uscities_basicv1.75.zip";
pub const GEODATA_ENTRY: &str = "uscities.csv";
pub const DISTRICT_QUERY_URL: &str =
    "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb/Legislative/MapServer/0/query";
pub const SCORECARD_URL: &str = "https://api.conservativereview.com/scorecard/district";
pub const CRIME_URL: &str = "https://cde.ucr.cjis.gov/LATEST/offenses_by_agency.zip";
pub const POPULATION_URL: &str =
    "https://www2.census.gov/programs-surveys/popest/datasets/2010-2020/cities/SUB-EST2020_ALL.csv";
pub const TEMPLES_URL: &str = "https://www.churchofjesuschrist.org/temples/api/locations.json";
pub const DROUGHT_URL: &str = "https://usdmdataservices.unl.edu/api/CountyStatistics/drought_history.csv";

// Fetch tuning
pub const USER_AGENT: &str = "eden/0.3";
pub const DELAY_MIN_MS: u64 = 500;
pub const DELAY_MAX_MS: u64 = 1000; // be polite
pub const TIMEOUT_SECS: u64 = 30;
pub const RETRIES: u32 = 3;
pub const BACKOFF_MS: u64 = 1000;
pub const CHECKPOINT_EVERY: usize = 25;
pub const MAX_CONSECUTIVE_ERRORS: usize = 10;

// Drought model: predict this many days after the earliest observation.
pub const DROUGHT_HORIZON_DAYS: f64 = 10_000.0;
