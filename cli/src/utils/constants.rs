/// Where the API lives when nothing else is given
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// The environment variable that overrides [`DEFAULT_API_URL`]
pub const API_URL_ENV: &str = "SLEIGH_API_URL";
