use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub directions_base_url: String,
    pub directions_api_key: String,
    pub directions_timeout_secs: u64,
    pub average_speed_kmh: f64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            directions_base_url: env::var("DIRECTIONS_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com".to_string()),
            directions_api_key: env::var("DIRECTIONS_API_KEY").unwrap_or_default(),
            directions_timeout_secs: env::var("DIRECTIONS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("DIRECTIONS_TIMEOUT_SECS must be a number"),
            average_speed_kmh: env::var("AVERAGE_SPEED_KMH")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("AVERAGE_SPEED_KMH must be a number"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
