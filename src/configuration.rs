use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub tokens: TokenSettings,
    pub media: MediaSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Signing and lifetime settings for the two token families.
///
/// The secrets are distinct values; compromising one family does not
/// compromise the other.
#[derive(serde::Deserialize, Clone)]
pub struct TokenSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiry_seconds: i64, // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry_seconds: i64, // seconds (e.g., 864000 for 10 days)
}

/// Media-hosting collaborator settings.
#[derive(serde::Deserialize, Clone)]
pub struct MediaSettings {
    pub base_url: String,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}
